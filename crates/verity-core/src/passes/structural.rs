//! Pass 1: structural check (§4.1).
//!
//! Validates which statements may appear in which syntactic context. Purely
//! read-only: it never touches a decoration, it only reports violations.
//! Every violation is collected before the pipeline halts, so a user sees
//! all of them together.

use crate::ast::{Block, ClassDef, ExternalStmt, FuncDef, Module, Stmt, VarDef};
use crate::log::Log;

#[derive(Clone, Copy)]
struct Context {
    in_class: bool,
    in_external: bool,
    in_function: bool,
}

impl Context {
    fn module_top() -> Self {
        Self {
            in_class: false,
            in_external: false,
            in_function: false,
        }
    }

    fn is_module_scope(self) -> bool {
        !self.in_class && !self.in_function && !self.in_external
    }

    fn enter_class(self) -> Self {
        Self {
            in_class: true,
            in_external: self.in_external,
            in_function: false,
        }
    }

    fn enter_function(self) -> Self {
        Self {
            in_class: false,
            in_external: self.in_external,
            in_function: true,
        }
    }

    fn enter_external(self) -> Self {
        Self {
            in_class: false,
            in_external: true,
            in_function: false,
        }
    }

    fn forbids_initializer(self) -> bool {
        self.in_external || self.is_module_scope()
    }
}

pub fn run(module: &Module, log: &mut Log) {
    check_block(&module.root, Context::module_top(), log);
}

fn check_block(block: &Block, ctx: Context, log: &mut Log) {
    for stmt in &block.stmts {
        check_allowed(stmt, ctx, log);
        recurse(stmt, ctx, log);
    }
}

fn check_allowed(stmt: &Stmt, ctx: Context, log: &mut Log) {
    let allowed = if ctx.in_function {
        matches!(stmt, Stmt::Var(_) | Stmt::Expr(_) | Stmt::If(_) | Stmt::Return(_) | Stmt::While(_))
    } else if ctx.in_class {
        matches!(stmt, Stmt::Class(_) | Stmt::Var(_) | Stmt::Func(_))
    } else if ctx.in_external {
        matches!(stmt, Stmt::Class(_) | Stmt::Var(_) | Stmt::Func(_))
    } else {
        matches!(stmt, Stmt::External(_) | Stmt::Class(_) | Stmt::Var(_) | Stmt::Func(_))
    };

    if !allowed {
        log.error(stmt.loc(), format_args!("statement not allowed in this context"));
        return;
    }

    if let Stmt::Var(v) = stmt {
        check_var(v, ctx, log);
    }
    if let Stmt::Func(f) = stmt {
        check_func(f, ctx, log);
    }
}

fn check_var(v: &VarDef, ctx: Context, log: &mut Log) {
    if v.value.is_some() && ctx.forbids_initializer() {
        log.error(&v.loc, format_args!("variable '{}' may not be initialised here", v.name));
    }
}

fn check_func(f: &FuncDef, ctx: Context, log: &mut Log) {
    if ctx.in_external {
        if f.body.is_some() {
            log.error(&f.loc, format_args!("function '{}' declared in an external block may not have a body", f.name));
        }
    } else if f.body.is_none() {
        log.error(&f.loc, format_args!("function '{}' requires a body", f.name));
    }
}

fn recurse(stmt: &Stmt, ctx: Context, log: &mut Log) {
    match stmt {
        Stmt::External(ExternalStmt { block, .. }) => check_block(block, ctx.enter_external(), log),
        Stmt::Class(ClassDef { body, .. }) => check_block(body, ctx.enter_class(), log),
        Stmt::Func(FuncDef { body: Some(body), .. }) => check_block(body, ctx.enter_function(), log),
        Stmt::Func(FuncDef { body: None, .. }) => {}
        Stmt::If(s) => {
            check_block(&s.then_block, ctx, log);
            if let Some(else_block) = &s.else_block {
                check_block(else_block, ctx, log);
            }
        }
        Stmt::While(s) => check_block(&s.body, ctx, log),
        Stmt::Var(_) | Stmt::Expr(_) | Stmt::Return(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;

    #[test]
    fn rejects_initialised_variable_at_module_scope() {
        let m = module(vec![var_def("x", Some(ty("int", 1)), Some(int_lit(1, 1)), 1)]);
        let mut log = Log::new();
        run(&m, &mut log);
        assert_eq!(log.errors().len(), 1);
    }

    #[test]
    fn rejects_function_without_body_outside_external() {
        let m = module(vec![func_def("f", false, ty("void", 1), vec![], None, 1)]);
        let mut log = Log::new();
        run(&m, &mut log);
        assert_eq!(log.errors().len(), 1);
    }

    #[test]
    fn rejects_function_with_body_inside_external() {
        let m = module(vec![external(
            vec![func_def("f", false, ty("void", 1), vec![], Some(vec![]), 1)],
            1,
        )]);
        let mut log = Log::new();
        run(&m, &mut log);
        assert_eq!(log.errors().len(), 1);
    }

    #[test]
    fn accepts_well_formed_module() {
        let m = module(vec![
            external(vec![func_def("print", false, ty("void", 1), vec![arg("x", ty("int", 1), 1)], None, 1)], 1),
            func_def(
                "main",
                false,
                ty("void", 2),
                vec![],
                Some(vec![expr_stmt(call(ident("print", 3), vec![int_lit(1, 3)], 3), 3)]),
                2,
            ),
        ]);
        let mut log = Log::new();
        run(&m, &mut log);
        assert_eq!(log.errors().len(), 0);
    }
}
