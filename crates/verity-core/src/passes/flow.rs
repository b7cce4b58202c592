//! Pass 5: flow validation (§4.5). Read-only: detects unreachable code after
//! a definite `return`, functions with a path that falls off the end without
//! returning a value, and uses of a local variable before its declaration.

use ahash::{AHashMap, AHashSet};

use crate::ast::{Block, Expr, ExprKind, FuncDef, Module, Stmt};
use crate::ids::SymbolId;
use crate::log::Log;
use crate::types::Type;

pub fn run(module: &Module, log: &mut Log) {
    visit_block(&module.root, log);
}

fn visit_block(block: &Block, log: &mut Log) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::External(e) => visit_block(&e.block, log),
            Stmt::Class(c) => visit_block(&c.body, log),
            Stmt::Func(f) => {
                if let Some(body) = &f.body {
                    check_function(f, body, log);
                }
            }
            _ => {}
        }
    }
}

fn check_function(f: &FuncDef, body: &Block, log: &mut Log) {
    let mut locals = AHashSet::new();
    collect_locals(body, &mut locals);

    let mut defined = AHashMap::new();
    for a in &f.args {
        defined.insert(a.symbol.expect("pass 2 must run before pass 5"), 0u32);
    }

    let returns = {
        let mut state = FlowState { log: &mut *log, locals, defined, seq: 0 };
        state.check_block(body)
    };

    let is_void = f.return_type.computed_type.instance() == Some(Type::Void);
    if !is_void && !returns {
        log.error(&f.loc, format_args!("function '{}' does not return a value on every path", f.name));
    }
}

fn collect_locals(block: &Block, out: &mut AHashSet<SymbolId>) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Var(v) => {
                out.insert(v.symbol.expect("pass 2 must run before pass 5"));
            }
            Stmt::If(s) => {
                collect_locals(&s.then_block, out);
                if let Some(e) = &s.else_block {
                    collect_locals(e, out);
                }
            }
            Stmt::While(s) => collect_locals(&s.body, out),
            _ => {}
        }
    }
}

struct FlowState<'a> {
    log: &'a mut Log,
    locals: AHashSet<SymbolId>,
    defined: AHashMap<SymbolId, u32>,
    seq: u32,
}

impl<'a> FlowState<'a> {
    /// Returns whether every path through `block` definitely returns.
    fn check_block(&mut self, block: &Block) -> bool {
        let mut returned = false;
        let mut reported_unreachable = false;
        for stmt in &block.stmts {
            if returned {
                if !reported_unreachable {
                    self.log.warning(stmt.loc(), "dead code");
                    reported_unreachable = true;
                }
                continue;
            }
            if self.check_stmt(stmt) {
                returned = true;
            }
        }
        returned
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> bool {
        self.seq += 1;
        match stmt {
            Stmt::Var(v) => {
                self.check_expr(v.declared_type.as_ref());
                self.check_expr(v.value.as_ref());
                self.defined.insert(v.symbol.expect("pass 2 must run before pass 5"), self.seq);
                false
            }
            Stmt::Expr(e) => {
                self.check_expr(Some(&e.expr));
                false
            }
            Stmt::Return(s) => {
                self.check_expr(s.value.as_ref());
                true
            }
            Stmt::If(s) => {
                self.check_expr(Some(&s.cond));
                let then_returns = self.check_block(&s.then_block);
                let else_returns = match &s.else_block {
                    Some(b) => self.check_block(b),
                    None => false,
                };
                then_returns && else_returns && s.else_block.is_some()
            }
            Stmt::While(s) => {
                self.check_expr(Some(&s.cond));
                self.check_block(&s.body);
                false
            }
            Stmt::External(_) | Stmt::Class(_) | Stmt::Func(_) => false,
        }
    }

    fn check_expr(&mut self, expr: Option<&Expr>) {
        let Some(expr) = expr else { return };
        match &expr.kind {
            ExprKind::Ident { .. } => self.check_symbol_use(expr),
            ExprKind::Member { object, .. } => {
                self.check_expr(Some(object));
                self.check_symbol_use(expr);
            }
            ExprKind::Index { object, index } => {
                self.check_expr(Some(object));
                self.check_expr(Some(index));
            }
            ExprKind::Unary { value, .. } => self.check_expr(Some(value)),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.check_expr(Some(lhs));
                self.check_expr(Some(rhs));
            }
            ExprKind::Call { callee, args } => {
                self.check_expr(Some(callee));
                for a in args {
                    self.check_expr(Some(a));
                }
            }
            ExprKind::Cast { value, .. } => self.check_expr(Some(value)),
            ExprKind::ListLit { items } => {
                for it in items {
                    self.check_expr(Some(it));
                }
            }
            ExprKind::IntLit(_)
            | ExprKind::FloatLit(_)
            | ExprKind::StringLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::CharLit(_)
            | ExprKind::NullLit
            | ExprKind::This
            | ExprKind::ParamType { .. }
            | ExprKind::NullableType { .. } => {}
        }
    }

    fn check_symbol_use(&mut self, expr: &Expr) {
        let Some(sym) = expr.symbol else { return };
        if self.locals.contains(&sym) && !self.defined.contains_key(&sym) {
            self.log.error(&expr.loc, "use of a variable before its declaration");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::passes::{compute_types, define_symbols, symbol_types};

    fn run_all(m: &mut Module) -> Log {
        let mut log = Log::new();
        define_symbols::run(m, &mut log);
        symbol_types::run(m, &mut log);
        compute_types::run(m, &mut log);
        assert!(log.errors().is_empty(), "earlier pass failed: {:?}", log.errors());
        run(m, &mut log);
        log
    }

    #[test]
    fn dead_code_after_return_is_flagged() {
        let mut m = module(vec![func_def(
            "f",
            false,
            ty("int", 1),
            vec![],
            Some(vec![return_stmt(Some(int_lit(1, 1)), 1), expr_stmt(int_lit(2, 2), 2)]),
            1,
        )]);
        let log = run_all(&mut m);
        assert!(log.errors().is_empty());
        assert_eq!(log.warnings().len(), 1);
        assert!(log.warnings()[0].contains("dead code"));
    }

    #[test]
    fn missing_return_on_one_branch_is_flagged() {
        let mut m = module(vec![func_def(
            "f",
            false,
            ty("int", 1),
            vec![],
            Some(vec![if_stmt(bool_lit(true, 1), vec![return_stmt(Some(int_lit(1, 1)), 1)], None, 1)]),
            1,
        )]);
        let log = run_all(&mut m);
        assert_eq!(log.errors().len(), 1);
        assert!(log.errors()[0].contains("does not return"));
    }

    #[test]
    fn use_before_declaration_is_flagged() {
        let mut m = module(vec![func_def(
            "f",
            false,
            ty("void", 1),
            vec![],
            Some(vec![
                expr_stmt(ident("y", 1), 1),
                var_def("y", Some(ty("int", 2)), Some(int_lit(0, 2)), 2),
            ]),
            1,
        )]);
        let log = run_all(&mut m);
        assert_eq!(log.errors().len(), 1);
        assert!(log.errors()[0].contains("before"));
    }
}
