//! Pass 2: define symbols (§4.2). Creates the scope tree and the initial
//! symbol table; does not yet resolve any type expression.

use crate::ast::{Block, Module, Stmt};
use crate::classes::ClassInfo;
use crate::ids::ScopeId;
use crate::log::Log;
use crate::model::SemanticModel;
use crate::scope::ScopeKind;
use crate::symbol::{Symbol, SymbolKind};
use crate::types::Type;

pub fn run(module: &mut Module, log: &mut Log) {
    let model = &mut module.model;
    let root_scope = model.new_scope(ScopeKind::Module, None);
    module.root.scope = Some(root_scope);
    define_block(&mut module.root, root_scope, model, log);
}

fn define_block(block: &mut Block, scope: ScopeId, model: &mut SemanticModel, log: &mut Log) {
    for stmt in &mut block.stmts {
        define_stmt(stmt, scope, model, log);
    }
}

fn define_stmt(stmt: &mut Stmt, scope: ScopeId, model: &mut SemanticModel, log: &mut Log) {
    match stmt {
        Stmt::External(e) => {
            // External blocks do not introduce a new scope.
            e.block.scope = Some(scope);
            define_block(&mut e.block, scope, model, log);
        }
        Stmt::Class(c) => {
            let sym_id = model.new_symbol(Symbol::new(c.name.clone(), SymbolKind::Class, c.is_static, c.loc.clone()));
            model.insert(scope, c.name.clone(), sym_id, &c.loc, log);

            let class_scope = model.new_scope(ScopeKind::Class, Some(scope));
            let class_id = model.new_class(ClassInfo {
                name: c.name.clone(),
                symbol: sym_id,
                scope: class_scope,
            });
            model.symbol_mut(sym_id).ty = Type::meta(Type::Class(class_id));

            c.symbol = Some(sym_id);
            c.id = Some(class_id);
            c.body.scope = Some(class_scope);
            define_block(&mut c.body, class_scope, model, log);
        }
        Stmt::Func(f) => {
            let sym_id = model.new_symbol(Symbol::new(f.name.clone(), SymbolKind::Function, f.is_static, f.loc.clone()));
            model.insert(scope, f.name.clone(), sym_id, &f.loc, log);
            f.symbol = Some(sym_id);

            // Arguments live in the function's own scope, not the enclosing
            // one — created even for body-less (external) declarations so
            // duplicate-argument errors still surface.
            let func_scope = model.new_scope(ScopeKind::Func, Some(scope));
            for a in &mut f.args {
                let arg_sym = model.new_symbol(Symbol::new(a.name.clone(), SymbolKind::Variable, false, a.loc.clone()));
                model.insert(func_scope, a.name.clone(), arg_sym, &a.loc, log);
                a.symbol = Some(arg_sym);
            }

            if let Some(body) = &mut f.body {
                body.scope = Some(func_scope);
                define_block(body, func_scope, model, log);
            }
        }
        Stmt::Var(v) => {
            let sym_id = model.new_symbol(Symbol::new(v.name.clone(), SymbolKind::Variable, false, v.loc.clone()));
            model.insert(scope, v.name.clone(), sym_id, &v.loc, log);
            v.symbol = Some(sym_id);
        }
        Stmt::If(s) => {
            let then_scope = model.new_scope(ScopeKind::Local, Some(scope));
            s.then_block.scope = Some(then_scope);
            define_block(&mut s.then_block, then_scope, model, log);

            if let Some(else_block) = &mut s.else_block {
                let else_scope = model.new_scope(ScopeKind::Local, Some(scope));
                else_block.scope = Some(else_scope);
                define_block(else_block, else_scope, model, log);
            }
        }
        Stmt::While(s) => {
            let body_scope = model.new_scope(ScopeKind::Local, Some(scope));
            s.body.scope = Some(body_scope);
            define_block(&mut s.body, body_scope, model, log);
        }
        Stmt::Expr(_) | Stmt::Return(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::symbol::SymbolKind;

    #[test]
    fn every_block_gets_a_scope() {
        let mut m = module(vec![class_def("A", false, vec![var_def("x", Some(ty("int", 1)), None, 1)], 1)]);
        let mut log = Log::new();
        run(&mut m, &mut log);
        assert!(m.root.scope.is_some());
        let Stmt::Class(c) = &m.root.stmts[0] else { unreachable!() };
        assert!(c.body.scope.is_some());
    }

    #[test]
    fn overload_merges_two_functions() {
        let mut m = module(vec![
            func_def("f", false, ty("void", 1), vec![], Some(vec![]), 1),
            func_def("f", false, ty("void", 2), vec![], Some(vec![]), 2),
        ]);
        let mut log = Log::new();
        run(&mut m, &mut log);
        assert_eq!(log.errors().len(), 0);
        let scope = m.root.scope.unwrap();
        let bound = *m.model.scope(scope).symbols.get("f").unwrap();
        assert_eq!(m.model.symbol(bound).kind, SymbolKind::OverloadedFunction);
        assert_eq!(m.model.symbol(bound).overloads.len(), 2);
    }

    #[test]
    fn function_then_variable_is_a_redefinition() {
        let mut m = module(vec![
            func_def("f", false, ty("void", 1), vec![], Some(vec![]), 1),
            var_def("f", Some(ty("int", 2)), None, 2),
        ]);
        let mut log = Log::new();
        run(&mut m, &mut log);
        assert_eq!(log.errors().len(), 1);
        assert!(log.errors()[0].contains("redefinition"));
    }
}
