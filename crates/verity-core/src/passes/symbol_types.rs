//! Pass 3: compute symbol types (§4.3). Resolves the *type* sub-expressions
//! of every module/class-level `VarDef`, `FuncDef` and `Arg`, filling in each
//! symbol's `ty`. Variables with no declared type, and every variable local
//! to a function body, are deliberately left at `error` here — pass 4 infers
//! or validates those from their initialisers.

use crate::ast::{Block, ClassDef, FuncDef, Module, Stmt, VarDef};
use crate::ids::ScopeId;
use crate::log::Log;
use crate::passes::compute_types::{Enclosing, Tc};
use crate::types::Type;

pub fn run(module: &mut Module, log: &mut Log) {
    let scope = module.root.scope.expect("pass 2 must run before pass 3");
    let mut tc = Tc { model: &mut module.model, log };
    let enclosing = Enclosing::module();
    visit_block(&mut tc, &mut module.root, scope, &enclosing);
}

fn visit_block(tc: &mut Tc, block: &mut Block, scope: ScopeId, enclosing: &Enclosing) {
    for stmt in &mut block.stmts {
        visit_stmt(tc, stmt, scope, enclosing);
    }
}

fn visit_stmt(tc: &mut Tc, stmt: &mut Stmt, scope: ScopeId, enclosing: &Enclosing) {
    match stmt {
        Stmt::External(e) => {
            let s = e.block.scope.expect("pass 2 must run before pass 3");
            visit_block(tc, &mut e.block, s, enclosing);
        }
        Stmt::Class(c) => visit_class(tc, c, enclosing),
        Stmt::Func(f) => visit_func(tc, f, scope, enclosing),
        Stmt::Var(v) => visit_var(tc, v, scope, enclosing),
        // Nested control flow at this level can only occur inside a function
        // body, and function bodies are out of scope for this pass.
        Stmt::If(_) | Stmt::While(_) | Stmt::Expr(_) | Stmt::Return(_) => {}
    }
}

fn visit_class(tc: &mut Tc, c: &mut ClassDef, enclosing: &Enclosing) {
    let class_scope = c.body.scope.expect("pass 2 must run before pass 3");
    let inner = Enclosing {
        class: c.id,
        in_function: false,
        is_static: true,
        return_type: Type::Void,
    };
    let _ = enclosing;
    visit_block(tc, &mut c.body, class_scope, &inner);
}

fn visit_func(tc: &mut Tc, f: &mut FuncDef, scope: ScopeId, enclosing: &Enclosing) {
    let ret = tc.eval_type_expr(&mut f.return_type, scope, enclosing, true);

    let func_scope = f.body.as_ref().map(|b| b.scope).unwrap_or(None);
    let arg_scope = func_scope.unwrap_or(scope);
    let mut arg_types = Vec::with_capacity(f.args.len());
    for a in &mut f.args {
        let t = tc.eval_type_expr(&mut a.type_expr, arg_scope, enclosing, false);
        let sym = a.symbol.expect("pass 2 must run before pass 3");
        tc.model.symbol_mut(sym).ty = t.clone();
        arg_types.push(t);
    }

    let sym = f.symbol.expect("pass 2 must run before pass 3");
    tc.model.symbol_mut(sym).ty = Type::func(ret, arg_types);
}

fn visit_var(tc: &mut Tc, v: &mut VarDef, scope: ScopeId, enclosing: &Enclosing) {
    let Some(texpr) = &mut v.declared_type else { return };
    let t = tc.eval_type_expr(texpr, scope, enclosing, false);
    let sym = v.symbol.expect("pass 2 must run before pass 3");
    tc.model.symbol_mut(sym).ty = t;
}
