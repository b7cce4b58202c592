//! Pass 6: default initialise (§4.6). Synthesises a literal initialiser for
//! every `VarDef` that still has none, using its (by now fully resolved)
//! declared type. External declarations are skipped — they describe values
//! provided elsewhere, not local storage to initialise.

use crate::ast::{Block, ExprKind, ExprNode, Expr, Module, Stmt};
use crate::location::Location;
use crate::log::Log;
use crate::model::SemanticModel;
use crate::types::{PrimKind, Type};

pub fn run(module: &mut Module, _log: &mut Log) {
    visit_block(&mut module.root, &module.model);
}

fn visit_block(block: &mut Block, model: &SemanticModel) {
    for stmt in &mut block.stmts {
        visit_stmt(stmt, model);
    }
}

fn visit_stmt(stmt: &mut Stmt, model: &SemanticModel) {
    match stmt {
        // External declarations never get a synthesised value; pass 1
        // already forbids them from carrying one.
        Stmt::External(_) => {}
        Stmt::Class(c) => visit_block(&mut c.body, model),
        Stmt::Func(f) => {
            if let Some(body) = &mut f.body {
                visit_block(body, model);
            }
        }
        Stmt::Var(v) => {
            if v.value.is_none() {
                let sym = v.symbol.expect("pass 2 must run before pass 6");
                let ty = model.symbol(sym).ty.clone();
                v.value = Some(default_value_expr(&ty, &v.loc));
            }
        }
        Stmt::If(s) => {
            visit_block(&mut s.then_block, model);
            if let Some(else_block) = &mut s.else_block {
                visit_block(else_block, model);
            }
        }
        Stmt::While(s) => visit_block(&mut s.body, model),
        Stmt::Expr(_) | Stmt::Return(_) => {}
    }
}

fn default_value_expr(ty: &Type, loc: &Location) -> Expr {
    let (kind, computed_type) = match ty {
        Type::Prim(PrimKind::Bool) => (ExprKind::BoolLit(false), Type::Prim(PrimKind::Bool)),
        Type::Prim(PrimKind::Int) => (ExprKind::IntLit(0), Type::Prim(PrimKind::Int)),
        Type::Prim(PrimKind::Float) => (ExprKind::FloatLit(0.0), Type::Prim(PrimKind::Float)),
        Type::Prim(PrimKind::String) => (ExprKind::StringLit("".into()), Type::Prim(PrimKind::String)),
        _ => (ExprKind::NullLit, Type::Null),
    };
    let mut expr = ExprNode::new(kind, loc.clone());
    expr.computed_type = computed_type;
    expr
}
