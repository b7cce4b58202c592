//! Programmatic AST construction.
//!
//! Lexing and parsing are out of scope for this crate (§1), so there is no
//! tokenizer or Pratt parser here to turn source text into a [`Module`].
//! This module is the substitute input channel used by the demo CLI (which
//! deserializes a JSON-encoded tree produced by this same API) and by the
//! test suite: it assembles already-decided tree shapes, it does not
//! recognise grammar.

use crate::ast::*;
use crate::location::Location;

pub fn loc(line: u32) -> Location {
    Location::new("test.vy", line, 1)
}

pub fn ident(name: &str, line: u32) -> Expr {
    ExprNode::new(ExprKind::Ident { name: name.into() }, loc(line))
}

pub fn int_lit(value: i64, line: u32) -> Expr {
    ExprNode::new(ExprKind::IntLit(value), loc(line))
}

pub fn float_lit(value: f64, line: u32) -> Expr {
    ExprNode::new(ExprKind::FloatLit(value), loc(line))
}

pub fn string_lit(value: &str, line: u32) -> Expr {
    ExprNode::new(ExprKind::StringLit(value.into()), loc(line))
}

pub fn bool_lit(value: bool, line: u32) -> Expr {
    ExprNode::new(ExprKind::BoolLit(value), loc(line))
}

pub fn null_lit(line: u32) -> Expr {
    ExprNode::new(ExprKind::NullLit, loc(line))
}

pub fn this_expr(line: u32) -> Expr {
    ExprNode::new(ExprKind::This, loc(line))
}

pub fn member(object: Expr, name: &str, safe: bool, line: u32) -> Expr {
    ExprNode::new(
        ExprKind::Member {
            object,
            name: name.into(),
            safe,
        },
        loc(line),
    )
}

pub fn index(object: Expr, idx: Expr, line: u32) -> Expr {
    ExprNode::new(ExprKind::Index { object, index: idx }, loc(line))
}

pub fn unary(op: UnaryOp, value: Expr, line: u32) -> Expr {
    ExprNode::new(ExprKind::Unary { op, value }, loc(line))
}

pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, line: u32) -> Expr {
    ExprNode::new(ExprKind::Binary { op, lhs, rhs }, loc(line))
}

pub fn call(callee: Expr, args: Vec<Expr>, line: u32) -> Expr {
    ExprNode::new(ExprKind::Call { callee, args }, loc(line))
}

pub fn list_lit(items: Vec<Expr>, line: u32) -> Expr {
    ExprNode::new(ExprKind::ListLit { items }, loc(line))
}

pub fn list_type(item: Expr, line: u32) -> Expr {
    ExprNode::new(
        ExprKind::ParamType {
            base: ParamBase::List,
            params: vec![item],
        },
        loc(line),
    )
}

pub fn function_type(ret: Expr, args: Vec<Expr>, line: u32) -> Expr {
    let mut params = vec![ret];
    params.extend(args);
    ExprNode::new(
        ExprKind::ParamType {
            base: ParamBase::Function,
            params,
        },
        loc(line),
    )
}

pub fn nullable_type(inner: Expr, line: u32) -> Expr {
    ExprNode::new(ExprKind::NullableType { inner }, loc(line))
}

pub fn block(stmts: Vec<Stmt>, line: u32) -> Block {
    Block::new(stmts, loc(line))
}

pub fn external(stmts: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::External(ExternalStmt {
        block: block(stmts, line),
        loc: loc(line),
    })
}

pub fn class_def(name: &str, is_static: bool, members: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::Class(ClassDef {
        name: name.into(),
        is_static,
        body: block(members, line),
        loc: loc(line),
        symbol: None,
        id: None,
    })
}

pub fn var_def(name: &str, declared_type: Option<Expr>, value: Option<Expr>, line: u32) -> Stmt {
    Stmt::Var(VarDef {
        name: name.into(),
        declared_type,
        value,
        loc: loc(line),
        symbol: None,
    })
}

pub fn arg(name: &str, type_expr: Expr, line: u32) -> Arg {
    Arg {
        name: name.into(),
        type_expr,
        loc: loc(line),
        symbol: None,
    }
}

pub fn func_def(name: &str, is_static: bool, return_type: Expr, args: Vec<Arg>, body: Option<Vec<Stmt>>, line: u32) -> Stmt {
    Stmt::Func(FuncDef {
        name: name.into(),
        is_static,
        return_type,
        args,
        body: body.map(|stmts| block(stmts, line)),
        loc: loc(line),
        symbol: None,
    })
}

pub fn expr_stmt(expr: Expr, line: u32) -> Stmt {
    Stmt::Expr(ExprStmt { expr, loc: loc(line) })
}

pub fn if_stmt(cond: Expr, then_block: Vec<Stmt>, else_block: Option<Vec<Stmt>>, line: u32) -> Stmt {
    Stmt::If(IfStmt {
        cond,
        then_block: block(then_block, line),
        else_block: else_block.map(|stmts| block(stmts, line)),
        loc: loc(line),
    })
}

pub fn while_stmt(cond: Expr, body: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::While(WhileStmt {
        cond,
        body: block(body, line),
        loc: loc(line),
    })
}

pub fn return_stmt(value: Option<Expr>, line: u32) -> Stmt {
    Stmt::Return(ReturnStmt { value, loc: loc(line) })
}

pub fn module(stmts: Vec<Stmt>) -> Module {
    Module::new(block(stmts, 1))
}

/// Shorthand for a type-position identifier such as `int`, `bool`, `A`.
pub fn ty(name: &str, line: u32) -> Expr {
    ident(name, line)
}
