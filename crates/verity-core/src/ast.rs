//! The input/output AST contract (§6). Every statement and sub-expression
//! carries a [`Location`]; the core decorates nodes in place rather than
//! building a parallel tree.

use std::rc::Rc;

use crate::ids::{ClassId, ScopeId, SymbolId};
use crate::location::Location;
use crate::types::Type;

pub type Expr = Box<ExprNode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum BinOp {
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    /// `??`, the nullable-default operator.
    NullCoalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum ParamBase {
    List,
    Function,
}

/// A value expression *or* a type expression — the grammar is shared, per
/// §6: "type expressions ... are expressions whose semantics yield a
/// `meta(T)`".
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    StringLit(Rc<str>),
    BoolLit(bool),
    /// A single-character integer literal; treated as `int` (§6).
    CharLit(char),
    NullLit,
    This,
    Ident { name: Rc<str> },
    Member { object: Expr, name: Rc<str>, safe: bool },
    Index { object: Expr, index: Expr },
    Unary { op: UnaryOp, value: Expr },
    Binary { op: BinOp, lhs: Expr, rhs: Expr },
    Call { callee: Expr, args: Vec<Expr> },
    /// Both user-written casts and casts synthesised by pass 4 for implicit
    /// conversions use this node; `synthesized` distinguishes the two only
    /// for debugging/printing, the type system treats them identically.
    Cast { target: Expr, value: Expr, synthesized: bool },
    ListLit { items: Vec<Expr> },
    /// `list<T>` / `function<R, A...>` in type position.
    ParamType { base: ParamBase, params: Vec<Expr> },
    /// `T?` in type position.
    NullableType { inner: Expr },
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub loc: Location,
    pub computed_type: Type,
    /// Resolved symbol for `Ident`/`Member` expressions.
    pub symbol: Option<SymbolId>,
    /// Set on `Call` expressions that turn out to construct a class
    /// instance.
    pub is_ctor: bool,
}

impl ExprNode {
    pub fn new(kind: ExprKind, loc: Location) -> Expr {
        Box::new(ExprNode {
            kind,
            loc,
            computed_type: Type::Error,
            symbol: None,
            is_ctor: false,
        })
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub scope: Option<ScopeId>,
    pub loc: Location,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, loc: Location) -> Self {
        Self { stmts, scope: None, loc }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ExternalStmt {
    pub block: Block,
    pub loc: Location,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ClassDef {
    pub name: Rc<str>,
    pub is_static: bool,
    pub body: Block,
    pub loc: Location,
    pub symbol: Option<SymbolId>,
    pub id: Option<ClassId>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct VarDef {
    pub name: Rc<str>,
    /// `None` for `var x = e` (inferred); `Some` for `T x = e` / `T x`.
    pub declared_type: Option<Expr>,
    pub value: Option<Expr>,
    pub loc: Location,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Arg {
    pub name: Rc<str>,
    pub type_expr: Expr,
    pub loc: Location,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct FuncDef {
    pub name: Rc<str>,
    pub is_static: bool,
    pub return_type: Expr,
    pub args: Vec<Arg>,
    /// `None` for external (body-less) declarations.
    pub body: Option<Block>,
    pub loc: Location,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub loc: Location,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub loc: Location,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub loc: Location,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub loc: Location,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum Stmt {
    External(ExternalStmt),
    Class(ClassDef),
    Var(VarDef),
    Func(FuncDef),
    Expr(ExprStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
}

impl Stmt {
    pub fn loc(&self) -> &Location {
        match self {
            Stmt::External(s) => &s.loc,
            Stmt::Class(s) => &s.loc,
            Stmt::Var(s) => &s.loc,
            Stmt::Func(s) => &s.loc,
            Stmt::Expr(s) => &s.loc,
            Stmt::If(s) => &s.loc,
            Stmt::While(s) => &s.loc,
            Stmt::Return(s) => &s.loc,
        }
    }
}

/// The root of one AST, as handed to [`crate::compile`].
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Module {
    pub root: Block,
    pub model: crate::model::SemanticModel,
}

impl Default for Block {
    fn default() -> Self {
        Block::new(Vec::new(), Location::new("<module>", 0, 0))
    }
}

impl Module {
    pub fn new(root: Block) -> Self {
        Self {
            root,
            model: crate::model::SemanticModel::new(),
        }
    }
}
