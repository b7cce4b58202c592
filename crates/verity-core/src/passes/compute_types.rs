//! Pass 4: compute types (§4.4). The core of the whole crate: a recursive
//! bidirectional type-checker over every expression and statement, inserting
//! synthesised casts for implicit conversions and resolving overloaded calls
//! by trial-evaluating the callee with diagnostics suppressed.
//!
//! [`Tc`] and [`Enclosing`] are also reused by pass 3 (`symbol_types`), which
//! only needs the type-expression half of this evaluator.

use std::rc::Rc;

use crate::ast::{
    Block, ClassDef, ExprKind, ExprNode, FuncDef, IfStmt, Module, ParamBase, Stmt, VarDef, WhileStmt,
};
use crate::ast::{BinOp, Expr, UnaryOp};
use crate::ids::{ClassId, ScopeId};
use crate::ids::SymbolId;
use crate::location::Location;
use crate::log::Log;
use crate::model::SemanticModel;
use crate::scope::LookupKind;
use crate::types::{cast_is_valid, implicitly_converts, PrimKind, Type};

/// The bidirectional context threaded explicitly through every recursive
/// call — never a shared mutable field, per the design note against that.
#[derive(Clone, Default)]
pub(crate) struct EvalContext {
    pub(crate) target_type: Option<Type>,
    pub(crate) arg_types: Option<Vec<Type>>,
}

impl EvalContext {
    fn target(target_type: Type) -> Self {
        Self { target_type: Some(target_type), arg_types: None }
    }
}

/// Lexical context that changes only when a pass enters a class or function
/// body; unlike [`EvalContext`] this tracks *where we are*, not *what's
/// expected*.
#[derive(Clone)]
pub(crate) struct Enclosing {
    pub(crate) class: Option<ClassId>,
    pub(crate) in_function: bool,
    pub(crate) is_static: bool,
    pub(crate) return_type: Type,
}

impl Enclosing {
    pub(crate) fn module() -> Self {
        Self { class: None, in_function: false, is_static: true, return_type: Type::Void }
    }
}

pub(crate) struct Tc<'a> {
    pub(crate) model: &'a mut SemanticModel,
    pub(crate) log: &'a mut Log,
}

pub fn run(module: &mut Module, log: &mut Log) {
    let scope = module.root.scope.expect("pass 2 must run before pass 4");
    let mut tc = Tc { model: &mut module.model, log };
    let enclosing = Enclosing::module();
    tc.check_block(&mut module.root, scope, &enclosing);
}

impl<'a> Tc<'a> {
    fn check_block(&mut self, block: &mut Block, scope: ScopeId, enclosing: &Enclosing) {
        for stmt in &mut block.stmts {
            self.check_stmt(stmt, scope, enclosing);
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId, enclosing: &Enclosing) {
        match stmt {
            Stmt::External(e) => {
                let s = e.block.scope.expect("pass 2 must run before pass 4");
                self.check_block(&mut e.block, s, enclosing);
            }
            Stmt::Class(c) => self.check_class(c, enclosing),
            Stmt::Func(f) => self.check_func(f, enclosing),
            Stmt::Var(v) => self.check_var_def(v, scope, enclosing),
            Stmt::Expr(e) => {
                let t = self.eval_expr(&mut e.expr, scope, enclosing, EvalContext::default());
                if t.is_meta() {
                    self.log.error(&e.loc, "a type cannot be used as a statement");
                }
            }
            Stmt::If(s) => self.check_if(s, scope, enclosing),
            Stmt::While(s) => self.check_while(s, scope, enclosing),
            Stmt::Return(s) => {
                let loc = s.loc.clone();
                match &mut s.value {
                    Some(value) => {
                        if enclosing.return_type == Type::Void {
                            self.log.error(&loc, "a void function cannot return a value");
                            self.eval_expr(value, scope, enclosing, EvalContext::default());
                        } else {
                            let target = enclosing.return_type.clone();
                            let vt = self.eval_expr(value, scope, enclosing, EvalContext::target(target.clone()));
                            self.convert_or_error(value, vt, target, &loc);
                        }
                    }
                    None => {
                        if enclosing.return_type != Type::Void {
                            self.log.error(&loc, "missing return value");
                        }
                    }
                }
            }
        }
    }

    fn check_class(&mut self, c: &mut ClassDef, enclosing: &Enclosing) {
        let class_scope = c.body.scope.expect("pass 2 must run before pass 4");
        let inner = Enclosing { class: c.id, in_function: false, is_static: true, return_type: Type::Void };
        self.check_block(&mut c.body, class_scope, &inner);
        let _ = enclosing;
    }

    fn check_func(&mut self, f: &mut FuncDef, enclosing: &Enclosing) {
        let Some(body) = &mut f.body else { return };
        let sym = f.symbol.expect("pass 2 must run before pass 4");
        let return_type = match &self.model.symbol(sym).ty {
            Type::Func(ret, _) => (**ret).clone(),
            _ => Type::Error,
        };
        let body_scope = body.scope.expect("pass 2 must run before pass 4");
        let inner = Enclosing {
            class: enclosing.class,
            in_function: true,
            is_static: f.is_static,
            return_type,
        };
        self.check_block(body, body_scope, &inner);
    }

    fn check_if(&mut self, s: &mut IfStmt, scope: ScopeId, enclosing: &Enclosing) {
        let loc = s.loc.clone();
        let cond_t = self.eval_expr(&mut s.cond, scope, enclosing, EvalContext::target(Type::Prim(PrimKind::Bool)));
        if !cond_t.is_error() && cond_t != Type::Prim(PrimKind::Bool) {
            self.log.error(&loc, "'if' condition must be bool");
        }
        let then_scope = s.then_block.scope.expect("pass 2 must run before pass 4");
        self.check_block(&mut s.then_block, then_scope, enclosing);
        if let Some(else_block) = &mut s.else_block {
            let else_scope = else_block.scope.expect("pass 2 must run before pass 4");
            self.check_block(else_block, else_scope, enclosing);
        }
    }

    fn check_while(&mut self, s: &mut WhileStmt, scope: ScopeId, enclosing: &Enclosing) {
        let loc = s.loc.clone();
        let cond_t = self.eval_expr(&mut s.cond, scope, enclosing, EvalContext::target(Type::Prim(PrimKind::Bool)));
        if !cond_t.is_error() && cond_t != Type::Prim(PrimKind::Bool) {
            self.log.error(&loc, "'while' condition must be bool");
        }
        let body_scope = s.body.scope.expect("pass 2 must run before pass 4");
        self.check_block(&mut s.body, body_scope, enclosing);
    }

    fn check_var_def(&mut self, v: &mut VarDef, scope: ScopeId, enclosing: &Enclosing) {
        let sym = v.symbol.expect("pass 2 must run before pass 4");
        let loc = v.loc.clone();
        // Pass 3 already computed a real type for module/class-level vars;
        // function-local vars are deliberately left `error` for us to fill.
        let already_typed = !matches!(self.model.symbol(sym).ty, Type::Error);

        let declared_target = if let Some(texpr) = &mut v.declared_type {
            if already_typed {
                Some(self.model.symbol(sym).ty.clone())
            } else {
                let t = self.eval_type_expr(texpr, scope, enclosing, false);
                self.model.symbol_mut(sym).ty = t.clone();
                Some(t)
            }
        } else {
            None
        };

        match (&mut v.value, declared_target) {
            (Some(value), Some(target)) => {
                let vt = self.eval_expr(value, scope, enclosing, EvalContext::target(target.clone()));
                self.convert_or_error(value, vt, target, &loc);
            }
            (Some(value), None) => {
                let vt = self.eval_expr(value, scope, enclosing, EvalContext::default());
                if matches!(vt, Type::Null | Type::Void) || vt.is_meta() {
                    self.log.error(&loc, "cannot infer a variable type from this initialiser");
                    self.model.symbol_mut(sym).ty = Type::Error;
                } else if !vt.is_error() {
                    self.model.symbol_mut(sym).ty = vt;
                }
            }
            (None, Some(_)) => {
                // Uninitialised with a declared type; pass 6 fills the default.
            }
            (None, None) => {
                self.log.error(&loc, "a variable declaration needs either a type or an initialiser");
                self.model.symbol_mut(sym).ty = Type::Error;
            }
        }
    }

    // -- expression evaluation -------------------------------------------

    fn eval_expr(&mut self, expr: &mut Expr, scope: ScopeId, enclosing: &Enclosing, ctx: EvalContext) -> Type {
        let loc = expr.loc.clone();
        let (ty, symbol, is_ctor) = self.eval_kind(&mut expr.kind, &loc, scope, enclosing, ctx);

        if matches!(ty, Type::Overloaded(_)) {
            // Only reachable for real (not during a suppressed trial call),
            // since the call path always re-resolves with `arg_types` set.
            self.log.error(&loc, "cannot resolve an overloaded function without a call context");
        }
        let stored = if matches!(ty, Type::Overloaded(_)) { Type::Error } else { ty.clone() };
        expr.computed_type = stored;
        expr.symbol = symbol;
        expr.is_ctor = is_ctor;
        ty
    }

    fn eval_kind(
        &mut self,
        kind: &mut ExprKind,
        loc: &Location,
        scope: ScopeId,
        enclosing: &Enclosing,
        ctx: EvalContext,
    ) -> (Type, Option<SymbolId>, bool) {
        match kind {
            ExprKind::IntLit(_) => (Type::Prim(PrimKind::Int), None, false),
            ExprKind::FloatLit(_) => (Type::Prim(PrimKind::Float), None, false),
            ExprKind::StringLit(_) => (Type::Prim(PrimKind::String), None, false),
            ExprKind::BoolLit(_) => (Type::Prim(PrimKind::Bool), None, false),
            ExprKind::CharLit(_) => (Type::Prim(PrimKind::Int), None, false),
            ExprKind::NullLit => (Type::Null, None, false),
            ExprKind::This => {
                if enclosing.in_function && !enclosing.is_static {
                    if let Some(cid) = enclosing.class {
                        return (Type::Class(cid), None, false);
                    }
                }
                self.log.error(loc, "'this' is only valid inside a non-static member function");
                (Type::Error, None, false)
            }
            ExprKind::Ident { name } => match builtin_type(name) {
                Some(t) => (t, None, false),
                None => match self.model.lookup(scope, name, LookupKind::Normal) {
                    Some(sym) => {
                        let (ty, resolved) = self.resolve_symbol_ref(sym, &ctx, loc);
                        (ty, Some(resolved), false)
                    }
                    None => {
                        self.log.error(loc, format_args!("undefined name '{name}'"));
                        (Type::Error, None, false)
                    }
                },
            },
            ExprKind::Member { object, name, safe } => self.eval_member(object, name, *safe, loc, scope, enclosing, &ctx),
            ExprKind::Index { object, index } => self.eval_index(object, index, loc, scope, enclosing),
            ExprKind::Unary { op, value } => (self.eval_unary(*op, value, loc, scope, enclosing), None, false),
            ExprKind::Binary { op, lhs, rhs } => (self.eval_binary(*op, lhs, rhs, loc, scope, enclosing), None, false),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, loc, scope, enclosing),
            ExprKind::Cast { target, value, .. } => (self.eval_cast(target, value, scope, enclosing), None, false),
            ExprKind::ListLit { items } => (self.eval_list_lit(items, loc, scope, enclosing, &ctx), None, false),
            ExprKind::ParamType { base, params } => (self.eval_param_type(*base, params, loc, scope, enclosing), None, false),
            ExprKind::NullableType { inner } => {
                let t = self.eval_type_expr(inner, scope, enclosing, false);
                (Type::meta(Type::nullable(t)), None, false)
            }
        }
    }

    fn resolve_symbol_ref(&mut self, sym: SymbolId, ctx: &EvalContext, loc: &Location) -> (Type, SymbolId) {
        let ty = self.model.symbol(sym).ty.clone();
        if let Type::Overloaded(members) = &ty {
            if let Some(arg_types) = &ctx.arg_types {
                let members = members.clone();
                let (resolved_ty, resolved_sym) = self.resolve_overload(&members, arg_types, loc);
                return (resolved_ty, resolved_sym.unwrap_or(sym));
            }
        }
        (ty, sym)
    }

    fn resolve_overload(&mut self, members: &[SymbolId], arg_types: &[Type], loc: &Location) -> (Type, Option<SymbolId>) {
        let mut exact = Vec::new();
        let mut implicit = Vec::new();
        for &m in members {
            if let Type::Func(_, params) = &self.model.symbol(m).ty {
                if params.len() != arg_types.len() {
                    continue;
                }
                if params.iter().zip(arg_types).all(|(p, a)| p == a) {
                    exact.push(m);
                } else if params.iter().zip(arg_types).all(|(p, a)| a.is_error() || implicitly_converts(a, p)) {
                    implicit.push(m);
                }
            }
        }
        let chosen = if !exact.is_empty() {
            if exact.len() > 1 {
                self.log.error(loc, "ambiguous call to overloaded function");
                return (Type::Error, None);
            }
            exact[0]
        } else if !implicit.is_empty() {
            if implicit.len() > 1 {
                self.log.error(loc, "ambiguous call to overloaded function");
                return (Type::Error, None);
            }
            implicit[0]
        } else {
            self.log.error(loc, "no overload matches the given arguments");
            return (Type::Error, None);
        };
        (self.model.symbol(chosen).ty.clone(), Some(chosen))
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_member(
        &mut self,
        object: &mut Expr,
        name: &Rc<str>,
        safe: bool,
        loc: &Location,
        scope: ScopeId,
        enclosing: &Enclosing,
        ctx: &EvalContext,
    ) -> (Type, Option<SymbolId>, bool) {
        let obj_t = self.eval_expr(object, scope, enclosing, EvalContext::default());
        if obj_t.is_error() {
            return (Type::Error, None, false);
        }

        let (class_id, is_static_ctx, is_nullable_obj) = match &obj_t {
            Type::Meta(inner) => match inner.as_ref() {
                Type::Class(cid) => (Some(*cid), true, false),
                _ => (None, false, false),
            },
            Type::Nullable(inner) => match inner.as_ref() {
                Type::Class(cid) => (Some(*cid), false, true),
                _ => (None, false, false),
            },
            Type::Class(cid) => (Some(*cid), false, false),
            _ => (None, false, false),
        };

        let Some(cid) = class_id else {
            self.log.error(loc, "cannot access a member of a non-class type");
            return (Type::Error, None, false);
        };

        if is_nullable_obj && !safe {
            self.log.error(
                loc,
                format_args!("cannot access member '{name}' on value of type {}?", self.model.class(cid).name),
            );
            return (Type::Error, None, false);
        }
        if safe && !is_nullable_obj {
            self.log.error(loc, "'?.' may only be used on a nullable value");
            return (Type::Error, None, false);
        }

        let class_scope = self.model.class(cid).scope;
        let lookup_kind = if is_static_ctx { LookupKind::StaticMember } else { LookupKind::InstanceMember };
        let Some(sym) = self.model.lookup(class_scope, name, lookup_kind) else {
            self.log.error(loc, format_args!("no member '{name}' on class '{}'", self.model.class(cid).name));
            return (Type::Error, None, false);
        };

        let (ty, resolved) = self.resolve_symbol_ref(sym, ctx, loc);
        let ty = if safe { Type::nullable(ty) } else { ty };
        (ty, Some(resolved), false)
    }

    fn eval_index(
        &mut self,
        object: &mut Expr,
        index: &mut Expr,
        loc: &Location,
        scope: ScopeId,
        enclosing: &Enclosing,
    ) -> (Type, Option<SymbolId>, bool) {
        let obj_t = self.eval_expr(object, scope, enclosing, EvalContext::default());
        let idx_t = self.eval_expr(index, scope, enclosing, EvalContext::target(Type::Prim(PrimKind::Int)));
        if obj_t.is_error() || idx_t.is_error() {
            return (Type::Error, None, false);
        }
        let Type::List(Some(item)) = &obj_t else {
            self.log.error(loc, "cannot index a non-list value");
            return (Type::Error, None, false);
        };
        if idx_t != Type::Prim(PrimKind::Int) {
            self.log.error(loc, "list index must be int");
            return (Type::Error, None, false);
        }
        ((**item).clone(), None, false)
    }

    fn eval_unary(&mut self, op: UnaryOp, value: &mut Expr, loc: &Location, scope: ScopeId, enclosing: &Enclosing) -> Type {
        let t = self.eval_expr(value, scope, enclosing, EvalContext::default());
        if t.is_error() {
            return Type::Error;
        }
        match op {
            UnaryOp::Neg => {
                if t.is_numeric() {
                    t
                } else {
                    self.log.error(loc, "unary '-' requires a number");
                    Type::Error
                }
            }
            UnaryOp::Not => {
                if t == Type::Prim(PrimKind::Bool) {
                    t
                } else {
                    self.log.error(loc, "unary '!' requires bool");
                    Type::Error
                }
            }
        }
    }

    fn eval_binary(&mut self, op: BinOp, lhs: &mut Expr, rhs: &mut Expr, loc: &Location, scope: ScopeId, enclosing: &Enclosing) -> Type {
        match op {
            BinOp::Assign => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::default());
                if lhs_t.is_meta() {
                    self.log.error(loc, "cannot assign to a type");
                    return Type::Error;
                }
                let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::target(lhs_t.clone()));
                self.convert_or_error(rhs, rhs_t, lhs_t.clone(), loc);
                lhs_t
            }
            BinOp::NullCoalesce => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::default());
                match lhs_t {
                    Type::Nullable(inner) => {
                        let inner = *inner;
                        let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::target(inner.clone()));
                        self.convert_or_error(rhs, rhs_t, inner.clone(), loc);
                        inner
                    }
                    _ if lhs_t.is_error() => Type::Error,
                    _ => {
                        self.log.error(loc, "'??' requires a nullable left-hand side");
                        Type::Error
                    }
                }
            }
            BinOp::And | BinOp::Or => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::target(Type::Prim(PrimKind::Bool)));
                let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::target(Type::Prim(PrimKind::Bool)));
                if !lhs_t.is_error() && lhs_t != Type::Prim(PrimKind::Bool) {
                    self.log.error(loc, format_args!("'{op}' requires bool operands"));
                }
                if !rhs_t.is_error() && rhs_t != Type::Prim(PrimKind::Bool) {
                    self.log.error(loc, format_args!("'{op}' requires bool operands"));
                }
                Type::Prim(PrimKind::Bool)
            }
            BinOp::Add => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::default());
                let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::default());
                if lhs_t.is_error() || rhs_t.is_error() {
                    return Type::Error;
                }
                if lhs_t == Type::Prim(PrimKind::String) && rhs_t == Type::Prim(PrimKind::String) {
                    return Type::Prim(PrimKind::String);
                }
                match self.widen_numeric(lhs, rhs, lhs_t, rhs_t) {
                    Some(t) => t,
                    None => {
                        self.log.error(loc, "'+' requires two numbers or two strings");
                        Type::Error
                    }
                }
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::default());
                let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::default());
                if lhs_t.is_error() || rhs_t.is_error() {
                    return Type::Error;
                }
                match self.widen_numeric(lhs, rhs, lhs_t, rhs_t) {
                    Some(t) => t,
                    None => {
                        self.log.error(loc, format_args!("'{op}' requires two numbers"));
                        Type::Error
                    }
                }
            }
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::target(Type::Prim(PrimKind::Int)));
                let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::target(Type::Prim(PrimKind::Int)));
                if !lhs_t.is_error() && lhs_t != Type::Prim(PrimKind::Int) {
                    self.log.error(loc, format_args!("'{op}' requires int operands"));
                }
                if !rhs_t.is_error() && rhs_t != Type::Prim(PrimKind::Int) {
                    self.log.error(loc, format_args!("'{op}' requires int operands"));
                }
                Type::Prim(PrimKind::Int)
            }
            BinOp::Eq | BinOp::Ne => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::default());
                let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::default());
                if lhs_t.is_error() || rhs_t.is_error() {
                    return Type::Prim(PrimKind::Bool);
                }
                if lhs_t == rhs_t {
                    // already comparable
                } else if implicitly_converts(&rhs_t, &lhs_t) {
                    self.wrap_in_cast(rhs, lhs_t.clone());
                } else if implicitly_converts(&lhs_t, &rhs_t) {
                    self.wrap_in_cast(lhs, rhs_t.clone());
                } else {
                    self.log.error(loc, "cannot compare values of unrelated types");
                }
                Type::Prim(PrimKind::Bool)
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let lhs_t = self.eval_expr(lhs, scope, enclosing, EvalContext::default());
                let rhs_t = self.eval_expr(rhs, scope, enclosing, EvalContext::default());
                if lhs_t.is_error() || rhs_t.is_error() {
                    return Type::Prim(PrimKind::Bool);
                }
                let both_string = lhs_t == Type::Prim(PrimKind::String) && rhs_t == Type::Prim(PrimKind::String);
                if both_string {
                    // no widening needed
                } else if self.widen_numeric(lhs, rhs, lhs_t.clone(), rhs_t.clone()).is_none() {
                    self.log.error(loc, "ordered comparison requires two numbers or two strings");
                }
                Type::Prim(PrimKind::Bool)
            }
        }
    }

    fn widen_numeric(&mut self, lhs: &mut Expr, rhs: &mut Expr, lhs_t: Type, rhs_t: Type) -> Option<Type> {
        if !lhs_t.is_numeric() || !rhs_t.is_numeric() {
            return None;
        }
        let wider = if lhs_t == Type::Prim(PrimKind::Float) || rhs_t == Type::Prim(PrimKind::Float) {
            Type::Prim(PrimKind::Float)
        } else {
            Type::Prim(PrimKind::Int)
        };
        if lhs_t != wider {
            self.wrap_in_cast(lhs, wider.clone());
        }
        if rhs_t != wider {
            self.wrap_in_cast(rhs, wider.clone());
        }
        Some(wider)
    }

    fn eval_call(&mut self, callee: &mut Expr, args: &mut [Expr], loc: &Location, scope: ScopeId, enclosing: &Enclosing) -> (Type, Option<SymbolId>, bool) {
        let prev = self.log.is_disabled();
        self.log.set_disabled(true);
        let trial = self.eval_expr(callee, scope, enclosing, EvalContext::default());
        self.log.set_disabled(prev);

        let callee_t = if matches!(trial, Type::Overloaded(_)) {
            let mut arg_types = Vec::with_capacity(args.len());
            for a in args.iter_mut() {
                arg_types.push(self.eval_expr(a, scope, enclosing, EvalContext::default()));
            }
            self.eval_expr(callee, scope, enclosing, EvalContext { target_type: None, arg_types: Some(arg_types) })
        } else {
            let real = self.eval_expr(callee, scope, enclosing, EvalContext::default());
            let param_types = if let Type::Func(_, params) = &real { Some(params.clone()) } else { None };
            for (i, a) in args.iter_mut().enumerate() {
                let target = param_types.as_ref().and_then(|p| p.get(i)).cloned();
                self.eval_expr(a, scope, enclosing, EvalContext { target_type: target, arg_types: None });
            }
            real
        };

        if callee_t.is_error() {
            return (Type::Error, None, false);
        }

        if let Type::Meta(inner) = &callee_t {
            return if let Type::Class(cid) = inner.as_ref() {
                let cid = *cid;
                if args.is_empty() {
                    (Type::Class(cid), None, true)
                } else {
                    self.log.error(loc, "constructor calls take no arguments");
                    (Type::Error, None, false)
                }
            } else {
                self.log.error(loc, "cannot call a type");
                (Type::Error, None, false)
            };
        }

        let Type::Func(ret, params) = &callee_t else {
            self.log.error(loc, "cannot call a non-function value");
            return (Type::Error, None, false);
        };
        if params.len() != args.len() {
            self.log.error(loc, format_args!("expected {} argument(s), found {}", params.len(), args.len()));
            return (Type::Error, None, false);
        }
        let ret = (**ret).clone();
        let params = params.clone();
        for (a, p) in args.iter_mut().zip(params) {
            let at = a.computed_type.clone();
            self.convert_or_error(a, at, p, loc);
        }
        (ret, None, false)
    }

    fn eval_cast(&mut self, target: &mut Expr, value: &mut Expr, scope: ScopeId, enclosing: &Enclosing) -> Type {
        let loc = target.loc.clone();
        let t = self.eval_type_expr(target, scope, enclosing, false);
        let value_t = self.eval_expr(value, scope, enclosing, EvalContext::target(t.clone()));
        if !value_t.is_error() && !t.is_error() && !cast_is_valid(&value_t, &t) {
            self.log.error(
                &loc,
                format_args!("cannot cast from {} to {}", self.model.display_type(&value_t), self.model.display_type(&t)),
            );
        }
        t
    }

    fn eval_list_lit(&mut self, items: &mut [Expr], loc: &Location, scope: ScopeId, enclosing: &Enclosing, ctx: &EvalContext) -> Type {
        let Some(Type::List(Some(item_box))) = &ctx.target_type else {
            for it in items.iter_mut() {
                self.eval_expr(it, scope, enclosing, EvalContext::default());
            }
            self.log.error(loc, "list literal needs a target type (e.g. from a declared variable type)");
            return Type::Error;
        };
        let item_t = (**item_box).clone();
        for it in items.iter_mut() {
            let it_t = self.eval_expr(it, scope, enclosing, EvalContext::target(item_t.clone()));
            self.convert_or_error(it, it_t, item_t.clone(), loc);
        }
        Type::list(item_t)
    }

    fn eval_param_type(&mut self, base: ParamBase, params: &mut [Expr], loc: &Location, scope: ScopeId, enclosing: &Enclosing) -> Type {
        match base {
            ParamBase::List => {
                if params.len() != 1 {
                    self.log.error(loc, "'list' takes exactly one type parameter");
                    return Type::Error;
                }
                let item = self.eval_type_expr(&mut params[0], scope, enclosing, false);
                Type::meta(Type::list(item))
            }
            ParamBase::Function => {
                if params.is_empty() {
                    self.log.error(loc, "'function' takes at least one type parameter");
                    return Type::Error;
                }
                let ret = self.eval_type_expr(&mut params[0], scope, enclosing, true);
                let args = params[1..].iter_mut().map(|p| self.eval_type_expr(p, scope, enclosing, false)).collect();
                Type::meta(Type::func(ret, args))
            }
        }
    }

    /// Evaluates `expr` as a type expression: runs the normal expression
    /// evaluator, then unwraps the resulting `meta(T)` to `T`. `is_return_type`
    /// is the signal that permits a bare `void` (only valid as a function's
    /// return type, never as a variable's type).
    pub(crate) fn eval_type_expr(&mut self, expr: &mut Expr, scope: ScopeId, enclosing: &Enclosing, is_return_type: bool) -> Type {
        let loc = expr.loc.clone();
        let t = self.eval_expr(expr, scope, enclosing, EvalContext::default());
        match t.instance() {
            Some(inner) => {
                if matches!(inner, Type::Void) && !is_return_type {
                    self.log.error(&loc, "'void' is only valid as a function return type");
                    Type::Error
                } else {
                    inner
                }
            }
            None => {
                if !t.is_error() {
                    self.log
                        .error(&loc, format_args!("expected a type, found a value of type {}", self.model.display_type(&t)));
                }
                Type::Error
            }
        }
    }

    fn convert_or_error(&mut self, expr: &mut Expr, from: Type, to: Type, loc: &Location) {
        if from.is_error() || to.is_error() || from == to {
            return;
        }
        if implicitly_converts(&from, &to) {
            self.wrap_in_cast(expr, to);
        } else {
            self.log.error(
                loc,
                format_args!("cannot convert {} to {}", self.model.display_type(&from), self.model.display_type(&to)),
            );
        }
    }

    /// Replaces `expr` in place with a synthesised `Cast` wrapping the
    /// original node as its `value` child, per §4.4's cast-insertion rule.
    fn wrap_in_cast(&mut self, expr: &mut Expr, target: Type) {
        let loc = expr.loc.clone();
        let placeholder = ExprNode::new(ExprKind::NullLit, loc.clone());
        let old = std::mem::replace(expr, placeholder);
        let target_expr = self.synthetic_type_expr(&target, &loc);
        let mut cast = ExprNode::new(
            ExprKind::Cast {
                target: target_expr,
                value: old,
                synthesized: true,
            },
            loc,
        );
        cast.computed_type = target;
        *expr = cast;
    }

    fn synthetic_type_expr(&self, target: &Type, loc: &Location) -> Expr {
        let name: Rc<str> = match target {
            Type::Prim(PrimKind::Bool) => "bool".into(),
            Type::Prim(PrimKind::Int) => "int".into(),
            Type::Prim(PrimKind::Float) => "float".into(),
            Type::Prim(PrimKind::String) => "string".into(),
            Type::Void => "void".into(),
            Type::Class(cid) => self.model.class(*cid).name.clone(),
            _ => "<synthesized>".into(),
        };
        let mut node = ExprNode::new(ExprKind::Ident { name }, loc.clone());
        node.computed_type = Type::meta(target.clone());
        node
    }
}

fn builtin_type(name: &str) -> Option<Type> {
    Some(match name {
        "void" => Type::meta(Type::Void),
        "bool" => Type::meta(Type::Prim(PrimKind::Bool)),
        "int" => Type::meta(Type::Prim(PrimKind::Int)),
        "float" => Type::meta(Type::Prim(PrimKind::Float)),
        "string" => Type::meta(Type::Prim(PrimKind::String)),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::passes::{define_symbols, structural, symbol_types};

    fn run_all(m: &mut Module) -> Log {
        let mut log = Log::new();
        structural::run(m, &mut log);
        assert!(log.errors().is_empty(), "structural: {:?}", log.errors());
        define_symbols::run(m, &mut log);
        assert!(log.errors().is_empty(), "define_symbols: {:?}", log.errors());
        symbol_types::run(m, &mut log);
        assert!(log.errors().is_empty(), "symbol_types: {:?}", log.errors());
        run(m, &mut log);
        log
    }

    #[test]
    fn exact_overload_picks_matching_signature_with_no_cast() {
        let mut m = module(vec![
            external(
                vec![
                    func_def("f", false, ty("void", 1), vec![arg("x", ty("int", 1), 1)], None, 1),
                    func_def("f", false, ty("void", 2), vec![arg("x", ty("float", 2), 2)], None, 2),
                ],
                1,
            ),
            func_def(
                "main",
                false,
                ty("void", 3),
                vec![],
                Some(vec![expr_stmt(call(ident("f", 3), vec![int_lit(1, 3)], 3), 3)]),
                3,
            ),
        ]);
        let log = run_all(&mut m);
        assert!(log.errors().is_empty(), "{:?}", log.errors());

        let Stmt::Func(main_fn) = &m.root.stmts[1] else { unreachable!() };
        let Stmt::Expr(es) = &main_fn.body.as_ref().unwrap().stmts[0] else { unreachable!() };
        let ExprKind::Call { args, .. } = &es.expr.kind else { unreachable!() };
        assert!(matches!(args[0].kind, ExprKind::IntLit(_)), "argument must not be wrapped in a cast");
    }

    #[test]
    fn implicit_int_to_float_argument_inserts_a_cast() {
        let mut m = module(vec![
            external(vec![func_def("f", false, ty("void", 1), vec![arg("x", ty("float", 1), 1)], None, 1)], 1),
            func_def(
                "main",
                false,
                ty("void", 2),
                vec![],
                Some(vec![expr_stmt(call(ident("f", 2), vec![int_lit(1, 2)], 2), 2)]),
                2,
            ),
        ]);
        let log = run_all(&mut m);
        assert!(log.errors().is_empty(), "{:?}", log.errors());

        let Stmt::Func(main_fn) = &m.root.stmts[1] else { unreachable!() };
        let Stmt::Expr(es) = &main_fn.body.as_ref().unwrap().stmts[0] else { unreachable!() };
        let ExprKind::Call { args, .. } = &es.expr.kind else { unreachable!() };
        assert!(matches!(args[0].kind, ExprKind::Cast { synthesized: true, .. }));
        assert_eq!(args[0].computed_type, Type::Prim(PrimKind::Float));
    }

    #[test]
    fn direct_member_access_on_nullable_without_safe_nav_errors() {
        let mut m = module(vec![
            class_def("A", false, vec![var_def("n", Some(ty("int", 1)), None, 1)], 1),
            var_def("a", Some(nullable_type(ty("A", 2), 2)), None, 2),
            func_def(
                "main",
                false,
                ty("void", 3),
                vec![],
                Some(vec![expr_stmt(member(ident("a", 3), "n", false, 3), 3)]),
                3,
            ),
        ]);
        let log = run_all(&mut m);
        assert_eq!(log.errors().len(), 1);
        assert!(log.errors()[0].contains("nullable") || log.errors()[0].contains('?'));
    }

    #[test]
    fn zero_arg_call_on_class_meta_is_flagged_as_constructor() {
        let mut m = module(vec![
            class_def("V", false, vec![], 1),
            func_def(
                "main",
                false,
                ty("void", 2),
                vec![],
                Some(vec![var_def("v", Some(ty("V", 2)), Some(call(ident("V", 2), vec![], 2)), 2)]),
                2,
            ),
        ]);
        let log = run_all(&mut m);
        assert!(log.errors().is_empty(), "{:?}", log.errors());

        let Stmt::Func(main_fn) = &m.root.stmts[1] else { unreachable!() };
        let Stmt::Var(v) = &main_fn.body.as_ref().unwrap().stmts[0] else { unreachable!() };
        assert!(v.value.as_ref().unwrap().is_ctor);
    }
}
