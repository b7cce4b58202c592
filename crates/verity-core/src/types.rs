//! The type domain (§3 of the semantic-analysis specification).

use crate::ids::{ClassId, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum PrimKind {
    Bool,
    Int,
    Float,
    String,
}

/// `void | prim | class | func | meta | overloaded | list | nullable | null | error`.
///
/// `overloaded` and `error` are never equal to anything, including
/// themselves (see the custom [`PartialEq`] impl below) — this is
/// intentional per the data model, not an oversight.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Void,
    Prim(PrimKind),
    Class(ClassId),
    Func(Box<Type>, Vec<Type>),
    Meta(Box<Type>),
    Overloaded(Vec<SymbolId>),
    /// `None` item type means partially applied — only legal as the operand
    /// of a type-parameter expression, never in a value position.
    List(Option<Box<Type>>),
    Nullable(Box<Type>),
    Null,
    Error,
}

impl Type {
    pub fn meta(inner: Type) -> Type {
        Type::Meta(Box::new(inner))
    }

    pub fn func(ret: Type, args: Vec<Type>) -> Type {
        Type::Func(Box::new(ret), args)
    }

    pub fn list(item: Type) -> Type {
        Type::List(Some(Box::new(item)))
    }

    /// Collapses `nullable(nullable(T))` into `nullable(T)`, per the
    /// invariant that double-nullables cannot exist.
    pub fn nullable(inner: Type) -> Type {
        match inner {
            Type::Nullable(t) => Type::Nullable(t),
            other => Type::Nullable(Box::new(other)),
        }
    }

    /// `inst(meta(T)) = T`; `None` if this is not a (complete) meta type.
    pub fn instance(&self) -> Option<Type> {
        match self {
            Type::Meta(inner) => Some((**inner).clone()),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Prim(PrimKind::Int) | Type::Prim(PrimKind::Float))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_meta(&self) -> bool {
        matches!(self, Type::Meta(_))
    }

    /// A meta type is complete when its instance has no free `list(None)`
    /// or unapplied `func` sub-parameters.
    pub fn is_complete(&self) -> bool {
        fn complete(t: &Type) -> bool {
            match t {
                Type::List(None) => false,
                Type::List(Some(item)) => complete(item),
                Type::Nullable(inner) => complete(inner),
                Type::Func(ret, args) => complete(ret) && args.iter().all(complete),
                _ => true,
            }
        }
        match self {
            Type::Meta(inner) => complete(inner),
            _ => false,
        }
    }
}

/// Structural equality. Does not consider implicit conversions.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Never equal to anything, including another instance of themselves.
            (Type::Overloaded(_), _) | (_, Type::Overloaded(_)) => false,
            (Type::Error, _) | (_, Type::Error) => false,
            (Type::Void, Type::Void) => true,
            (Type::Null, Type::Null) => true,
            (Type::Prim(a), Type::Prim(b)) => a == b,
            (Type::Class(a), Type::Class(b)) => a == b,
            (Type::Func(ra, aa), Type::Func(rb, ab)) => ra == rb && aa == ab,
            (Type::Meta(a), Type::Meta(b)) => a == b,
            (Type::List(a), Type::List(b)) => a == b,
            (Type::Nullable(a), Type::Nullable(b)) => a == b,
            _ => false,
        }
    }
}

/// Exactly two implicit conversions are permitted: `int -> float`, and
/// `T -> nullable(U)` whenever `T == null`, `T == U`, or `T` implicitly
/// converts to `U`.
pub fn implicitly_converts(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    if matches!(from, Type::Prim(PrimKind::Int)) && matches!(to, Type::Prim(PrimKind::Float)) {
        return true;
    }
    if let Type::Nullable(inner) = to {
        if matches!(from, Type::Null) {
            return true;
        }
        return from == inner.as_ref() || implicitly_converts(from, inner);
    }
    false
}

/// Cast expressions additionally permit any numeric<->numeric conversion.
pub fn cast_is_valid(from: &Type, to: &Type) -> bool {
    from == to || implicitly_converts(from, to) || (from.is_numeric() && to.is_numeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_nullable_collapses() {
        let t = Type::nullable(Type::nullable(Type::Prim(PrimKind::Int)));
        assert_eq!(t, Type::Nullable(Box::new(Type::Prim(PrimKind::Int))));
    }

    #[test]
    fn overloaded_never_equal_to_itself() {
        let a = Type::Overloaded(vec![]);
        let b = Type::Overloaded(vec![]);
        assert_ne!(a, b);
        assert_ne!(a, a.clone());
    }

    #[test]
    fn error_never_equal_to_itself() {
        assert_ne!(Type::Error, Type::Error);
    }

    #[test]
    fn int_converts_to_float_not_back() {
        assert!(implicitly_converts(&Type::Prim(PrimKind::Int), &Type::Prim(PrimKind::Float)));
        assert!(!implicitly_converts(&Type::Prim(PrimKind::Float), &Type::Prim(PrimKind::Int)));
    }

    #[test]
    fn null_and_t_convert_to_nullable_t() {
        let nullable_int = Type::nullable(Type::Prim(PrimKind::Int));
        assert!(implicitly_converts(&Type::Null, &nullable_int));
        assert!(implicitly_converts(&Type::Prim(PrimKind::Int), &nullable_int));
        assert!(implicitly_converts(&Type::Prim(PrimKind::Int), &Type::nullable(Type::Prim(PrimKind::Float))));
    }

    #[test]
    fn cast_allows_any_numeric_pair() {
        assert!(cast_is_valid(&Type::Prim(PrimKind::Float), &Type::Prim(PrimKind::Int)));
    }
}
