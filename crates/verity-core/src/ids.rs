//! Small `Copy` arena handles used instead of owning/GC'd cross-references.
//!
//! Symbols, scopes and classes are cross-referenced from many places in the
//! AST (a symbol's type mentions a class, a scope's parent is another scope,
//! an identifier resolves to a symbol). Rather than modelling those as
//! reference-counted pointers, each lives in a flat arena on
//! [`crate::model::SemanticModel`] and is referred to by one of these
//! newtype indices, mirroring the teacher crate's `StringId`/`NamespaceId`
//! pattern.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SymbolId(u32);

impl SymbolId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index.try_into().expect("more symbols than fit in a u32"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ScopeId(u32);

impl ScopeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index.try_into().expect("more scopes than fit in a u32"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index.try_into().expect("more classes than fit in a u32"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}
