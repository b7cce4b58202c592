//! Scopes: named-symbol tables with parent links and lookup-kind rules (§3).

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ids::{ScopeId, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScopeKind {
    Module,
    Class,
    Func,
    Local,
}

/// Controls which scopes a lookup walks through and which symbols within a
/// class scope it accepts.
///
/// `Normal` skips class scopes entirely — members are not in lexical scope
/// inside methods, they must be reached via `this`/a member expression.
/// `InstanceMember`/`StaticMember` look *only* in a class scope, filtered by
/// the symbol's `is_static` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Normal,
    InstanceMember,
    StaticMember,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Insertion-ordered: diagnostics and the rename pass's overload
    /// disambiguation depend on a stable, declaration order.
    pub symbols: IndexMap<Rc<str>, SymbolId>,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            symbols: IndexMap::new(),
        }
    }
}
