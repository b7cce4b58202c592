//! The class arena: cross-referenced from `Type::Class` and from `ClassDef`
//! AST nodes once pass 2 has run.

use std::rc::Rc;

use crate::ids::{ScopeId, SymbolId};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassInfo {
    pub name: Rc<str>,
    pub symbol: SymbolId,
    pub scope: ScopeId,
}
