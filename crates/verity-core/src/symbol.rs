//! Symbols: the resolved identity of a declaration (§3).

use std::rc::Rc;

use crate::ids::SymbolId;
use crate::location::Location;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SymbolKind {
    Variable,
    Function,
    Class,
    OverloadedFunction,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    pub name: Rc<str>,
    pub kind: SymbolKind,
    /// Functions and classes only; always `false` for variables.
    pub is_static: bool,
    /// Location of the defining node, for diagnostics. `None` for symbols
    /// synthesised rather than taken straight from a `Def` (there are none
    /// of those in this pipeline, but the field stays nullable per the data
    /// model).
    pub def_location: Option<Location>,
    pub ty: Type,
    /// Filled in by the optional rename pass.
    pub final_name: Option<Rc<str>>,
    /// Non-empty only for `OverloadedFunction` symbols.
    pub overloads: Vec<SymbolId>,
}

impl Symbol {
    pub fn new(name: impl Into<Rc<str>>, kind: SymbolKind, is_static: bool, def_location: Location) -> Self {
        Self {
            name: name.into(),
            kind,
            is_static,
            def_location: Some(def_location),
            ty: Type::Error,
            final_name: None,
            overloads: Vec::new(),
        }
    }

    pub fn overloaded(name: impl Into<Rc<str>>, members: Vec<SymbolId>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::OverloadedFunction,
            is_static: false,
            def_location: None,
            ty: Type::Overloaded(members.clone()),
            final_name: None,
            overloads: members,
        }
    }

    pub fn is_function_like(&self) -> bool {
        matches!(self.kind, SymbolKind::Function | SymbolKind::OverloadedFunction)
    }

    /// The name downstream code generation should use: the rename pass's
    /// result if it ran, otherwise the source name.
    pub fn output_name(&self) -> &str {
        self.final_name.as_deref().unwrap_or(&self.name)
    }
}
