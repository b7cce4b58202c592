//! The arenas backing a single module's compilation: symbols, scopes and
//! classes, plus the insertion and lookup rules of §3/§4.2.

use std::rc::Rc;

use crate::classes::ClassInfo;
use crate::ids::{ClassId, ScopeId, SymbolId};
use crate::location::Location;
use crate::log::Log;
use crate::scope::{LookupKind, Scope, ScopeKind};
use crate::symbol::{Symbol, SymbolKind};
use crate::types::Type;

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SemanticModel {
    pub symbols: Vec<Symbol>,
    pub scopes: Vec<Scope>,
    pub classes: Vec<ClassInfo>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(kind, parent));
        id
    }

    pub fn new_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn class(&self, id: ClassId) -> &ClassInfo {
        &self.classes[id.index()]
    }

    pub fn new_class(&mut self, info: ClassInfo) -> ClassId {
        let id = ClassId::new(self.classes.len());
        self.classes.push(info);
        id
    }

    /// Inserts `incoming` under `name` into `scope`, applying the four
    /// insertion rules of §4.2. Returns the symbol id that ends up bound to
    /// `name` in the scope (which may differ from `incoming` when an
    /// overload set is created or extended).
    pub fn insert(&mut self, scope: ScopeId, name: Rc<str>, incoming: SymbolId, incoming_loc: &Location, log: &mut Log) {
        let existing = self.scope(scope).symbols.get(&name).copied();
        let Some(existing_id) = existing else {
            self.scope_mut(scope).symbols.insert(name, incoming);
            return;
        };

        let existing_is_function = self.symbol(existing_id).kind == SymbolKind::Function;
        let existing_is_overloaded = self.symbol(existing_id).kind == SymbolKind::OverloadedFunction;
        let incoming_is_function = self.symbol(incoming).kind == SymbolKind::Function;

        if existing_is_function && incoming_is_function {
            let overloaded = self.new_symbol(Symbol::overloaded(name.clone(), vec![existing_id, incoming]));
            self.scope_mut(scope).symbols.insert(name, overloaded);
        } else if existing_is_overloaded && incoming_is_function {
            self.symbol_mut(existing_id).overloads.push(incoming);
            if let Type::Overloaded(members) = &mut self.symbol_mut(existing_id).ty {
                members.push(incoming);
            }
        } else {
            log.error(incoming_loc, format_args!("redefinition of {name} in the same scope"));
        }
    }

    /// Looks up `name` starting at `scope`, honouring `kind`'s rules.
    pub fn lookup(&self, scope: ScopeId, name: &str, kind: LookupKind) -> Option<SymbolId> {
        match kind {
            LookupKind::Normal => self.lookup_normal(scope, name),
            LookupKind::InstanceMember => self.lookup_member(scope, name, true),
            LookupKind::StaticMember => self.lookup_member(scope, name, false),
        }
    }

    fn lookup_normal(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if s.kind != ScopeKind::Class {
                if let Some(&found) = s.symbols.get(name) {
                    return Some(found);
                }
            }
            current = s.parent;
        }
        None
    }

    /// `scope` here is expected to be (or to be inside) a class scope; we
    /// walk up to find the nearest class scope and look only there.
    fn lookup_member(&self, scope: ScopeId, name: &str, want_instance: bool) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if s.kind == ScopeKind::Class {
                return s.symbols.get(name).copied().filter(|&sym| self.symbol(sym).is_static != want_instance);
            }
            current = s.parent;
        }
        None
    }

    /// Renders a type for diagnostic messages, resolving class names through
    /// the class arena.
    pub fn display_type(&self, ty: &Type) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Prim(p) => p.to_string(),
            Type::Class(id) => self.class(*id).name.to_string(),
            Type::Func(ret, args) => {
                let args = args.iter().map(|a| self.display_type(a)).collect::<Vec<_>>().join(", ");
                format!("function<{}, {args}>", self.display_type(ret))
            }
            Type::Meta(inner) => format!("type({})", self.display_type(inner)),
            Type::Overloaded(_) => "<overloaded>".to_string(),
            Type::List(Some(item)) => format!("list<{}>", self.display_type(item)),
            Type::List(None) => "list<?>".to_string(),
            Type::Nullable(inner) => format!("{}?", self.display_type(inner)),
            Type::Null => "null".to_string(),
            Type::Error => "<error>".to_string(),
        }
    }
}
