//! Pass 7 (optional, §4.7): renames symbols for a target language's reserved
//! words. A symbol whose name collides with a caller-supplied reserved word
//! is prefixed with `_`, repeating until the scope it lives in has no entry
//! under that name; the scope map is re-keyed in place so later lookups stay
//! consistent. When `rename_overloads` is set, every member of an overload
//! set additionally gets its name mangled with its parameter types, since a
//! target language without overloading needs one distinct name per member.
//! Neither rewrites the AST itself — only `Symbol.final_name`, which
//! `Symbol::output_name` prefers over the source name.

use crate::ast::Module;
use crate::ids::{ScopeId, SymbolId};
use crate::log::Log;
use crate::model::SemanticModel;
use crate::symbol::SymbolKind;
use crate::types::Type;

pub fn run(module: &mut Module, reserved: &[&str], rename_overloads: bool, _log: &mut Log) {
    let model = &mut module.model;

    for scope_idx in 0..model.scopes.len() {
        rename_reserved_in_scope(model, ScopeId::new(scope_idx), reserved);
    }

    if rename_overloads {
        let mut mangled = Vec::new();
        for sym in &model.symbols {
            if sym.kind == SymbolKind::OverloadedFunction {
                for &member in &sym.overloads {
                    mangled.push((member, mangle(member, model)));
                }
            }
        }
        for (id, name) in mangled {
            model.symbol_mut(id).final_name = Some(name.into());
        }
    }
}

/// Renames every entry of `scope` whose name collides with a reserved word,
/// re-keying the scope map so the rename is visible to later lookups.
/// Prefixing repeats until the candidate name is free in this scope — a
/// single `_` prefix is not guaranteed to be collision-free if the scope
/// already happens to bind that prefixed name to something else.
fn rename_reserved_in_scope(model: &mut SemanticModel, scope: ScopeId, reserved: &[&str]) {
    let names: Vec<_> = model.scope(scope).symbols.keys().cloned().collect();
    for name in names {
        if !reserved.contains(&name.as_ref()) {
            continue;
        }
        let mut candidate = format!("_{name}");
        while model.scope(scope).symbols.contains_key(candidate.as_str()) {
            candidate = format!("_{candidate}");
        }
        let candidate: std::rc::Rc<str> = candidate.into();
        let sym = model.scope_mut(scope).symbols.shift_remove(&name).expect("name came from this scope's own keys");
        model.scope_mut(scope).symbols.insert(candidate.clone(), sym);
        model.symbol_mut(sym).final_name = Some(candidate);
    }
}

fn mangle(member: SymbolId, model: &SemanticModel) -> String {
    let member_sym = model.symbol(member);
    let base = member_sym.final_name.as_deref().unwrap_or(&member_sym.name).to_string();
    let Type::Func(_, params) = &member_sym.ty else {
        return base;
    };
    if params.is_empty() {
        return base;
    }
    let suffix = params.iter().map(|p| mangle_type(p, model)).collect::<Vec<_>>().join("_");
    format!("{base}_{suffix}")
}

fn mangle_type(t: &Type, model: &SemanticModel) -> String {
    match t {
        Type::Prim(p) => p.to_string(),
        Type::Class(cid) => model.class(*cid).name.to_string(),
        Type::Nullable(inner) => format!("{}_opt", mangle_type(inner, model)),
        Type::List(Some(item)) => format!("list_{}", mangle_type(item, model)),
        _ => "x".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;
    use crate::build::*;
    use crate::passes::{compute_types, define_symbols, symbol_types};

    const JS_RESERVED: &[&str] = &[
        "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do", "else",
        "export", "extends", "finally", "for", "function", "if", "import", "in", "instanceof", "new", "return",
        "super", "switch", "this", "throw", "try", "typeof", "var", "void", "while", "with", "yield", "let",
        "static", "enum", "await", "implements", "package", "protected", "interface", "private", "public", "null",
        "true", "false",
    ];

    #[test]
    fn reserved_word_gets_underscore_prefixed() {
        let mut m = module(vec![func_def("class", false, ty("void", 1), vec![], Some(vec![]), 1)]);
        let mut log = Log::new();
        define_symbols::run(&mut m, &mut log);
        symbol_types::run(&mut m, &mut log);
        compute_types::run(&mut m, &mut log);
        run(&mut m, JS_RESERVED, false, &mut log);
        let Stmt::Func(f) = &m.root.stmts[0] else { unreachable!() };
        assert_eq!(m.model.symbol(f.symbol.unwrap()).output_name(), "_class");
    }

    #[test]
    fn reserved_word_rename_rekeys_the_scope_map_so_lookup_finds_the_new_name() {
        let mut m = module(vec![func_def("class", false, ty("void", 1), vec![], Some(vec![]), 1)]);
        let mut log = Log::new();
        define_symbols::run(&mut m, &mut log);
        symbol_types::run(&mut m, &mut log);
        compute_types::run(&mut m, &mut log);
        run(&mut m, JS_RESERVED, false, &mut log);

        let module_scope = m.root.scope.unwrap();
        assert!(m.model.scope(module_scope).symbols.get("class").is_none(), "old name must not survive in the scope map");
        let found = m.model.scope(module_scope).symbols.get("_class").copied();
        let Stmt::Func(f) = &m.root.stmts[0] else { unreachable!() };
        assert_eq!(found, f.symbol);
    }

    #[test]
    fn reserved_word_rename_reprefixes_until_collision_free() {
        // `class` is reserved and collides with a pre-existing `_class` in
        // the same scope, so the single-`_` prefix isn't enough.
        let mut m = module(vec![
            func_def("_class", false, ty("void", 1), vec![], Some(vec![]), 1),
            func_def("class", false, ty("void", 2), vec![], Some(vec![]), 2),
        ]);
        let mut log = Log::new();
        define_symbols::run(&mut m, &mut log);
        assert!(log.errors().is_empty(), "{:?}", log.errors());
        symbol_types::run(&mut m, &mut log);
        compute_types::run(&mut m, &mut log);
        run(&mut m, JS_RESERVED, false, &mut log);

        let Stmt::Func(f) = &m.root.stmts[1] else { unreachable!() };
        assert_eq!(m.model.symbol(f.symbol.unwrap()).output_name(), "__class");
        let module_scope = m.root.scope.unwrap();
        assert!(m.model.scope(module_scope).symbols.contains_key("__class"));
    }

    #[test]
    fn overload_members_get_distinct_mangled_names() {
        let mut m = module(vec![
            external(
                vec![
                    func_def("f", false, ty("void", 1), vec![arg("x", ty("int", 1), 1)], None, 1),
                    func_def("f", false, ty("void", 2), vec![arg("x", ty("float", 2), 2)], None, 2),
                ],
                1,
            ),
        ]);
        let mut log = Log::new();
        define_symbols::run(&mut m, &mut log);
        symbol_types::run(&mut m, &mut log);
        compute_types::run(&mut m, &mut log);
        run(&mut m, JS_RESERVED, true, &mut log);

        let Stmt::External(e) = &m.root.stmts[0] else { unreachable!() };
        let Stmt::Func(f1) = &e.block.stmts[0] else { unreachable!() };
        let Stmt::Func(f2) = &e.block.stmts[1] else { unreachable!() };
        let n1 = m.model.symbol(f1.symbol.unwrap()).output_name().to_string();
        let n2 = m.model.symbol(f2.symbol.unwrap()).output_name().to_string();
        assert_ne!(n1, n2);
        assert!(n1.contains("int"));
        assert!(n2.contains("float"));
    }

    #[test]
    fn overloads_are_left_unmangled_when_rename_overloads_is_false() {
        let mut m = module(vec![external(
            vec![
                func_def("f", false, ty("void", 1), vec![arg("x", ty("int", 1), 1)], None, 1),
                func_def("f", false, ty("void", 2), vec![arg("x", ty("float", 2), 2)], None, 2),
            ],
            1,
        )]);
        let mut log = Log::new();
        define_symbols::run(&mut m, &mut log);
        symbol_types::run(&mut m, &mut log);
        compute_types::run(&mut m, &mut log);
        run(&mut m, JS_RESERVED, false, &mut log);

        let Stmt::External(e) = &m.root.stmts[0] else { unreachable!() };
        let Stmt::Func(f1) = &e.block.stmts[0] else { unreachable!() };
        let Stmt::Func(f2) = &e.block.stmts[1] else { unreachable!() };
        assert_eq!(m.model.symbol(f1.symbol.unwrap()).output_name(), "f");
        assert_eq!(m.model.symbol(f2.symbol.unwrap()).output_name(), "f");
    }
}
