//! The six mandatory passes plus the optional rename pass, run in the fixed
//! order from §2: each one either fully succeeds or the pipeline halts with
//! whatever diagnostics it collected.

pub mod compute_types;
pub mod default_init;
pub mod define_symbols;
pub mod flow;
pub mod rename;
pub mod structural;
pub mod symbol_types;

use crate::ast::Module;
use crate::log::Log;

/// Runs passes 1-6 in order, halting after the first that reports any
/// error. Returns `true` iff the module fully succeeded, in which case the
/// AST is completely decorated (every invariant in §8's I1-I7 holds).
pub fn compile(log: &mut Log, module: &mut Module) -> bool {
    structural::run(module, log);
    if log.has_errors() {
        return false;
    }
    define_symbols::run(module, log);
    if log.has_errors() {
        return false;
    }
    symbol_types::run(module, log);
    if log.has_errors() {
        return false;
    }
    compute_types::run(module, log);
    if log.has_errors() {
        return false;
    }
    flow::run(module, log);
    if log.has_errors() {
        return false;
    }
    default_init::run(module, log);
    !log.has_errors()
}

/// Runs the optional pass 7. Only meaningful after [`compile`] returns
/// `true` — renaming a module with outstanding errors is undefined.
/// `reserved` is the caller's target-language keyword set; `rename_overloads`
/// opts into per-overload-member name mangling for backends with no
/// function overloading.
pub fn rename_symbols(module: &mut Module, reserved: &[&str], rename_overloads: bool, log: &mut Log) {
    rename::run(module, reserved, rename_overloads, log);
}
