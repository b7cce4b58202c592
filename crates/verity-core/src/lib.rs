//! Semantic analysis core for a small statically-typed, class-based
//! language. Turns a parsed AST into a fully-decorated AST, or into a set of
//! diagnostics — lexing, parsing and code generation are out of scope
//! (`build` is a programmatic AST constructor, not a parser).

pub mod ast;
pub mod build;
pub mod classes;
pub mod ids;
pub mod location;
pub mod log;
pub mod model;
pub mod passes;
pub mod scope;
pub mod symbol;
pub mod types;

pub use ast::Module;
pub use log::Log;
pub use passes::{compile, rename_symbols};
