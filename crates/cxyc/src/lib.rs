//! Driver crate for the cxy compiler frontend: the public entry points a
//! caller outside the `cxy-*` crates uses to go from `(filename, content)`
//! to an AST plus diagnostics, the module-cache contract, and an
//! `ariadne`-backed renderer for human-facing output.
//!
//! No command-line parsing lives here: `cxyc` stays a library plus a
//! `demos/compile_demo.rs` example binary rather than a CLI with a
//! subcommand tree.

mod driver;
mod module_cache;
mod render;
mod result;

pub use driver::{compile_file, compile_source, import_module, FsModuleResolver, ModuleLoadError, ModuleResolver};
pub use module_cache::{ImportCycle, ModuleCache, ModuleCacheEntry};
pub use render::render_parse_errors;
pub use result::{CompilationResult, Status};
