//! The frontend's entry points: `compile_source`, `compile_file`,
//! `import_module`. This frontend stops at "produce an AST root and
//! diagnostics" -- no semantic analysis, no code generation -- so a
//! `CompilationResult` here only ever reports `Success`, `ParseError`,
//! `IoError`, or `InternalError`, never `SemanticError`.
//!
//! Filesystem layout resolution (how an `import "path"` string maps to an
//! actual file) is a separate, swappable concern. `import_module` takes a
//! [`ModuleResolver`] rather than hardcode a path-search policy;
//! [`FsModuleResolver`] is the one concrete resolver this crate ships.

use std::path::{Path, PathBuf};

use cxy_ast::Node;
use cxy_common::{FileName, Location, Session};

use crate::module_cache::{ModuleCache, ModuleCacheEntry};
use crate::result::{CompilationResult, Status};

/// Lex + parse `content` (already registered under `filename` by the
/// caller's choice of name) into a module AST. Never panics; malformed
/// input is reflected in `error_count`/`status`, not a `Result::Err`.
pub fn compile_source<'bump>(content: &'bump str, filename: FileName, session: &mut Session<'bump>) -> CompilationResult<'bump> {
    let errors_before = session.diagnostics.error_count();
    let warnings_before = session.diagnostics.warning_count();

    let (root, _parse_errors) = cxy_parser::parse_module(filename, content, session);

    let error_count = session.diagnostics.error_count() - errors_before;
    let warning_count = session.diagnostics.warning_count() - warnings_before;
    let status = if error_count > 0 { Status::ParseError } else { Status::Success };
    CompilationResult::new(status, Some(root), error_count, warning_count)
}

/// Read `path`, register it, and run [`compile_source`] over its contents.
/// A read failure (missing file, invalid UTF-8, permission error) yields
/// `Status::IoError` with no AST root.
pub fn compile_file<'bump>(path: &Path, session: &mut Session<'bump>) -> CompilationResult<'bump> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let content = session.arena.alloc_str(&text);
            let filename: FileName = std::sync::Arc::from(path.to_string_lossy().as_ref());
            compile_source(content, filename, session)
        }
        Err(_) => CompilationResult::new(Status::IoError, None, 1, 0),
    }
}

/// A read-only error a [`ModuleResolver`] returns when it cannot locate
/// `module_path` from `current_file`.
#[derive(Debug, Clone)]
pub struct ModuleLoadError {
    pub module_path: String,
    pub message: String,
}

/// Turns an `import "path"` string plus the importing file into
/// `(canonical_path, source_text)`. Implementors may consult a module-cache
/// policy, a project manifest, or a library search path; none of that is
/// this crate's concern.
pub trait ModuleResolver {
    fn resolve(&self, module_path: &str, current_file: &FileName) -> Result<(String, String), ModuleLoadError>;
}

/// A minimal filesystem resolver: relative to `current_file`'s directory
/// first, then each of `library_paths` in order. Appends `.cxy` if the
/// requested path has no extension. Single-file resolution only -- no
/// project manifest lookup.
pub struct FsModuleResolver {
    pub library_paths: Vec<PathBuf>,
}

impl FsModuleResolver {
    pub fn new(library_paths: Vec<PathBuf>) -> Self {
        Self { library_paths }
    }

    fn candidate(base: &Path, module_path: &str) -> PathBuf {
        let mut p = base.join(module_path);
        if p.extension().is_none() {
            p.set_extension("cxy");
        }
        p
    }
}

impl ModuleResolver for FsModuleResolver {
    fn resolve(&self, module_path: &str, current_file: &FileName) -> Result<(String, String), ModuleLoadError> {
        let current_dir = Path::new(current_file.as_ref())
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut tried = Vec::new();
        for base in std::iter::once(&current_dir).chain(self.library_paths.iter()) {
            let candidate = Self::candidate(base, module_path);
            match std::fs::read_to_string(&candidate) {
                Ok(text) => return Ok((candidate.to_string_lossy().into_owned(), text)),
                Err(_) => tried.push(candidate.to_string_lossy().into_owned()),
            }
        }
        Err(ModuleLoadError {
            module_path: module_path.to_string(),
            message: format!("module '{module_path}' not found (tried: {})", tried.join(", ")),
        })
    }
}

/// Resolve, cycle-check, cache, and parse an imported module.
/// Returns `None` (with a diagnostic already logged) on a resolution
/// failure or an import cycle; otherwise returns the module's AST root,
/// reusing a cached parse when `module_path` was already compiled earlier
/// in this session.
pub fn import_module<'bump>(
    module_path: &str,
    current_file: &FileName,
    import_location: Location,
    session: &mut Session<'bump>,
    cache: &mut ModuleCache<'bump>,
    resolver: &dyn ModuleResolver,
) -> Option<&'bump Node<'bump>> {
    let (canonical, text) = match resolver.resolve(module_path, current_file) {
        Ok(resolved) => resolved,
        Err(e) => {
            session.diagnostics.fatal(import_location, e.message, &session.sources);
            return None;
        }
    };

    if let Some(entry) = cache.get(&canonical) {
        return Some(entry.ast_root);
    }

    if let Err(cycle) = cache.begin_import(canonical.clone()) {
        session.diagnostics.error(import_location, cycle.to_string(), &session.sources);
        return None;
    }

    let content = session.arena.alloc_str(&text);
    let filename: FileName = std::sync::Arc::from(canonical.as_str());
    let result = compile_source(content, filename, session);
    cache.end_import(&canonical);

    let root = result.ast_root?;
    cache.insert(
        canonical,
        ModuleCacheEntry {
            ast_root: root,
            mtime: None,
            error_count: result.error_count,
            warning_count: result.warning_count,
            has_semantic_info: false,
        },
    );
    Some(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxy_common::Arena;
    use std::sync::Arc;

    #[test]
    fn compile_source_reports_success_on_clean_input() {
        let arena = Arena::new();
        let mut session = Session::new(&arena);
        let content = arena.alloc_str("func main() i32 => 0");
        let result = compile_source(content, Arc::from("main.cxy"), &mut session);
        assert!(result.is_success());
        assert_eq!(result.status, Status::Success);
        assert!(result.ast_root.is_some());
    }

    #[test]
    fn compile_source_reports_parse_error_on_malformed_input() {
        let arena = Arena::new();
        let mut session = Session::new(&arena);
        let content = arena.alloc_str("func main( i32 => 0");
        let result = compile_source(content, Arc::from("main.cxy"), &mut session);
        assert_eq!(result.status, Status::ParseError);
        assert!(!result.is_success());
        assert!(result.error_count > 0);
    }

    #[test]
    fn compile_file_reports_io_error_on_missing_file() {
        let arena = Arena::new();
        let mut session = Session::new(&arena);
        let result = compile_file(Path::new("/nonexistent/does/not/exist.cxy"), &mut session);
        assert_eq!(result.status, Status::IoError);
        assert!(result.ast_root.is_none());
    }

    #[test]
    fn import_module_detects_cycle() {
        let arena = Arena::new();
        let mut session = Session::new(&arena);
        let mut cache = ModuleCache::new();

        struct LoopResolver;
        impl ModuleResolver for LoopResolver {
            fn resolve(&self, module_path: &str, _current_file: &FileName) -> Result<(String, String), ModuleLoadError> {
                Ok((module_path.to_string(), "import \"self\"".to_string()))
            }
        }

        cache.begin_import("self").unwrap();
        let loc = Location::at(Arc::from("a.cxy"), cxy_common::Position::start());
        let root = import_module("self", &Arc::from("a.cxy"), loc, &mut session, &mut cache, &LoopResolver);
        assert!(root.is_none());
        assert!(session.diagnostics.has_errors());
    }
}
