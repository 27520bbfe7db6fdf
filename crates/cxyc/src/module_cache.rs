//! Module cache: `canonical path -> { ast root, mtime, errorCount,
//! warningCount, hasSemanticInfo }` plus `beginImport`/`endImport` cycle
//! detection.
//!
//! Cycle detection is an explicit begin/end stack of in-progress imports
//! rather than a build-the-whole-graph-then-sort approach, so
//! `import_module` can refuse an *in-progress* cycle the moment it would
//! re-enter a module still being imported, not only a completed one.

use std::time::SystemTime;

use cxy_ast::Node;
use rustc_hash::FxHashMap;

/// One cached module's result, keyed by canonical path in [`ModuleCache`].
pub struct ModuleCacheEntry<'bump> {
    pub ast_root: &'bump Node<'bump>,
    pub mtime: Option<SystemTime>,
    pub error_count: usize,
    pub warning_count: usize,
    /// Left `false` by this frontend; a later semantic pass would flip this
    /// once it has annotated the tree.
    pub has_semantic_info: bool,
}

/// Returned by [`ModuleCache::begin_import`] when the requested path is
/// already on the in-progress stack: the cycle, from the first occurrence
/// of `path` to the current top of the stack.
#[derive(Debug, Clone)]
pub struct ImportCycle {
    pub path: String,
    pub cycle: Vec<String>,
}

impl std::fmt::Display for ImportCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "import cycle: {}", self.cycle.join(" -> "))
    }
}

/// Caches completed module compilations and guards against import cycles
/// while a chain of imports is still in progress.
#[derive(Default)]
pub struct ModuleCache<'bump> {
    entries: FxHashMap<String, ModuleCacheEntry<'bump>>,
    /// Stack of canonical paths currently being imported, outermost first.
    /// A path appearing twice on this stack is a cycle.
    in_progress: Vec<String>,
}

impl<'bump> ModuleCache<'bump> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&ModuleCacheEntry<'bump>> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: ModuleCacheEntry<'bump>) {
        self.entries.insert(path.into(), entry);
    }

    /// Push `path` onto the in-progress stack. Returns `Err(ImportCycle)`
    /// without modifying the stack if `path` is already being imported
    /// somewhere up the chain.
    pub fn begin_import(&mut self, path: impl Into<String>) -> Result<(), ImportCycle> {
        let path = path.into();
        if let Some(start) = self.in_progress.iter().position(|p| p == &path) {
            let mut cycle: Vec<String> = self.in_progress[start..].to_vec();
            cycle.push(path.clone());
            return Err(ImportCycle { path, cycle });
        }
        self.in_progress.push(path);
        Ok(())
    }

    /// Pop `path` off the in-progress stack once its import has finished
    /// (successfully or not). A no-op if `path` isn't on top -- callers are
    /// expected to pair `begin_import`/`end_import` in LIFO order, but a
    /// defensive `position`-based removal keeps a caller bug from corrupting
    /// unrelated entries.
    pub fn end_import(&mut self, path: &str) {
        if let Some(pos) = self.in_progress.iter().rposition(|p| p == path) {
            self.in_progress.remove(pos);
        }
    }

    pub fn in_progress_depth(&self) -> usize {
        self.in_progress.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxy_ast::{AstArena, NodeKind};
    use cxy_common::{Arena, Location, Position};
    use std::sync::Arc;

    fn loc() -> Location {
        Location::at(Arc::from("a.cxy"), Position::start())
    }

    #[test]
    fn begin_import_detects_cycle() {
        let mut cache: ModuleCache = ModuleCache::new();
        assert!(cache.begin_import("a").is_ok());
        assert!(cache.begin_import("b").is_ok());
        let err = cache.begin_import("a").unwrap_err();
        assert_eq!(err.cycle, vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(cache.in_progress_depth(), 2);
    }

    #[test]
    fn end_import_allows_reimport() {
        let mut cache: ModuleCache = ModuleCache::new();
        cache.begin_import("a").unwrap();
        cache.end_import("a");
        assert_eq!(cache.in_progress_depth(), 0);
        assert!(cache.begin_import("a").is_ok());
    }

    #[test]
    fn cache_stores_and_retrieves_entries() {
        let arena = Arena::new();
        let ast = AstArena::new(&arena);
        let root = ast.alloc(
            NodeKind::Module {
                name: None,
                top_level: ast.vec(),
                main_content: ast.vec(),
            },
            loc(),
        );
        let mut cache = ModuleCache::new();
        cache.insert(
            "a.cxy",
            ModuleCacheEntry {
                ast_root: root,
                mtime: None,
                error_count: 0,
                warning_count: 0,
                has_semantic_info: false,
            },
        );
        assert!(cache.contains("a.cxy"));
        assert_eq!(cache.get("a.cxy").unwrap().error_count, 0);
    }
}
