//! The "compile unit" that owns the shared resources one lex+parse pass
//! allocates into and reports through.
//!
//! The arena, the string interner, the diagnostic logger, and the source
//! manager are all owned by a containing compile unit and accessed only by
//! the lexer + parser of that unit. [`Session`] is that container:
//! it borrows a caller-owned [`Arena`] (so the arena itself is never
//! self-referentially nested inside the thing that borrows from it) and owns
//! the interner, source manager, and diagnostic logger outright. The lexer
//! and parser both take `&mut Session` for the duration of one parse.

use crate::arena::Arena;
use crate::diagnostics::DiagnosticLogger;
use crate::interner::Interner;
use crate::source::SourceManager;

pub struct Session<'bump> {
    pub arena: &'bump Arena,
    pub interner: Interner<'bump>,
    pub sources: SourceManager,
    pub diagnostics: DiagnosticLogger,
}

impl<'bump> Session<'bump> {
    pub fn new(arena: &'bump Arena) -> Self {
        Self {
            arena,
            interner: Interner::new(arena.bump()),
            sources: SourceManager::new(),
            diagnostics: DiagnosticLogger::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_shares_one_arena_across_interner_and_ast() {
        let arena = Arena::new();
        let mut session = Session::new(&arena);
        let a = session.interner.intern("foo");
        let b = session.interner.intern("foo");
        assert_eq!(a, b);
        let f = session.sources.register("a.cxy", "content");
        assert!(session.sources.is_registered(&f));
    }
}
