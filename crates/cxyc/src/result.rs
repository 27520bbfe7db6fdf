//! `CompilationResult`/`Status` plus the convenience accessors
//! (`is_success`, `has_warnings`, `get_status_string`) built around the
//! rule that a result is successful iff status is `Success` and
//! `error_count == 0`.

use cxy_ast::Node;

/// Outcome of one `compile_source`/`compile_file`/`import_module` call.
/// The frontend only ever produces `Success`, `ParseError`, or
/// `IoError`/`InternalError` -- `SemanticError` is reserved for a later
/// semantic-analysis stage this crate does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    ParseError,
    SemanticError,
    IoError,
    InternalError,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::ParseError => "ParseError",
            Status::SemanticError => "SemanticError",
            Status::IoError => "IoError",
            Status::InternalError => "InternalError",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{ status, astRoot, errorCount, warningCount }` plus
/// `is_success`/`has_warnings`/`get_status_string` accessors.
#[derive(Debug)]
pub struct CompilationResult<'bump> {
    pub status: Status,
    pub ast_root: Option<&'bump Node<'bump>>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl<'bump> CompilationResult<'bump> {
    pub fn new(status: Status, ast_root: Option<&'bump Node<'bump>>, error_count: usize, warning_count: usize) -> Self {
        Self {
            status,
            ast_root,
            error_count,
            warning_count,
        }
    }

    /// A result is successful iff status is `Success` and `error_count == 0`.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success && self.error_count == 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    pub fn get_status_string(&self) -> &'static str {
        self.status.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_zero_errors() {
        let r = CompilationResult::new(Status::Success, None, 1, 0);
        assert!(!r.is_success());
        let r = CompilationResult::new(Status::Success, None, 0, 2);
        assert!(r.is_success());
        assert!(r.has_warnings());
    }

    #[test]
    fn status_string_round_trips() {
        assert_eq!(Status::ParseError.to_string(), "ParseError");
    }
}
