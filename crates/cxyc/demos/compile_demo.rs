//! Minimal example binary driving the compile pipeline directly, with no
//! subcommand tree or argument parser -- just `cxyc-demo <file.cxy>`.
//!
//! Compiles the file, dumps the resulting AST as an S-expression, and
//! renders any parse errors with `ariadne`.

use std::path::PathBuf;
use std::process::ExitCode;

use cxy_common::{Arena, Session};

fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1);
    let path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("usage: cxyc-demo <file.cxy>");
            return ExitCode::FAILURE;
        }
    };

    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let result = cxyc::compile_file(&path, &mut session);

    match result.ast_root {
        Some(root) => println!("{}", cxy_fmt::format_node(root)),
        None => eprintln!("error: failed to read '{}'", path.display()),
    }

    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        eprintln!(
            "{} ({} error(s), {} warning(s))",
            result.status, result.error_count, result.warning_count
        );
        ExitCode::FAILURE
    }
}
