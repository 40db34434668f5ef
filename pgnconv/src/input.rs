//! Where move text comes from: command-line arguments, a file, or stdin.

use std::io::Read;
use std::path::Path;

/// Read the whole input source: `path` if given, stdin otherwise.
pub fn read_source(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading input file");
            std::fs::read_to_string(path)
        }
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Coordinate moves from the arguments, or from the file/stdin when no
/// moves were given on the command line.
pub fn coordinate_moves(args: &[String], path: Option<&Path>) -> std::io::Result<String> {
    if args.is_empty() {
        read_source(path)
    } else {
        Ok(args.join(" "))
    }
}
