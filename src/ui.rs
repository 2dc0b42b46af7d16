//! Status messages on stderr, so stdout carries only node output.
//!
//! Write errors are ignored: a closed terminal or pipe is not a reason
//! to fail the run.

use colored::Colorize;
use std::io::{self, Write};

fn emit(symbol: &colored::ColoredString, msg: &str) {
    let _ = writeln!(io::stderr(), "{symbol} {msg}");
}

/// Print an info message
pub fn info(msg: &str) {
    emit(&"ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    emit(&"✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    emit(&"⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    emit(&"✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    let _ = writeln!(io::stderr(), "  {}", msg.dimmed());
}

/// Pluralize a count: `1 node`, `3 nodes`
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
