use std::io::{self, IsTerminal, Write};

use nu_ansi_term::{Color, Style};

use crate::error::{Error, RuntimeError, ValidationError};
use crate::program::Program;
use crate::theme::catppuccin::Mocha;

// sysexits.h
pub const EX_USAGE: i32 = 64;
pub const EX_DATAERR: i32 = 65;
pub const EX_SOFTWARE: i32 = 70;
pub const EX_IOERR: i32 = 74;
/// Conventional status for termination by SIGINT.
pub const EX_INTERRUPTED: i32 = 130;

/// Process exit status for an engine error.
pub fn exit_code(err: &Error) -> i32 {
    match err {
        Error::SourceUnavailable { .. } => EX_IOERR,
        Error::Config(_) => EX_USAGE,
        Error::Validation(_) => EX_DATAERR,
        Error::Runtime(RuntimeError::Io { .. }) => EX_IOERR,
        Error::Runtime(RuntimeError::Internal { .. }) => EX_SOFTWARE,
        Error::Runtime(RuntimeError::Canceled) => EX_INTERRUPTED,
        Error::Runtime(_) => 1,
    }
}

/// Colors are used only when stderr is a terminal and `NO_COLOR` is unset.
pub fn use_color() -> bool {
    io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn paint(color: bool, c: Color, msg: &str) -> String {
    if color {
        Style::new().fg(c).paint(msg).to_string()
    } else {
        msg.to_string()
    }
}

/// Pretty-print an engine error, with source context when it has a position.
/// If `program_name` is `Some("bf")`, messages are prefixed with "bf: ...".
pub fn print_error(program_name: Option<&str>, source: Option<&Program>, err: &Error) {
    let color = use_color();
    let prefix_program = |msg: &str| {
        if let Some(p) = program_name {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    let (msg, offset) = match err {
        Error::SourceUnavailable { .. } | Error::Config(_) => (prefix_program(&format!("Error :: {err}")), None),
        Error::Validation(v) => {
            let what = match v {
                ValidationError::UnmatchedClose { line, column, .. } => format!(
                    "Program validation error (line {line}, column {column}) :: closing bracket found with no opening bracket"
                ),
                ValidationError::UnmatchedOpen { count, .. } => {
                    format!("Program validation error :: found {count} opening bracket(s) without closing bracket")
                }
            };
            (prefix_program(&what), Some(v.offset()))
        }
        Error::Runtime(RuntimeError::StepLimitExceeded { .. } | RuntimeError::Canceled) => {
            let msg = prefix_program(&err.to_string());
            eprintln!("{}", paint(color, Mocha::YELLOW, &msg));
            let _ = io::stderr().flush();
            return;
        }
        Error::Runtime(r) => (prefix_program(&format!("Runtime error :: {r}")), r.pc()),
    };

    eprintln!("{}", paint(color, Mocha::RED, &msg));
    if let (Some(program), Some(offset)) = (source, offset) {
        print_context(program, offset, color);
    }
    let _ = io::stderr().flush();
}

/// Print the source line containing `offset` with a caret under it.
fn print_context(program: &Program, offset: usize, color: bool) {
    // Long lines are cut to a window around the offending byte.
    const WINDOW: usize = 32;

    let location = program.location(offset);
    let line = program.line_at(offset);
    let col = location.column - 1;
    let start = col.saturating_sub(WINDOW);
    let end = (col + WINDOW + 1).min(line.len());
    let excerpt = render_bytes(&line[start..end]);

    eprintln!("  {:>4} | {}", location.line, paint(color, Mocha::SURFACE2, &excerpt));

    let underline = format!("{}^", " ".repeat(col - start));
    eprintln!("       | {}", paint(color, Mocha::PEACH, &underline));
}

/// One display column per byte: printable ASCII as is, everything else as `?`.
fn render_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b == b' ' || b.is_ascii_graphic() { b as char } else { '?' })
        .collect()
}

/// Print a plain status line to stderr.
pub fn print_note(program_name: &str, msg: &str) {
    eprintln!("{}", paint(use_color(), Mocha::TEXT, &format!("{program_name}: {msg}")));
    let _ = io::stderr().flush();
}
