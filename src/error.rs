//! Error taxonomy shared by the validator, the executor and the CLI.

use std::fmt;
use std::path::PathBuf;

/// Top-level error surfaced by [`crate::interpret`] and the source loader.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program source could not be read.
    #[error("cannot read source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Bracket imbalance found before execution. Execution never starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A `]` with no open `[` before it.
    #[error("closing bracket with no opening bracket (line {line}, column {column})")]
    UnmatchedClose {
        line: usize,
        column: usize,
        /// Byte index of the offending `]`.
        offset: usize,
    },

    /// One or more `[` never closed.
    #[error("{count} opening bracket(s) without closing bracket")]
    UnmatchedOpen {
        count: usize,
        /// Byte index of the first unmatched `[`.
        offset: usize,
    },
}

impl ValidationError {
    /// Byte index the diagnostic should point at.
    pub fn offset(&self) -> usize {
        match self {
            ValidationError::UnmatchedClose { offset, .. }
            | ValidationError::UnmatchedOpen { offset, .. } => *offset,
        }
    }
}

/// Fatal conditions raised by the dispatch loop.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// `>` on the last cell under the error pointer policy.
    #[error("tape overflow at instruction {pc} (pointer={pointer})")]
    TapeOverflow { pc: usize, pointer: usize },

    /// `<` on cell 0 under the error pointer policy.
    #[error("tape underflow at instruction {pc}")]
    TapeUnderflow { pc: usize },

    /// The I/O channel failed during `,` or `.`.
    #[error("I/O error at instruction {pc}: {source}")]
    Io {
        pc: usize,
        #[source]
        source: std::io::Error,
    },

    /// A bracket scan ran past the program bounds. Unreachable for validated programs.
    #[error("internal error: no matching bracket for '{bracket}' at instruction {pc}")]
    Internal { pc: usize, bracket: char },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },

    /// Execution aborted due to cooperative cancellation.
    #[error("Execution aborted: cancelled")]
    Canceled,
}

impl RuntimeError {
    /// Instruction index the error occurred at, when it has one.
    pub fn pc(&self) -> Option<usize> {
        match self {
            RuntimeError::TapeOverflow { pc, .. }
            | RuntimeError::TapeUnderflow { pc }
            | RuntimeError::Io { pc, .. }
            | RuntimeError::Internal { pc, .. } => Some(*pc),
            RuntimeError::StepLimitExceeded { .. } | RuntimeError::Canceled => None,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot allocate 0 bytes of tape")]
    ZeroTapeSize,

    #[error("invalid tape size '{0}': expected a positive integer")]
    InvalidTapeSize(String),

    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Direction of a cell wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticKind {
    /// `+` on 255.
    Overflow,
    /// `-` on 0.
    Underflow,
}

impl fmt::Display for ArithmeticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticKind::Overflow => write!(f, "overflow"),
            ArithmeticKind::Underflow => write!(f, "underflow"),
        }
    }
}

/// Non-fatal cell wraparound, reported only under strict arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("runtime integer {kind} at instruction {pc} (cell {pointer})")]
pub struct ArithmeticEvent {
    pub pc: usize,
    pub pointer: usize,
    pub kind: ArithmeticKind,
}
