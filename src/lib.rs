//! A byte-tape Brainfuck execution engine.
//!
//! This crate validates and runs Brainfuck programs on a fixed-length tape of
//! byte cells (30,000 by default) with a single data pointer.
//!
//! Features and behaviors:
//! - Programs are raw bytes; only `><+-,.[]` mean anything, every other byte
//!   is a no-op, so free-form comments are allowed.
//! - Bracket balance is checked before execution starts; the first stray `]`
//!   is reported with its line and column.
//! - Pointer bounds are fatal by default, or wrap with [`PointerPolicy::Wrap`].
//! - Cell arithmetic wraps modulo 256; strict arithmetic reports each wrap
//!   as a warning without stopping the program.
//! - Input `,` reads one byte; on EOF the current cell is set to 0 by default.
//! - Output `.` writes the current cell as one raw byte.
//!
//! Quick start:
//!
//! ```no_run
//! use bf_engine::{EngineConfig, Program, Streams, interpret};
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let program = Program::from(code);
//! let mut io = Streams::stdio();
//! interpret(&program, &EngineConfig::default(), &mut io).expect("program should run");
//! ```

pub mod cli_util;
pub mod config;
pub mod error;
pub mod executor;
pub mod io;
pub mod program;
pub mod tape;
pub mod theme;
pub mod validator;

pub use config::{EngineConfig, EofPolicy, JumpMode, PointerPolicy};
pub use error::{ArithmeticEvent, ArithmeticKind, ConfigError, Error, RuntimeError, ValidationError};
pub use executor::{Chunk, Executor, RunSummary, Step, StepControl, run};
pub use io::{IoChannel, Streams};
pub use program::{Instruction, Location, Program};
pub use tape::{DEFAULT_TAPE_SIZE, Tape, TapeSize};
pub use validator::{BracketMap, analyze, validate};

/// Validate `program`, allocate a tape sized by `config`, and run to completion.
pub fn interpret<T: IoChannel>(program: &Program, config: &EngineConfig, io: &mut T) -> Result<RunSummary, Error> {
    interpret_with_control(program, config, io, &StepControl::default())
}

/// As [`interpret`], with an external cancel flag. A step limit in `control`
/// replaces `config.max_steps`.
pub fn interpret_with_control<T: IoChannel>(
    program: &Program,
    config: &EngineConfig,
    io: &mut T,
    control: &StepControl,
) -> Result<RunSummary, Error> {
    let mut executor = Executor::new(program, config)?;
    Ok(executor.run_with_control(io, control)?)
}
