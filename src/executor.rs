//! The dispatch loop.
//!
//! An [`Executor`] owns the tape and registers for one run of a validated
//! program. The tape is allocated once from the configured size and stays
//! readable through [`Executor::tape`] between chunks of execution; only the
//! I/O channel is lent per call.
//!
//! Behaviors:
//! - `>`/`<` follow the configured [`PointerPolicy`]: fatal at the tape ends,
//!   or wrap to the opposite end.
//! - `+`/`-` always wrap modulo 256; strict arithmetic additionally reports
//!   each wrap as a non-fatal [`ArithmeticEvent`].
//! - `,` stores the next input byte; on end of input it follows the
//!   configured [`EofPolicy`].
//! - `[` with a zero cell jumps past its matching `]`; `]` with a non-zero
//!   cell jumps back past its matching `[`.
//! - Any other byte is a no-op.

use std::mem;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::config::{EngineConfig, EofPolicy, JumpMode, PointerPolicy};
use crate::error::{ArithmeticEvent, ArithmeticKind, RuntimeError, ValidationError};
use crate::io::IoChannel;
use crate::program::{Instruction, Program};
use crate::tape::{Tape, TapeSize};
use crate::validator::{self, BracketMap};

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Debug, Default)]
pub struct StepControl {
    pub max_steps: Option<u64>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<u64>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Outcome of a single [`Executor::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One instruction executed; the PC advanced by one.
    Executed,
    /// A bracket at `from` jumped; the PC is now `to`.
    Jumped { from: usize, to: usize },
    /// The PC is past the end of the program.
    Halted,
}

/// Outcome of a bounded [`Executor::run_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// The budget ran out before the program finished.
    Suspended,
    Halted(RunSummary),
}

/// Counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Bytes processed by the dispatch loop, no-ops included.
    pub steps: u64,
    pub output_bytes: u64,
    pub arithmetic_events: u64,
}

type ArithmeticObserver = Box<dyn Fn(&ArithmeticEvent) + Send + Sync>;

/// Dispatch-loop state for one run of one program.
pub struct Executor<'p> {
    code: &'p [u8],
    jumps: Option<BracketMap>,
    tape: Tape,
    pointer_policy: PointerPolicy,
    eof_policy: EofPolicy,
    strict_arithmetic: bool,
    max_steps: Option<u64>,
    pc: usize,
    pointer: usize,
    summary: RunSummary,
    arithmetic_observer: Option<ArithmeticObserver>,
}

impl<'p> Executor<'p> {
    /// Validate `program` and prepare to run it on a fresh tape of
    /// `config.tape_size` cells.
    ///
    /// Validation runs to completion before any state exists, so a rejected
    /// program never allocates a tape.
    pub fn new(program: &'p Program, config: &EngineConfig) -> Result<Self, ValidationError> {
        let map = validator::analyze(program)?;
        Ok(Self::prepare(program, config, map, Tape::new(config.tape_size)))
    }

    /// As [`Executor::new`], running on `tape` instead of a fresh one.
    /// `config.tape_size` is ignored.
    pub fn with_tape(program: &'p Program, config: &EngineConfig, tape: Tape) -> Result<Self, ValidationError> {
        let map = validator::analyze(program)?;
        Ok(Self::prepare(program, config, map, tape))
    }

    fn prepare(program: &'p Program, config: &EngineConfig, map: BracketMap, tape: Tape) -> Self {
        let jumps = match config.jump_mode {
            JumpMode::Table => Some(map),
            JumpMode::Scan => None,
        };
        Self {
            code: program.as_bytes(),
            jumps,
            tape,
            pointer_policy: config.pointer_policy,
            eof_policy: config.eof_policy,
            strict_arithmetic: config.strict_arithmetic,
            max_steps: config.max_steps,
            pc: 0,
            pointer: 0,
            summary: RunSummary::default(),
            arithmetic_observer: None,
        }
    }

    /// Receive every [`ArithmeticEvent`] raised under strict arithmetic,
    /// in addition to the `warn` log line.
    pub fn set_arithmetic_observer<F>(&mut self, observer: F)
    where
        F: Fn(&ArithmeticEvent) + Send + Sync + 'static,
    {
        self.arithmetic_observer = Some(Box::new(observer));
    }

    /// Index of the next instruction.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Index of the current cell.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn into_tape(self) -> Tape {
        self.tape
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn is_halted(&self) -> bool {
        self.pc >= self.code.len()
    }

    /// Run the program to completion, stopping at the configured step limit.
    pub fn run<T: IoChannel>(&mut self, io: &mut T) -> Result<RunSummary, RuntimeError> {
        self.run_with_control(io, &StepControl::default())
    }

    /// Run to completion, checking the cancel flag and step limit before
    /// each instruction.
    ///
    /// `control.max_steps` takes precedence over the configured limit.
    pub fn run_with_control<T: IoChannel>(
        &mut self,
        io: &mut T,
        control: &StepControl,
    ) -> Result<RunSummary, RuntimeError> {
        tracing::debug!(
            program_len = self.code.len(),
            tape_len = self.tape.len(),
            pointer_policy = ?self.pointer_policy,
            eof_policy = ?self.eof_policy,
            table = self.jumps.is_some(),
            "starting run"
        );

        let result = self.drive(io, control, None);
        let flushed = io.flush();
        match result {
            Ok(_) => {
                flushed.map_err(|source| RuntimeError::Io { pc: self.pc, source })?;
                tracing::debug!(steps = self.summary.steps, output_bytes = self.summary.output_bytes, "run finished");
                Ok(self.summary)
            }
            Err(err) => {
                tracing::debug!(%err, pc = self.pc, pointer = self.pointer, "run aborted");
                Err(err)
            }
        }
    }

    /// Execute at most `budget` instructions, then return control.
    ///
    /// Calling again resumes where the previous chunk stopped. The configured
    /// step limit counts every chunk of the run.
    pub fn run_for<T: IoChannel>(&mut self, io: &mut T, budget: u64) -> Result<Chunk, RuntimeError> {
        let result = self.drive(io, &StepControl::default(), Some(budget));
        let flushed = io.flush();
        let halted = result?;
        flushed.map_err(|source| RuntimeError::Io { pc: self.pc, source })?;
        Ok(if halted { Chunk::Halted(self.summary) } else { Chunk::Suspended })
    }

    /// Returns whether the program halted.
    fn drive<T: IoChannel>(&mut self, io: &mut T, control: &StepControl, budget: Option<u64>) -> Result<bool, RuntimeError> {
        let limit = control.max_steps.or(self.max_steps);
        let mut executed = 0u64;
        while !self.is_halted() {
            if budget.is_some_and(|b| executed >= b) {
                return Ok(false);
            }

            // Cooperative cancellation check
            if control.cancel_flag.load(Ordering::Relaxed) {
                return Err(RuntimeError::Canceled);
            }

            if let Some(max) = limit {
                if self.summary.steps >= max {
                    return Err(RuntimeError::StepLimitExceeded { limit: max });
                }
            }

            self.step(io)?;
            executed += 1;
        }
        Ok(true)
    }

    /// Execute the instruction at the PC.
    pub fn step<T: IoChannel>(&mut self, io: &mut T) -> Result<Step, RuntimeError> {
        let Some(&byte) = self.code.get(self.pc) else {
            return Ok(Step::Halted);
        };
        let pc = self.pc;
        self.summary.steps += 1;

        match Instruction::decode(byte) {
            Some(Instruction::Right) => {
                if self.pointer >= self.tape.last_index() {
                    match self.pointer_policy {
                        PointerPolicy::Error => {
                            return Err(RuntimeError::TapeOverflow { pc, pointer: self.pointer });
                        }
                        PointerPolicy::Wrap => self.pointer = 0,
                    }
                } else {
                    self.pointer += 1;
                }
            }
            Some(Instruction::Left) => {
                if self.pointer == 0 {
                    match self.pointer_policy {
                        PointerPolicy::Error => return Err(RuntimeError::TapeUnderflow { pc }),
                        PointerPolicy::Wrap => self.pointer = self.tape.last_index(),
                    }
                } else {
                    self.pointer -= 1;
                }
            }
            Some(Instruction::Inc) => {
                let cell = self.tape.cell_mut(self.pointer);
                let (after, wrapped) = cell.overflowing_add(1);
                *cell = after;
                if wrapped {
                    self.report_wrap(pc, ArithmeticKind::Overflow);
                }
            }
            Some(Instruction::Dec) => {
                let cell = self.tape.cell_mut(self.pointer);
                let (after, wrapped) = cell.overflowing_sub(1);
                *cell = after;
                if wrapped {
                    self.report_wrap(pc, ArithmeticKind::Underflow);
                }
            }
            Some(Instruction::Output) => {
                let byte = self.tape.cells()[self.pointer];
                io.write_byte(byte).map_err(|source| RuntimeError::Io { pc, source })?;
                self.summary.output_bytes += 1;
            }
            Some(Instruction::Input) => {
                match io.read_byte().map_err(|source| RuntimeError::Io { pc, source })? {
                    Some(b) => *self.tape.cell_mut(self.pointer) = b,
                    None => {
                        if self.eof_policy == EofPolicy::Zero {
                            *self.tape.cell_mut(self.pointer) = 0;
                        }
                    }
                }
            }
            Some(Instruction::LoopStart) => {
                if self.tape.cells()[self.pointer] == 0 {
                    let close = self.partner(pc)?;
                    self.pc = close + 1;
                    return Ok(Step::Jumped { from: pc, to: self.pc });
                }
            }
            Some(Instruction::LoopEnd) => {
                if self.tape.cells()[self.pointer] != 0 {
                    let open = self.partner(pc)?;
                    self.pc = open + 1;
                    return Ok(Step::Jumped { from: pc, to: self.pc });
                }
            }
            None => {}
        }

        self.pc += 1;
        Ok(Step::Executed)
    }

    fn partner(&self, pc: usize) -> Result<usize, RuntimeError> {
        match &self.jumps {
            Some(map) => map.partner(pc).ok_or(RuntimeError::Internal {
                pc,
                bracket: self.code[pc] as char,
            }),
            None if self.code[pc] == b'[' => scan_forward(self.code, pc),
            None => scan_backward(self.code, pc),
        }
    }

    fn report_wrap(&mut self, pc: usize, kind: ArithmeticKind) {
        if !self.strict_arithmetic {
            return;
        }
        let event = ArithmeticEvent { pc, pointer: self.pointer, kind };
        self.summary.arithmetic_events += 1;
        tracing::warn!(target: "bf_engine::arith", pc, pointer = self.pointer, "runtime integer {kind}");
        if let Some(observer) = self.arithmetic_observer.as_ref() {
            (observer)(&event);
        }
    }
}

/// Find the `]` matching the `[` at `open`.
///
/// The depth counter starts at 1 for the bracket being left; nested `[`
/// raise it and `]` lower it. The match is where it returns to 0.
pub fn scan_forward(code: &[u8], open: usize) -> Result<usize, RuntimeError> {
    let mut depth = 1usize;
    for (i, &byte) in code.iter().enumerate().skip(open + 1) {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(RuntimeError::Internal { pc: open, bracket: '[' })
}

/// Find the `[` matching the `]` at `close`, walking backwards.
pub fn scan_backward(code: &[u8], close: usize) -> Result<usize, RuntimeError> {
    let mut depth = 1usize;
    for i in (0..close.min(code.len())).rev() {
        match code[i] {
            b']' => depth += 1,
            b'[' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(RuntimeError::Internal { pc: close, bracket: ']' })
}


/// Validate `program` and run it on `tape` with default policies.
///
/// The tape is handed back to the caller whether or not the run succeeds.
pub fn run<T: IoChannel>(program: &Program, tape: &mut Tape, io: &mut T) -> Result<RunSummary, crate::Error> {
    let placeholder = Tape::new(TapeSize::MIN);
    let mut executor = Executor::with_tape(program, &EngineConfig::default(), placeholder)?;
    mem::swap(&mut executor.tape, tape);
    let result = executor.run(io);
    mem::swap(&mut executor.tape, tape);
    Ok(result?)
}
