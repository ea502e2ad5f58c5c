use bf_engine::cli_util::{self, print_error};
use bf_engine::{EngineConfig, EofPolicy, Error, JumpMode, PointerPolicy, Program, StepControl, Streams, TapeSize};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Path to the Brainfuck source file
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Number of tape cells (default 30000)
    #[arg(value_name = "TAPE_SIZE")]
    pub tape_size: Option<String>,

    /// Wrap the pointer at the tape ends instead of failing
    #[arg(short = 'w', long = "wrap")]
    pub wrap: bool,

    /// Warn on every cell wraparound
    #[arg(short = 's', long = "strict-arithmetic")]
    pub strict_arithmetic: bool,

    /// Cell value after `,` hits end of input
    #[arg(long = "eof", value_enum, value_name = "POLICY")]
    pub eof: Option<EofPolicy>,

    /// Bracket matching strategy
    #[arg(long = "jumps", value_enum, value_name = "MODE")]
    pub jumps: Option<JumpMode>,

    /// Maximum interpreter steps before abort (overrides BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Read engine settings from PATH instead of $BF_CONFIG or bf.toml
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Resolve settings: flags -> env -> config file -> defaults.
fn resolve_config(args: &RunArgs) -> Result<EngineConfig, Error> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::discover()?,
    }
    .with_env_overrides();

    if let Some(size) = &args.tape_size {
        config.tape_size = size.parse::<TapeSize>()?;
    }
    if args.wrap {
        config.pointer_policy = PointerPolicy::Wrap;
    }
    if args.strict_arithmetic {
        config.strict_arithmetic = true;
    }
    if let Some(eof) = args.eof {
        config.eof_policy = eof;
    }
    if let Some(jumps) = args.jumps {
        config.jump_mode = jumps;
    }
    if args.max_steps.is_some() {
        config.max_steps = args.max_steps;
    }

    Ok(config)
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let Some(path) = args.path.clone() else {
        eprintln!("{program}: expected path to source file");
        usage_and_exit(program, cli_util::EX_USAGE);
    };

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(err) => {
            print_error(Some(program), None, &err);
            return cli_util::exit_code(&err);
        }
    };

    let source = match Program::from_path(&path) {
        Ok(source) => source,
        Err(err) => {
            print_error(Some(program), None, &err);
            return cli_util::exit_code(&err);
        }
    };

    // First ctrl+c cancels the run so buffered output is flushed. A second one
    // exits at once; output still buffered in `Streams` is lost.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if interrupted_again(&cancel_handler) {
            std::process::exit(cli_util::EX_INTERRUPTED);
        }
    }) {
        tracing::warn!("failed to set ctrl+c handler: {e}");
    }

    let control = StepControl::new(config.max_steps, cancel);
    let mut io = Streams::stdio();
    match bf_engine::interpret_with_control(&source, &config, &mut io, &control) {
        Ok(summary) => {
            tracing::debug!(
                steps = summary.steps,
                output_bytes = summary.output_bytes,
                arithmetic_events = summary.arithmetic_events,
                "program finished"
            );
            0
        }
        Err(err) => {
            print_error(Some(program), Some(&source), &err);
            cli_util::exit_code(&err)
        }
    }
}

/// Raise the cancel flag. Returns whether it was already raised.
fn interrupted_again(cancel: &AtomicBool) -> bool {
    cancel.swap(true, Ordering::Relaxed)
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run <PATH> [TAPE_SIZE] [OPTIONS]

Options:
  --wrap,              -w          Wrap the pointer at the tape ends instead of failing
  --strict-arithmetic, -s          Warn on every cell wraparound (255 -> 0, 0 -> 255)
  --eof <zero|unchanged>           Cell value after `,` hits end of input (default zero)
  --jumps <table|scan>             Bracket matching strategy (default table)
  --max-steps <N>                  Abort after N steps (overrides BF_MAX_STEPS)
  --config,            -c <PATH>   Read engine settings from PATH
  --help,              -h          Show this help

Notes:
- TAPE_SIZE must be a positive integer; the tape is never resized.
- Bytes other than ><+-,.[] are ignored, so comments are allowed.
- Program output goes to stdout; diagnostics go to stderr.

Examples:
- Run with a larger tape:
    {0} run ./program.bf 65536
- Feed a file to `,`:
    {0} run ./cat.bf < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
