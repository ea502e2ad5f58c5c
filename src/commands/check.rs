use bf_engine::cli_util::{self, print_error, print_note};
use bf_engine::{Error, Program, analyze};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    /// Path to the Brainfuck source file
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let Some(path) = args.path else {
        eprintln!("{program}: expected path to source file");
        usage_and_exit(program, cli_util::EX_USAGE);
    };

    let source = match Program::from_path(&path) {
        Ok(source) => source,
        Err(err) => {
            print_error(Some(program), None, &err);
            return cli_util::exit_code(&err);
        }
    };

    match analyze(&source) {
        Ok(map) => {
            print_note(program, &format!("{}: ok ({} loops)", path.display(), map.pairs()));
            0
        }
        Err(err) => {
            let err = Error::from(err);
            print_error(Some(program), Some(&source), &err);
            cli_util::exit_code(&err)
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check <PATH>

Checks that every `[` has a matching `]` without running the program.
Exits 0 when balanced, 65 on the first imbalance.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
