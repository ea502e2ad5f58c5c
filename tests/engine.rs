// End-to-end scenarios for the validator and the dispatch loop.

use bf_engine::{
    EngineConfig, Error, Executor, JumpMode, PointerPolicy, Program, RuntimeError, Step, Streams, Tape, TapeSize,
    ValidationError, interpret, run,
};

const HELLO_WORLD: &str = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";

fn run_to_output(code: &str, input: &[u8], config: &EngineConfig) -> Result<Vec<u8>, Error> {
    let program = Program::from(code);
    let mut io = Streams::new(input, Vec::new());
    interpret(&program, config, &mut io)?;
    Ok(io.into_parts().1)
}

/// Collect every jump taken while stepping `code` to completion.
fn jumps(code: &str, mode: JumpMode) -> Vec<(usize, usize)> {
    let program = Program::from(code);
    let config = EngineConfig { jump_mode: mode, tape_size: TapeSize::new(8).unwrap(), ..EngineConfig::default() };
    let mut executor = Executor::new(&program, &config).unwrap();
    let mut io = Streams::new(&b""[..], Vec::new());
    let mut taken = Vec::new();
    loop {
        match executor.step(&mut io).unwrap() {
            Step::Jumped { from, to } => {
                assert_eq!(executor.pc(), to);
                taken.push((from, to));
            }
            Step::Executed => {}
            Step::Halted => break,
        }
    }
    taken
}

#[test]
fn hello_world_prints_expected_bytes() {
    let output = run_to_output(HELLO_WORLD, b"", &EngineConfig::default()).unwrap();
    assert_eq!(output, b"Hello World!\n");
}

#[test]
fn hello_world_with_scanned_jumps_matches_table() {
    let scan = EngineConfig { jump_mode: JumpMode::Scan, ..EngineConfig::default() };
    let output = run_to_output(HELLO_WORLD, b"", &scan).unwrap();
    assert_eq!(output, b"Hello World!\n");
}

#[test]
fn comments_are_ignored() {
    let code = "This program prints A\n++++++++ set counter to eight\n[>++++++++<-] multiply\n>+. print";
    let output = run_to_output(code, b"", &EngineConfig::default()).unwrap();
    assert_eq!(output, b"A");
}

#[test]
fn two_hundred_fifty_six_increments_wrap_to_zero() {
    let code = format!("{}.", "+".repeat(256));
    let output = run_to_output(&code, b"", &EngineConfig::default()).unwrap();
    assert_eq!(output, vec![0]);
}

#[test]
fn echo_reproduces_every_byte() {
    for byte in 0..=255u8 {
        let output = run_to_output(",.", &[byte], &EngineConfig::default()).unwrap();
        assert_eq!(output, vec![byte]);
    }
}

#[test]
fn clear_loop_runs_exactly_n_iterations() {
    for n in 0..=255usize {
        let code = format!("{}[-]", "+".repeat(n));
        let program = Program::from(code.as_str());
        let config = EngineConfig { tape_size: TapeSize::new(1).unwrap(), ..EngineConfig::default() };
        let mut executor = Executor::new(&program, &config).unwrap();
        let mut io = Streams::new(&b""[..], Vec::new());
        let mut back_jumps = 0;
        loop {
            match executor.step(&mut io).unwrap() {
                Step::Jumped { from, .. } if from == n + 2 => back_jumps += 1,
                Step::Halted => break,
                _ => {}
            }
        }
        assert_eq!(executor.tape().get(0), Some(0));
        // The body runs once per iteration; every iteration but the last jumps back.
        let iterations = if n == 0 { 0 } else { back_jumps + 1 };
        assert_eq!(iterations, n, "loop starting at {n}");
        // Body '-' executed n times: n prefix '+', '[' and ']' per pass.
        let expected_steps = if n == 0 { n as u64 + 1 } else { (n + 1 + 2 * n) as u64 };
        assert_eq!(executor.summary().steps, expected_steps);
    }
}

#[test]
fn zero_cell_skips_double_nested_loop() {
    // 0:'[' 1:'[' 2:'-' 3:']' 4:']' -> '[' at 0 lands just past index 4.
    assert_eq!(jumps("[[-]]", JumpMode::Table), vec![(0, 5)]);
    assert_eq!(jumps("[[-]]", JumpMode::Scan), vec![(0, 5)]);
}

#[test]
fn inner_close_jumps_to_inner_open() {
    // 0:'+' 1:'+' 2:'[' 3:'[' 4:'-' 5:']' 6:']' -> ']' at 5 lands at 4.
    assert_eq!(jumps("++[[-]]", JumpMode::Table), vec![(5, 4)]);
    assert_eq!(jumps("++[[-]]", JumpMode::Scan), vec![(5, 4)]);
}

#[test]
fn nested_loop_jumps_land_after_matching_brackets() {
    // 2:'[' 3:'>' 4:'+' 5:'+' 6:'[' 7:'-' 8:']' 9:'<' 10:'-' 11:']'
    let expected = vec![(8, 7), (11, 3), (8, 7)];
    assert_eq!(jumps("++[>++[-]<-]", JumpMode::Table), expected);
    assert_eq!(jumps("++[>++[-]<-]", JumpMode::Scan), expected);
}

#[test]
fn zero_inner_loop_is_skipped_forward() {
    // 0:'+' 1:'[' 2:'>' 3:'[' 4:'-' 5:']' 6:'<' 7:'-' 8:']'
    assert_eq!(jumps("+[>[-]<-]", JumpMode::Table), vec![(3, 6)]);
    assert_eq!(jumps("+[>[-]<-]", JumpMode::Scan), vec![(3, 6)]);
}

#[test]
fn underflow_is_fatal_by_default() {
    let err = run_to_output("<", b"", &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Runtime(RuntimeError::TapeUnderflow { pc: 0 })));
}

#[test]
fn underflow_wraps_to_last_cell_under_wrap_policy() {
    let program = Program::from("<");
    let config = EngineConfig { pointer_policy: PointerPolicy::Wrap, ..EngineConfig::default() };
    let mut executor = Executor::new(&program, &config).unwrap();
    let mut io = Streams::new(&b""[..], Vec::new());
    executor.run(&mut io).unwrap();
    assert_eq!(executor.pointer(), config.tape_size.get() - 1);
    assert_eq!(executor.tape().len(), config.tape_size.get());
}

#[test]
fn unbalanced_program_never_executes() {
    // The leading '.' would write a byte if execution had started.
    let err = run_to_output(".]", b"", &EngineConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnmatchedClose { line: 1, column: 2, offset: 1 })
    ));

    let err = run_to_output(".[[", b"", &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::UnmatchedOpen { count: 2, .. })));
}

#[test]
fn max_steps_from_config_limits_interpret() {
    let config = EngineConfig { max_steps: Some(100), ..EngineConfig::default() };
    let err = run_to_output("+[]", b"", &config).unwrap_err();
    assert!(matches!(err, Error::Runtime(RuntimeError::StepLimitExceeded { limit: 100 })));
}

#[test]
fn free_run_uses_the_lent_tape() {
    let program = Program::from(">>+");
    let mut tape = Tape::new(TapeSize::new(3).unwrap());
    let mut io = Streams::new(&b""[..], Vec::new());
    run(&program, &mut tape, &mut io).unwrap();
    assert_eq!(tape.cells(), &[0, 0, 1]);

    // The same program overflows a smaller tape instead of indexing past it.
    let mut small = Tape::new(TapeSize::new(2).unwrap());
    let err = run(&program, &mut small, &mut io).unwrap_err();
    assert!(matches!(err, Error::Runtime(RuntimeError::TapeOverflow { pc: 1, pointer: 1 })));
}
