//! Library integration tests.

use trailfund::TrailfundError;

#[test]
fn error_types_are_public() {
    let err = TrailfundError::StepNotExecutable {
        step: 2,
        status: "pending".into(),
    };
    assert!(err.to_string().contains("pending"));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> trailfund::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use trailfund::cli::{Cli, Commands};

    let cli = Cli::parse_from(["trailfund", "donate", "12.5", "--yes"]);

    if let Some(Commands::Donate(args)) = cli.command {
        assert_eq!(args.amount, "12.5");
        assert!(args.yes);
    } else {
        panic!("Expected Donate command");
    }
}

#[test]
fn step_names_round_trip_through_numbers() {
    use trailfund::pipeline::Step;

    for step in Step::ALL {
        assert_eq!(Step::from_number(step.number()), Some(step));
    }
    assert_eq!(Step::from_number(0), None);
    assert_eq!(Step::from_number(4), None);
}
