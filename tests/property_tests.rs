//! Property-based tests for the prompt layer and the properties mapping
//!
//! These tests verify:
//! - A prompt with an answer set and a default never returns anything else,
//!   and running out of input is an error rather than an answer
//! - Without a default, answers come back verbatim
//! - `--export` always forces the apply-frameworks step

use archipel_bootstrap::prompt::is_input_closed;
use archipel_bootstrap::{Cli, InstallProperties, Library, Prompter};
use clap::Parser;
use proptest::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;

const ANSWERS: &[&str] = &["y", "n"];

fn ask(input: String, answers: Option<&[&str]>, default: Option<&str>) -> String {
    let mut prompter = Prompter::new(Cursor::new(input.into_bytes()), Vec::new());
    prompter.ask("Question?", answers, default).unwrap()
}

/// Any single line an operator might type (no newlines)
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("y".to_string()),
        Just("n".to_string()),
        Just("Y".to_string()),
        Just("yes".to_string()),
        "[a-zA-Z0-9 ./_-]{0,12}",
    ]
}

proptest! {
    /// Arbitrary answer sequences never escape the declared set
    #[test]
    fn answer_stays_in_set(
        lines in prop::collection::vec(line_strategy(), 0..8),
        default in prop_oneof![Just("y"), Just("n")],
    ) {
        let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let mut prompter = Prompter::new(Cursor::new(input.into_bytes()), Vec::new());
        match prompter.ask("Question?", Some(ANSWERS), Some(default)) {
            Ok(answer) => prop_assert!(ANSWERS.contains(&answer.as_str()), "got {:?}", answer),
            // Ran out of lines before an acceptable one
            Err(err) => prop_assert!(is_input_closed(&err)),
        }
    }

    /// The first in-set answer wins, whatever came before it
    #[test]
    fn first_valid_answer_wins(
        junk in prop::collection::vec("[a-mo-xzA-Z]{1,6}", 0..5),
        valid in prop_oneof![Just("y"), Just("n")],
    ) {
        let mut input: String = junk.iter().map(|l| format!("{}\n", l)).collect();
        input.push_str(valid);
        input.push('\n');
        prop_assert_eq!(ask(input, Some(ANSWERS), Some("y")), valid);
    }

    /// Without a default the typed line is returned unchanged
    #[test]
    fn no_default_is_verbatim(line in "[a-zA-Z0-9 ./_-]{0,16}") {
        let answer = ask(format!("{}\n", line), Some(ANSWERS), None);
        prop_assert_eq!(answer, line);
    }

    /// Export forces apply-frameworks no matter which other flags are set
    #[test]
    fn export_forces_apply_frameworks(
        flags in prop::collection::vec(prop::bool::ANY, 7),
        dest in "/[a-z]{1,8}(/[a-z]{1,8}){0,2}",
    ) {
        let names = [
            "--cappuccino",
            "--growlcappuccino",
            "--vnccappuccino",
            "--strophecappuccino",
            "--lpkit",
            "--tnkit",
            "--archipel",
        ];
        let mut args = vec!["archipel-bootstrap".to_string(), "--notinteractive".to_string()];
        args.extend(names.iter().zip(&flags).filter(|(_, on)| **on).map(|(n, _)| n.to_string()));
        args.push(format!("--export={}", dest));

        let props = InstallProperties::from_cli(&Cli::try_parse_from(&args).unwrap());

        prop_assert!(props.apply_frameworks);
        prop_assert_eq!(&props.export, &Some(PathBuf::from(&dest)));
        prop_assert_eq!(props.cappuccino, flags[0]);
        for (i, lib) in Library::all().enumerate() {
            prop_assert_eq!(props.library_enabled(lib), flags[i + 1]);
        }
        prop_assert_eq!(props.archipel, flags[6]);
    }
}
