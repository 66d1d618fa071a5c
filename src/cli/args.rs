//! Defines the command-line arguments for the milagold CLI.
//!
//! The surface is the classic one of the Mila test directory:
//!
//! ```text
//! milagold                 # regenerate output/ and compare with golden/
//! milagold --mem           # same, compiler run under valgrind memcheck
//! milagold <anything>      # plain test mode; the word itself is ignored
//! milagold --gen <name>    # regenerate golden/<name>.txt only
//! milagold --gen --all     # regenerate the whole golden/ directory
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::orchestrator::{Mode, Target};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "milagold",
    version,
    about = "Golden-file regression harness for the Mila compiler."
)]
pub struct MilagoldArgs {
    /// Regenerate golden data for one program, or for all of them with `--all`.
    #[arg(
        long = "gen",
        value_name = "PROGRAM|--all",
        allow_hyphen_values = true,
        conflicts_with = "mem"
    )]
    pub generate: Option<String>,

    /// Run every compiler invocation under the memory checker.
    #[arg(long)]
    pub mem: bool,

    /// A lone word other than `--mem` still means plain test mode.
    #[arg(value_name = "IGNORED", hide = true, conflicts_with_all = ["generate", "mem"])]
    pub ignored: Option<String>,

    /// Directory holding program/, input/, golden/ and output/.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file; defaults to <root>/milagold.yaml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl MilagoldArgs {
    pub fn mode(&self) -> Mode {
        match &self.generate {
            Some(target) => Mode::Generate(Target::from_arg(target)),
            None => Mode::Test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<MilagoldArgs, clap::Error> {
        MilagoldArgs::try_parse_from(std::iter::once("milagold").chain(args.iter().copied()))
    }

    #[test]
    fn no_arguments_is_test_mode() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.mode(), Mode::Test);
        assert!(!args.mem);
        assert_eq!(args.root, PathBuf::from("."));
    }

    #[test]
    fn mem_flag_keeps_test_mode() {
        let args = parse(&["--mem"]).unwrap();
        assert_eq!(args.mode(), Mode::Test);
        assert!(args.mem);
    }

    #[test]
    fn gen_all_takes_hyphenated_value() {
        let args = parse(&["--gen", "--all"]).unwrap();
        assert_eq!(args.mode(), Mode::Generate(Target::All));
    }

    #[test]
    fn gen_single_program() {
        let args = parse(&["--gen", "fibonacci"]).unwrap();
        assert_eq!(
            args.mode(),
            Mode::Generate(Target::Program("fibonacci".to_string()))
        );
    }

    #[test]
    fn lone_word_is_test_mode_without_memcheck() {
        let args = parse(&["fibonacci"]).unwrap();
        assert_eq!(args.mode(), Mode::Test);
        assert!(!args.mem);
        assert_eq!(args.ignored.as_deref(), Some("fibonacci"));
    }

    #[test]
    fn stray_arguments_are_rejected() {
        assert!(parse(&["a", "b"]).is_err());
        assert!(parse(&["--mem", "a"]).is_err());
        assert!(parse(&["--gen"]).is_err());
        assert!(parse(&["--gen", "a", "b"]).is_err());
        assert!(parse(&["--gen", "a", "--mem"]).is_err());
    }
}
