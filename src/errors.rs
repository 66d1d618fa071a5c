//! Milagold Error Handling
//!
//! Every failure the harness can report is a [`HarnessError`]. Per-program
//! errors are caught by the orchestrator, reported, and the sweep continues;
//! only setup failures escape to the CLI, where miette renders them.

use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// None of the configured compiler locations exist.
    #[error("mila compiler not found (probed: {})", display_paths(.probed))]
    #[diagnostic(
        code(milagold::compiler_not_found),
        help("build the compiler first, or list its location under `compiler` in milagold.yaml")
    )]
    CompilerNotFound { probed: Vec<PathBuf> },

    /// Program blocks and fixture sections do not pair up one to one.
    #[error(
        "fixture for `{program}` is misaligned: {blocks} program block(s) but {sections} fixture section(s)"
    )]
    #[diagnostic(
        code(milagold::fixture_misaligned),
        help("every `---input---` in the program needs a matching `---input---` in its fixture file")
    )]
    FixtureMisaligned {
        program: String,
        blocks: usize,
        sections: usize,
    },

    /// A program named on the command line has no source file.
    #[error("test program `{name}` not found at {}", .path.display())]
    #[diagnostic(code(milagold::program_not_found))]
    ProgramNotFound { name: String, path: PathBuf },

    /// A subprocess could not be started or waited on.
    #[error("failed to run `{command}`")]
    #[diagnostic(code(milagold::spawn))]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Reading or writing a harness file failed.
    #[error("i/o error on {}", .path.display())]
    #[diagnostic(code(milagold::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking a harness directory failed.
    #[error("failed to scan {}", .path.display())]
    #[diagnostic(code(milagold::discovery))]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Memcheck was requested but there is no wrapper command to run it with.
    #[error("memcheck is enabled but `memcheck_command` is empty")]
    #[diagnostic(
        code(milagold::memcheck_unavailable),
        help("set `memcheck_command` in milagold.yaml, e.g. [valgrind, --tool=memcheck]")
    )]
    MemcheckUnavailable,

    /// The configuration file exists but could not be parsed.
    #[error("invalid configuration in {}", .path.display())]
    #[diagnostic(code(milagold::config), help("see the `HarnessConfig` fields for accepted keys"))]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl HarnessError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a spawn failure with the command line that was attempted.
    pub fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        HarnessError::Spawn {
            command: command.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
