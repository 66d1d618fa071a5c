//! Harness configuration.
//!
//! Everything the sweep needs to know is carried in a [`HarnessConfig`] that
//! is built once by the CLI and passed down explicitly. Defaults mirror the
//! classic layout of a Mila test directory; any field can be overridden from
//! an optional `milagold.yaml` in the harness root.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::errors::{HarnessError, Result};

/// Name of the configuration file looked up in the harness root.
pub const CONFIG_FILE_NAME: &str = "milagold.yaml";

// ============================================================================
// SENTINELS
// ============================================================================

/// The three reserved delimiter lines, stored without their trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sentinels {
    pub input: String,
    pub subinput: String,
    pub output: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            input: "---input---".to_string(),
            subinput: "---subinput---".to_string(),
            output: "---output---".to_string(),
        }
    }
}

impl Sentinels {
    /// The top-level separator as it appears on disk, newline included.
    pub fn input_line(&self) -> Vec<u8> {
        as_line(&self.input)
    }

    pub fn subinput_line(&self) -> Vec<u8> {
        as_line(&self.subinput)
    }

    pub fn output_line(&self) -> Vec<u8> {
        as_line(&self.output)
    }
}

fn as_line(token: &str) -> Vec<u8> {
    let mut line = Vec::with_capacity(token.len() + 1);
    line.extend_from_slice(token.as_bytes());
    line.push(b'\n');
    line
}

// ============================================================================
// FIXTURE POLICY
// ============================================================================

/// What to do when a program and its fixture file disagree on section count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixturePolicy {
    /// Refuse to run the program and report the misalignment.
    #[default]
    Strict,
    /// Pad missing sections with empty stdin and ignore extra ones.
    Lenient,
}

// ============================================================================
// HARNESS CONFIG
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory every other path is resolved against; also the working
    /// directory of the compiler and the produced executable.
    #[serde(skip)]
    pub root: PathBuf,
    pub program_dir: PathBuf,
    pub program_extension: String,
    pub input_dir: PathBuf,
    pub golden_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Candidate compiler locations, probed in order.
    pub compiler: Vec<PathBuf>,
    /// Executable the compiler leaves in the working directory.
    pub artifact: PathBuf,
    pub sentinels: Sentinels,
    pub memcheck: bool,
    /// Wrapper command line used when `memcheck` is on.
    pub memcheck_command: Vec<String>,
    pub fixture_policy: FixturePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            program_dir: PathBuf::from("program"),
            program_extension: "mila".to_string(),
            input_dir: PathBuf::from("input"),
            golden_dir: PathBuf::from("golden"),
            output_dir: PathBuf::from("output"),
            compiler: vec![
                PathBuf::from("../llvm-obj/Debug+Asserts/examples/Mila"),
                PathBuf::from("../llvm-obj/Release+Asserts/examples/Mila"),
            ],
            artifact: PathBuf::from("a.out"),
            sentinels: Sentinels::default(),
            memcheck: false,
            memcheck_command: vec![
                "valgrind".to_string(),
                "--tool=memcheck".to_string(),
                "--leak-check=yes".to_string(),
            ],
            fixture_policy: FixturePolicy::Strict,
        }
    }
}

impl HarnessConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Loads `path` if given, otherwise `<root>/milagold.yaml` if it exists,
    /// otherwise the defaults.
    pub fn load(root: impl Into<PathBuf>, path: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = root.join(CONFIG_FILE_NAME);
                default.is_file().then_some(default)
            }
        };

        let Some(file) = candidate else {
            return Ok(Self::with_root(root));
        };

        let text = fs::read_to_string(&file).map_err(|e| HarnessError::io(&file, e))?;
        let mut config = Self::from_yaml(&text).map_err(|source| HarnessError::Config {
            path: file.clone(),
            source,
        })?;
        config.root = root;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that only make sense together.
    pub fn validate(&self) -> Result<()> {
        if self.memcheck && self.memcheck_command.is_empty() {
            return Err(HarnessError::MemcheckUnavailable);
        }
        Ok(())
    }

    /// Parses a YAML document; missing keys keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    // =====================
    // Resolved paths
    // =====================

    pub fn program_dir(&self) -> PathBuf {
        self.root.join(&self.program_dir)
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(&self.input_dir)
    }

    pub fn golden_dir(&self) -> PathBuf {
        self.root.join(&self.golden_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.root.join(&self.artifact)
    }

    /// Source file for the program called `name`.
    pub fn program_path(&self, name: &str) -> PathBuf {
        self.program_dir()
            .join(format!("{}.{}", name, self.program_extension))
    }

    /// Fixture file for the program called `name` (may not exist).
    pub fn fixture_path(&self, name: &str) -> PathBuf {
        self.input_dir().join(format!("{name}.txt"))
    }

    /// Compiler candidates resolved against the root, in probe order.
    pub fn compiler_candidates(&self) -> Vec<PathBuf> {
        self.compiler.iter().map(|c| self.root.join(c)).collect()
    }
}
