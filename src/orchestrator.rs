//! Sweep orchestration.
//!
//! Generation mode rebuilds golden records, either all of them or the one of
//! a single named program. Test mode rebuilds the whole output directory and
//! compares it against the golden directory. Programs are processed one at a
//! time in file-name order and their cases strictly in enumeration order.
//!
//! A problem with one program (no compiler, unreadable file, misaligned
//! fixture) is reported through the [`OutputSink`] and recorded in the
//! [`SweepReport`]; the sweep always moves on to the next program.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::blocks::{FixtureFile, TestProgram};
use crate::cases::CaseEnumerator;
use crate::compare::{ComparisonReport, GoldenComparator};
use crate::config::HarnessConfig;
use crate::discovery;
use crate::errors::{HarnessError, Result};
use crate::process::ProcessRunner;
use crate::record::ResultRecord;
use crate::runner::CaseRunner;

/// Receives operator-facing progress lines.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// Drops every line.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) {}
}

// ============================================================================
// MODES AND REPORTS
// ============================================================================

/// Which programs a generation pass covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Program(String),
}

impl Target {
    /// `--all` selects every program; anything else names one.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "--all" {
            Target::All
        } else {
            Target::Program(arg.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Regenerate golden records.
    Generate(Target),
    /// Regenerate all output records and compare them with the golden ones.
    Test,
}

/// A record written during a sweep.
#[derive(Debug, Clone)]
pub struct WrittenRecord {
    pub program: String,
    pub path: PathBuf,
    pub cases: usize,
}

/// A program the sweep had to leave out.
#[derive(Debug)]
pub struct SkippedProgram {
    pub program: String,
    pub error: HarnessError,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub written: Vec<WrittenRecord>,
    pub skipped: Vec<SkippedProgram>,
}

impl SweepReport {
    pub fn cases(&self) -> usize {
        self.written.iter().map(|r| r.cases).sum()
    }
}

#[derive(Debug)]
pub enum Report {
    Generated(SweepReport),
    Tested {
        sweep: SweepReport,
        comparison: ComparisonReport,
    },
}

impl Report {
    pub fn sweep(&self) -> &SweepReport {
        match self {
            Report::Generated(sweep) | Report::Tested { sweep, .. } => sweep,
        }
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

pub struct Orchestrator<'a, P: ProcessRunner> {
    config: &'a HarnessConfig,
    processes: P,
    sink: &'a mut dyn OutputSink,
}

impl<'a, P: ProcessRunner> Orchestrator<'a, P> {
    pub fn new(config: &'a HarnessConfig, processes: P, sink: &'a mut dyn OutputSink) -> Self {
        Self {
            config,
            processes,
            sink,
        }
    }

    pub fn run(&mut self, mode: &Mode) -> Result<Report> {
        match mode {
            Mode::Generate(target) => {
                let golden_dir = self.config.golden_dir();
                self.generate(&golden_dir, target).map(Report::Generated)
            }
            Mode::Test => {
                let output_dir = self.config.output_dir();
                let sweep = self.generate(&output_dir, &Target::All)?;
                let golden_dir = self.config.golden_dir();
                let separator = self.config.sentinels.output_line();
                let comparison = GoldenComparator {
                    golden_dir: &golden_dir,
                    output_dir: &output_dir,
                    separator: &separator,
                }
                .compare_all()?;
                info!(
                    compared = comparison.comparisons.len(),
                    matched = comparison.matched(),
                    "comparison finished"
                );
                Ok(Report::Tested { sweep, comparison })
            }
        }
    }

    /// Writes one record per targeted program into `dir`.
    pub fn generate(&mut self, dir: &Path, target: &Target) -> Result<SweepReport> {
        let programs = match target {
            Target::All => {
                reset_dir(dir)?;
                discovery::files_with_extension(
                    &self.config.program_dir(),
                    &self.config.program_extension,
                )?
            }
            Target::Program(name) => {
                let path = self.config.program_path(name);
                if !path.is_file() {
                    return Err(HarnessError::ProgramNotFound {
                        name: name.clone(),
                        path,
                    });
                }
                fs::create_dir_all(dir).map_err(|e| HarnessError::io(dir, e))?;
                let stale = record_path(dir, name);
                if stale.is_file() {
                    fs::remove_file(&stale).map_err(|e| HarnessError::io(&stale, e))?;
                }
                vec![path]
            }
        };

        let mut report = SweepReport::default();
        for path in programs {
            let name = discovery::program_name(&path);
            let line = format!("processing {}", self.display_program(&path).display());
            self.sink.emit(&line);
            match self.process_program(dir, &name, &path) {
                Ok(written) => report.written.push(written),
                Err(error) => {
                    warn!(program = %name, %error, "program skipped");
                    self.sink.emit(&format!("skipped {name}: {error}"));
                    report.skipped.push(SkippedProgram {
                        program: name,
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    fn process_program(&mut self, dir: &Path, name: &str, path: &Path) -> Result<WrittenRecord> {
        let sentinels = &self.config.sentinels;
        let program = TestProgram::from_path(name, path, sentinels)?;
        let fixture_path = self.config.fixture_path(name);
        let fixture = if fixture_path.is_file() {
            Some(FixtureFile::from_path(&fixture_path, sentinels)?)
        } else {
            None
        };

        let cases = CaseEnumerator::new(&program, fixture.as_ref(), self.config.fixture_policy)?;
        debug!(
            program = %name,
            blocks = program.blocks.len(),
            cases = cases.case_count(),
            fixture = fixture.is_some(),
            "enumerated"
        );

        let mut runner = CaseRunner::new(self.config, &mut self.processes)?;
        let mut record = ResultRecord::new(sentinels.output_line());
        for case in cases {
            let result = runner.run(&case)?;
            record.push(&result);
        }

        let out = record_path(dir, name);
        record.write_to(&out)?;
        Ok(WrittenRecord {
            program: name.to_string(),
            path: out,
            cases: record.case_count(),
        })
    }

    /// The program path as the operator knows it, relative to the root.
    fn display_program(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.config.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Where the record of `name` lives inside `dir`.
pub fn record_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.txt"))
}

fn reset_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        fs::remove_dir_all(dir).map_err(|e| HarnessError::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| HarnessError::io(dir, e))
}
