//! Golden comparison.
//!
//! Every record in the output directory is compared byte for byte with the
//! golden record of the same name. Nothing is ever written here; a mismatch
//! is reported and the next file is compared.

use std::{
    collections::BTreeSet,
    fs,
    io,
    path::{Path, PathBuf},
};

use difference::{Changeset, Difference};
use tracing::{debug, warn};

use crate::discovery;
use crate::errors::{HarnessError, Result};
use crate::record;

/// Result of comparing one output record with its golden record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Match,
    Differs {
        /// Changed lines: `< ` from golden, `> ` from output.
        diff: String,
        /// Index of the first case segment that differs.
        first_case: usize,
    },
    GoldenMissing,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub output: PathBuf,
    pub golden: PathBuf,
    pub outcome: Outcome,
}

impl Comparison {
    pub fn matched(&self) -> bool {
        self.outcome == Outcome::Match
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonReport {
    pub comparisons: Vec<Comparison>,
    /// Golden records that no output record corresponds to.
    pub orphaned_goldens: Vec<PathBuf>,
}

impl ComparisonReport {
    pub fn matched(&self) -> usize {
        self.comparisons.iter().filter(|c| c.matched()).count()
    }

    pub fn mismatched(&self) -> impl Iterator<Item = &Comparison> {
        self.comparisons.iter().filter(|c| !c.matched())
    }

    pub fn all_matched(&self) -> bool {
        self.mismatched().next().is_none()
    }
}

pub struct GoldenComparator<'a> {
    pub golden_dir: &'a Path,
    pub output_dir: &'a Path,
    /// Output sentinel line, used to locate the first differing case.
    pub separator: &'a [u8],
}

impl GoldenComparator<'_> {
    /// Compares every `*.txt` record in the output directory.
    pub fn compare_all(&self) -> Result<ComparisonReport> {
        let outputs = discovery::files_with_extension(self.output_dir, "txt")?;
        let mut report = ComparisonReport::default();
        let mut seen = BTreeSet::new();

        for output in outputs {
            let Some(file_name) = output.file_name() else {
                continue;
            };
            seen.insert(file_name.to_os_string());
            let golden = self.golden_dir.join(file_name);
            let outcome = self.compare_files(&golden, &output)?;
            debug!(output = %output.display(), ?outcome, "compared");
            report.comparisons.push(Comparison {
                output,
                golden,
                outcome,
            });
        }

        if self.golden_dir.is_dir() {
            for golden in discovery::files_with_extension(self.golden_dir, "txt")? {
                if golden.file_name().is_some_and(|n| !seen.contains(n)) {
                    warn!(golden = %golden.display(), "golden record has no matching output");
                    report.orphaned_goldens.push(golden);
                }
            }
        }

        Ok(report)
    }

    pub fn compare_files(&self, golden: &Path, output: &Path) -> Result<Outcome> {
        let expected = match fs::read(golden) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::GoldenMissing),
            Err(e) => return Err(HarnessError::io(golden, e)),
        };
        let actual = fs::read(output).map_err(|e| HarnessError::io(output, e))?;
        Ok(compare_bytes(&expected, &actual, self.separator))
    }
}

/// Byte comparison of a golden record against an output record.
pub fn compare_bytes(expected: &[u8], actual: &[u8], separator: &[u8]) -> Outcome {
    if expected == actual {
        return Outcome::Match;
    }
    let expected_cases = record::segments(expected, separator);
    let actual_cases = record::segments(actual, separator);
    let first_case = expected_cases
        .iter()
        .zip(&actual_cases)
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected_cases.len().min(actual_cases.len()));

    Outcome::Differs {
        diff: line_diff(
            &String::from_utf8_lossy(expected),
            &String::from_utf8_lossy(actual),
        ),
        first_case,
    }
}

/// Renders only the changed lines, `<` for golden and `>` for output.
pub fn line_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut out = String::new();
    for diff in &changeset.diffs {
        let (marker, text) = match diff {
            Difference::Same(_) => continue,
            Difference::Rem(text) => ('<', text),
            Difference::Add(text) => ('>', text),
        };
        for line in text.split('\n') {
            out.push(marker);
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
