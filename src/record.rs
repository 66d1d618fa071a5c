//! Result records.
//!
//! A record holds every case of one program in enumeration order. Each case
//! contributes the executable's stdout followed by the compiler exit code on
//! its own line; cases after the first are preceded by the output sentinel:
//!
//! ```text
//! 5
//! 0
//! ---output---
//! 1
//! ```

use std::{fs, path::Path};

use crate::errors::{HarnessError, Result};

/// Captured outcome of one case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Executable stdout; always empty when compilation failed.
    pub stdout: Vec<u8>,
    /// Exit code of the compiler, not of the executable.
    pub compile_code: i32,
}

impl RunResult {
    pub fn compiled(&self) -> bool {
        self.compile_code == 0
    }
}

#[derive(Debug, Clone)]
pub struct ResultRecord {
    separator: Vec<u8>,
    bytes: Vec<u8>,
    cases: usize,
}

impl ResultRecord {
    /// An empty record; `separator` is the output sentinel line with its `\n`.
    pub fn new(separator: Vec<u8>) -> Self {
        Self {
            separator,
            bytes: Vec::new(),
            cases: 0,
        }
    }

    /// Appends one case.
    pub fn push(&mut self, result: &RunResult) {
        if self.cases > 0 {
            self.bytes.extend_from_slice(&self.separator);
        }
        self.bytes.extend_from_slice(&result.stdout);
        self.bytes
            .extend_from_slice(format!("{}\n", result.compile_code).as_bytes());
        self.cases += 1;
    }

    pub fn case_count(&self) -> usize {
        self.cases
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes the whole record to `path`, replacing any previous file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.bytes).map_err(|e| HarnessError::io(path, e))
    }
}

/// Splits record bytes back into case segments at separator lines.
///
/// Used to locate the first differing case when a comparison fails. Executable
/// output that happens to contain the separator line splits there too; the
/// sentinel is reserved and such output is already unsupported.
pub fn segments<'a>(bytes: &'a [u8], separator: &[u8]) -> Vec<&'a [u8]> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        let line_end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| pos + i + 1);
        if &bytes[pos..line_end] == separator {
            out.push(&bytes[start..pos]);
            start = line_end;
        }
        pos = line_end;
    }
    out.push(&bytes[start..]);
    out
}
