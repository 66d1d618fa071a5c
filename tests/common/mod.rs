//! Shared fixtures for the integration tests: a throwaway harness root and a
//! fake Mila toolchain that never touches a real compiler.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use milagold::config::HarnessConfig;
use milagold::process::{Completed, Invocation, OutputMode, ProcessRunner};
use milagold::Result;
use tempfile::TempDir;

/// A harness root in a temporary directory with a placeholder compiler.
pub struct Corpus {
    pub dir: TempDir,
}

impl Corpus {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        fs::create_dir_all(dir.path().join("program")).unwrap();
        fs::write(dir.path().join("Mila"), "").unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::with_root(self.root());
        config.compiler = vec![PathBuf::from("Mila")];
        config
    }

    pub fn program(&self, name: &str, source: &str) -> &Self {
        fs::write(self.root().join("program").join(format!("{name}.mila")), source).unwrap();
        self
    }

    pub fn fixture(&self, name: &str, text: &str) -> &Self {
        let dir = self.root().join("input");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{name}.txt")), text).unwrap();
        self
    }

    pub fn golden(&self, name: &str) -> String {
        read(&self.root().join("golden").join(format!("{name}.txt")))
    }

    pub fn output(&self, name: &str) -> String {
        read(&self.root().join("output").join(format!("{name}.txt")))
    }

    pub fn has_golden(&self, name: &str) -> bool {
        self.root().join("golden").join(format!("{name}.txt")).is_file()
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

/// Fake compiler and executable.
///
/// Compiling fails with code N when the block has a `fail N` line. The
/// produced "executable" interprets the last compiled block line by line:
/// `print X` writes `X`, `echo` copies stdin, `sum` writes the sum of the
/// whitespace-separated integers on stdin. An `exit N` line stops the
/// executable with status N, keeping what it printed so far.
#[derive(Default)]
pub struct FakeMila {
    compiled: Option<String>,
}

impl ProcessRunner for FakeMila {
    fn run(&mut self, inv: &Invocation) -> Result<Completed> {
        if inv.stdout == OutputMode::Capture {
            return Ok(self.execute(inv.stdin.as_deref()));
        }
        let source_path = inv.args.last().expect("compiler is given a source path");
        let source = fs::read_to_string(source_path).expect("staged source is readable");
        let failure = source
            .lines()
            .find_map(|l| l.strip_prefix("fail "))
            .map(|code| code.trim().parse::<i32>().expect("numeric fail code"));
        match failure {
            Some(code) => {
                self.compiled = None;
                Ok(Completed {
                    code,
                    stdout: Vec::new(),
                })
            }
            None => {
                self.compiled = Some(source);
                Ok(Completed::default())
            }
        }
    }
}

impl FakeMila {
    fn execute(&self, stdin: Option<&[u8]>) -> Completed {
        let source = self
            .compiled
            .as_deref()
            .expect("executable run without a successful compile");
        let input = String::from_utf8_lossy(stdin.unwrap_or_default()).into_owned();
        let mut out = String::new();
        let mut code = 0;
        for line in source.lines() {
            if let Some(status) = line.strip_prefix("exit ") {
                code = status.trim().parse::<i32>().expect("numeric exit code");
                break;
            } else if let Some(value) = line.strip_prefix("print ") {
                out.push_str(value);
                out.push('\n');
            } else if line == "echo" {
                out.push_str(&input);
            } else if line == "sum" {
                let total: i64 = input
                    .split_whitespace()
                    .filter_map(|n| n.parse::<i64>().ok())
                    .sum();
                out.push_str(&format!("{total}\n"));
            }
        }
        Completed {
            code,
            stdout: out.into_bytes(),
        }
    }
}
