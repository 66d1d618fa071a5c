//! Compiling and running a single case.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::cases::Case;
use crate::config::HarnessConfig;
use crate::errors::{HarnessError, Result};
use crate::process::{Invocation, OutputMode, ProcessRunner};
use crate::record::RunResult;

/// Returns the first candidate that exists on disk.
pub fn locate_compiler(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|c| c.exists())
        .cloned()
        .ok_or_else(|| HarnessError::CompilerNotFound {
            probed: candidates.to_vec(),
        })
}

pub struct CaseRunner<'a, P: ProcessRunner> {
    config: &'a HarnessConfig,
    processes: &'a mut P,
    compiler: PathBuf,
}

impl<'a, P: ProcessRunner> CaseRunner<'a, P> {
    /// Locates the compiler; fails with [`HarnessError::CompilerNotFound`]
    /// when none of the configured candidates exist.
    pub fn new(config: &'a HarnessConfig, processes: &'a mut P) -> Result<Self> {
        config.validate()?;
        let compiler = locate_compiler(&config.compiler_candidates())?;
        debug!(compiler = %compiler.display(), "using compiler");
        Ok(Self {
            config,
            processes,
            compiler,
        })
    }

    /// Compiles the case's block and, if that succeeds, runs the artifact.
    pub fn run(&mut self, case: &Case<'_>) -> Result<RunResult> {
        let staged = stage_source(case.source(), &self.config.program_extension)?;

        let compile = self.compile_invocation(staged.path());
        let compiled = self.processes.run(&compile)?;
        let compile_code = compiled.code;
        debug!(case = %case.label(), compile_code, "compiled");
        if !compiled.success() {
            return Ok(RunResult {
                stdout: Vec::new(),
                compile_code,
            });
        }

        let execute = Invocation::new(self.config.artifact_path(), &self.config.root)
            .stdin(case.stdin_bytes().map(<[u8]>::to_vec))
            .stdout(OutputMode::Capture)
            .stderr(OutputMode::Inherit);
        let completed = self.processes.run(&execute)?;
        debug!(case = %case.label(), exit = completed.code, bytes = completed.stdout.len(), "executed");

        Ok(RunResult {
            stdout: completed.stdout,
            compile_code,
        })
    }

    fn compile_invocation(&self, source: &Path) -> Invocation {
        let root = &self.config.root;
        match self.config.memcheck_command.split_first() {
            Some((wrapper, wrapper_args)) if self.config.memcheck => Invocation::new(wrapper, root)
                .args(wrapper_args)
                .arg(&self.compiler)
                .arg(source)
                .stdout(OutputMode::Inherit)
                .stderr(OutputMode::Inherit),
            _ => Invocation::new(&self.compiler, root).arg(source),
        }
    }
}

/// Writes one block to a fresh temporary compile unit.
fn stage_source(text: &[u8], extension: &str) -> Result<tempfile::NamedTempFile> {
    let suffix = format!(".{extension}");
    let mut file = tempfile::Builder::new()
        .prefix("milagold-case-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| HarnessError::io(std::env::temp_dir(), e))?;
    file.write_all(text)
        .and_then(|()| file.flush())
        .map_err(|e| HarnessError::io(file.path(), e))?;
    Ok(file)
}
