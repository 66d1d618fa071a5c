//! Subprocess invocation.
//!
//! The harness only ever needs to: run a command with arguments in a working
//! directory, optionally feed it stdin, optionally capture its stdout, and
//! learn its exit code. [`ProcessRunner`] is that narrow surface; the CLI uses
//! [`SystemRunner`] and tests plug in fakes so no real toolchain is needed.

use std::{
    ffi::OsString,
    io::{self, Write},
    path::PathBuf,
    process::{Command, ExitStatus, Stdio},
    thread,
};

use tracing::debug;

use crate::errors::{HarnessError, Result};

/// What happens to a child's stdout or stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect into [`Completed::stdout`].
    Capture,
    /// Send to the null device.
    Discard,
    /// Share the harness's own stream.
    Inherit,
}

/// A fully described subprocess call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    /// Bytes piped to stdin; `None` connects stdin to the null device.
    pub stdin: Option<Vec<u8>>,
    pub stdout: OutputMode,
    pub stderr: OutputMode,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            stdin: None,
            stdout: OutputMode::Discard,
            stderr: OutputMode::Discard,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, stdin: Option<Vec<u8>>) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn stdout(mut self, mode: OutputMode) -> Self {
        self.stdout = mode;
        self
    }

    pub fn stderr(mut self, mode: OutputMode) -> Self {
        self.stderr = mode;
        self
    }

    /// Human-readable command line, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| s.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completed {
    pub code: i32,
    /// Empty unless stdout was [`OutputMode::Capture`].
    pub stdout: Vec<u8>,
}

impl Completed {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

pub trait ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<Completed>;
}

impl<F> ProcessRunner for F
where
    F: FnMut(&Invocation) -> Result<Completed>,
{
    fn run(&mut self, invocation: &Invocation) -> Result<Completed> {
        self(invocation)
    }
}

// ============================================================================
// SYSTEM RUNNER
// ============================================================================

/// Runs invocations as real child processes and blocks until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<Completed> {
        let command_line = invocation.display();
        debug!(command = %command_line, cwd = %invocation.cwd.display(), "spawning");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(stdio_for(invocation.stdout))
            .stderr(stdio_for(invocation.stderr))
            .spawn()
            .map_err(|e| HarnessError::spawn(&command_line, e))?;

        // Stdin is fed from its own thread while stdout is drained here.
        let writer = match (&invocation.stdin, child.stdin.take()) {
            (Some(bytes), Some(mut pipe)) => {
                let bytes = bytes.clone();
                Some(thread::spawn(move || pipe.write_all(&bytes)))
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .map_err(|e| HarnessError::spawn(&command_line, e))?;

        if let Some(writer) = writer {
            let written = writer.join().unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))
            });
            // A child that exits without reading its input closes the pipe
            // early; that is the child's business, not a harness failure.
            if let Err(e) = written {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(HarnessError::spawn(&command_line, e));
                }
            }
        }
        let code = exit_code(output.status);
        debug!(command = %command_line, code, "exited");

        Ok(Completed {
            code,
            stdout: output.stdout,
        })
    }
}

fn stdio_for(mode: OutputMode) -> Stdio {
    match mode {
        OutputMode::Capture => Stdio::piped(),
        OutputMode::Discard => Stdio::null(),
        OutputMode::Inherit => Stdio::inherit(),
    }
}

/// Exit code of a finished child; signal deaths map to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
