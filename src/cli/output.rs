//! Handles all user-facing output for the CLI.
//!
//! Progress lines, mismatch reports with their diffs, and the final summary
//! are all written from here so every mode reads the same way.

// ============================================================================
// OUTPUT SINKS: OutputBuffer and StdoutSink implementations
// ============================================================================

use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::compare::{Comparison, Outcome};
use crate::orchestrator::{Mode, OutputSink, Report, SweepReport};

/// OutputBuffer: collects progress lines into a String for tests.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

/// StdoutSink: writes progress lines to stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{}", text);
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Colors only when stdout is a terminal.
pub fn color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Emits the banner that opens a run.
pub fn announce(sink: &mut dyn OutputSink, mode: &Mode, memcheck: bool) {
    match mode {
        Mode::Generate(_) => sink.emit("generating golden data"),
        Mode::Test => {
            if memcheck {
                sink.emit("memcheck enabled");
            }
            sink.emit("testing");
        }
    }
}

/// Prints the mismatch details and summary of a finished run to stdout.
pub fn print_report(report: &Report, root: &Path) {
    let mut stdout = StandardStream::stdout(color_choice());
    let _ = write_report(&mut stdout, report, root);
}

/// Writes the mismatch details and summary of a finished run.
pub fn write_report<W: WriteColor>(out: &mut W, report: &Report, root: &Path) -> io::Result<()> {
    match report {
        Report::Generated(sweep) => write_sweep_summary(out, sweep),
        Report::Tested { sweep, comparison } => {
            for c in comparison.mismatched() {
                write_mismatch(out, c, root)?;
            }
            write_sweep_summary(out, sweep)?;

            let total = comparison.comparisons.len();
            let matched = comparison.matched();
            let color = if matched == total { Color::Green } else { Color::Red };
            out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
            write!(out, "{}/{} records match golden data", matched, total)?;
            out.reset()?;
            writeln!(out)?;
            for orphan in &comparison.orphaned_goldens {
                writeln!(out, "no output for {}", relative(root, orphan).display())?;
            }
            Ok(())
        }
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_mismatch<W: WriteColor>(out: &mut W, c: &Comparison, root: &Path) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    write!(out, "difference in {} found", relative(root, &c.output).display())?;
    out.reset()?;
    writeln!(out)?;

    match &c.outcome {
        Outcome::Match => {}
        Outcome::GoldenMissing => {
            writeln!(out, "missing golden record {}", relative(root, &c.golden).display())?;
        }
        Outcome::Differs { diff, first_case } => {
            writeln!(out, "first differing case: {}", first_case)?;
            print_diff(out, diff)?;
        }
    }
    Ok(())
}

fn print_diff<W: WriteColor>(out: &mut W, diff: &str) -> io::Result<()> {
    for line in diff.lines() {
        let color = if line.starts_with('<') {
            Some(Color::Red)
        } else if line.starts_with('>') {
            Some(Color::Green)
        } else {
            None
        };
        out.set_color(ColorSpec::new().set_fg(color))?;
        write!(out, "{}", line)?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_sweep_summary<W: WriteColor>(out: &mut W, sweep: &SweepReport) -> io::Result<()> {
    writeln!(
        out,
        "{} program(s), {} case(s) recorded",
        sweep.written.len(),
        sweep.cases()
    )?;
    if !sweep.skipped.is_empty() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(out, "{} program(s) skipped:", sweep.skipped.len())?;
        out.reset()?;
        writeln!(out)?;
        for skipped in &sweep.skipped {
            writeln!(out, "  - {}: {}", skipped.program, skipped.error)?;
        }
    }
    Ok(())
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonReport;
    use crate::errors::HarnessError;
    use crate::orchestrator::{SkippedProgram, Target, WrittenRecord};
    use std::path::PathBuf;
    use termcolor::Buffer;

    fn render(report: &Report) -> String {
        let mut buf = Buffer::no_color();
        write_report(&mut buf, report, Path::new("/t")).unwrap();
        String::from_utf8(buf.into_inner()).unwrap()
    }

    #[test]
    fn buffer_sink_collects_lines() {
        let mut sink = OutputBuffer::new();
        sink.emit("processing program/a.mila");
        sink.emit("processing program/b.mila");
        assert_eq!(
            sink.as_str(),
            "processing program/a.mila\nprocessing program/b.mila\n"
        );
    }

    #[test]
    fn banner_names_the_mode() {
        let mut sink = OutputBuffer::new();
        announce(&mut sink, &Mode::Test, true);
        assert_eq!(sink.as_str(), "memcheck enabled\ntesting\n");

        let mut sink = OutputBuffer::new();
        announce(&mut sink, &Mode::Generate(Target::All), false);
        assert_eq!(sink.as_str(), "generating golden data\n");
    }

    #[test]
    fn mismatch_report_names_file_and_diff() {
        let report = Report::Tested {
            sweep: SweepReport {
                written: vec![WrittenRecord {
                    program: "a".to_string(),
                    path: PathBuf::from("/t/output/a.txt"),
                    cases: 2,
                }],
                skipped: vec![],
            },
            comparison: ComparisonReport {
                comparisons: vec![Comparison {
                    output: PathBuf::from("/t/output/a.txt"),
                    golden: PathBuf::from("/t/golden/a.txt"),
                    outcome: Outcome::Differs {
                        diff: "< 1\n> 2\n".to_string(),
                        first_case: 0,
                    },
                }],
                orphaned_goldens: vec![],
            },
        };
        let text = render(&report);
        assert!(text.contains("difference in output/a.txt found\n"));
        assert!(text.contains("< 1\n> 2\n"));
        assert!(text.contains("1 program(s), 2 case(s) recorded"));
        assert!(text.contains("0/1 records match golden data"));
    }

    #[test]
    fn skipped_programs_are_listed() {
        let report = Report::Generated(SweepReport {
            written: vec![],
            skipped: vec![SkippedProgram {
                program: "b".to_string(),
                error: HarnessError::CompilerNotFound { probed: vec![] },
            }],
        });
        let text = render(&report);
        assert!(text.contains("1 program(s) skipped:"));
        assert!(text.contains("  - b: mila compiler not found"));
    }
}
