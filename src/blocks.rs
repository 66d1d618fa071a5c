//! Sentinel-delimited block scanning.
//!
//! Test programs and fixture files are plain text split into blocks by
//! reserved lines. A line is a sentinel only if it matches the token exactly,
//! trailing `\n` included; everything else is kept byte for byte, since the
//! extracted text ends up in records that are compared byte for byte.
//!
//! Program file (`program/<name>.mila`):
//!
//! ```text
//! <block 0>
//! ---input---
//! <block 1>
//! ```
//!
//! Fixture file (`input/<name>.txt`), one section per program block:
//!
//! ```text
//! <stdin 0.0>
//! ---subinput---
//! <stdin 0.1>
//! ---input---
//! <stdin 1.0>
//! ```

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::config::Sentinels;
use crate::errors::{HarnessError, Result};

// ============================================================================
// LINE SCANNING
// ============================================================================

/// Reads lines into a block until one of `stops` or end of stream.
///
/// Returns the block and the index of the stop line that ended it, or `None`
/// when the stream ran out. The stop line itself is consumed and dropped.
fn scan_until<R: BufRead>(reader: &mut R, stops: &[&[u8]]) -> io::Result<(Vec<u8>, Option<usize>)> {
    let mut block = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok((block, None));
        }
        if let Some(stop) = stops.iter().position(|s| *s == line.as_slice()) {
            return Ok((block, Some(stop)));
        }
        block.extend_from_slice(&line);
    }
}

// ============================================================================
// PROGRAM BLOCKS
// ============================================================================

/// How a scanned block was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEnd {
    /// A sentinel line; more blocks follow.
    Sentinel,
    /// End of stream; this was the last block.
    Eof,
}

/// One program variant to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBlock {
    pub text: Vec<u8>,
    pub end: BlockEnd,
}

/// Lazy iterator over the input blocks of a program stream.
///
/// A stream with K sentinel lines yields exactly K + 1 blocks; the block after
/// the last sentinel is produced even when empty. After the final block, or
/// after an I/O error, the iterator is exhausted.
pub struct BlockParser<R> {
    reader: R,
    sentinel: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> BlockParser<R> {
    pub fn new(reader: R, sentinels: &Sentinels) -> Self {
        Self {
            reader,
            sentinel: sentinels.input_line(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for BlockParser<R> {
    type Item = io::Result<InputBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match scan_until(&mut self.reader, &[self.sentinel.as_slice()]) {
            Ok((text, Some(_))) => Some(Ok(InputBlock {
                text,
                end: BlockEnd::Sentinel,
            })),
            Ok((text, None)) => {
                self.finished = true;
                Some(Ok(InputBlock {
                    text,
                    end: BlockEnd::Eof,
                }))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// A named test program, split into its input blocks.
#[derive(Debug, Clone)]
pub struct TestProgram {
    pub name: String,
    pub blocks: Vec<InputBlock>,
}

impl TestProgram {
    pub fn parse<R: BufRead>(name: impl Into<String>, reader: R, sentinels: &Sentinels) -> io::Result<Self> {
        let blocks = BlockParser::new(reader, sentinels).collect::<io::Result<Vec<_>>>()?;
        Ok(Self {
            name: name.into(),
            blocks,
        })
    }

    pub fn from_path(name: impl Into<String>, path: &Path, sentinels: &Sentinels) -> Result<Self> {
        let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
        Self::parse(name, BufReader::new(file), sentinels).map_err(|e| HarnessError::io(path, e))
    }
}

// ============================================================================
// FIXTURE SUBINPUTS
// ============================================================================

/// How a subinput block was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubInputEnd {
    /// `---subinput---`: the section continues.
    Subinput,
    /// `---input---`: the section is over, the next one follows.
    Input,
    /// End of stream: the section is over and there are no more.
    Eof,
}

impl SubInputEnd {
    pub fn closes_section(self) -> bool {
        !matches!(self, SubInputEnd::Subinput)
    }
}

/// One stdin payload for the produced executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubInputBlock {
    pub stdin: Vec<u8>,
    pub end: SubInputEnd,
}

/// The subinput blocks that belong to one program block. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSection {
    pub blocks: Vec<SubInputBlock>,
}

impl FixtureSection {
    /// A section holding a single empty payload.
    pub fn empty() -> Self {
        Self {
            blocks: vec![SubInputBlock {
                stdin: Vec::new(),
                end: SubInputEnd::Eof,
            }],
        }
    }
}

/// Scans a fixture stream one subinput block or one section at a time.
pub struct SubInputScanner<R> {
    reader: R,
    subinput: Vec<u8>,
    input: Vec<u8>,
    exhausted: bool,
}

impl<R: BufRead> SubInputScanner<R> {
    pub fn new(reader: R, sentinels: &Sentinels) -> Self {
        Self {
            reader,
            subinput: sentinels.subinput_line(),
            input: sentinels.input_line(),
            exhausted: false,
        }
    }

    /// Reads the next subinput block. Past end of stream this keeps returning
    /// empty blocks closed by [`SubInputEnd::Eof`].
    pub fn next_block(&mut self) -> io::Result<SubInputBlock> {
        if self.exhausted {
            return Ok(SubInputBlock {
                stdin: Vec::new(),
                end: SubInputEnd::Eof,
            });
        }
        let (stdin, stop) = scan_until(&mut self.reader, &[self.subinput.as_slice(), self.input.as_slice()])?;
        let end = match stop {
            Some(0) => SubInputEnd::Subinput,
            Some(_) => SubInputEnd::Input,
            None => {
                self.exhausted = true;
                SubInputEnd::Eof
            }
        };
        Ok(SubInputBlock { stdin, end })
    }

    /// Reads blocks up to and including the one that closes the section.
    /// Returns `None` once the stream has been fully consumed.
    pub fn next_section(&mut self) -> io::Result<Option<FixtureSection>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut blocks = Vec::new();
        loop {
            let block = self.next_block()?;
            let closes = block.end.closes_section();
            blocks.push(block);
            if closes {
                return Ok(Some(FixtureSection { blocks }));
            }
        }
    }
}

/// An external fixture file, split into sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureFile {
    pub sections: Vec<FixtureSection>,
}

impl FixtureFile {
    pub fn parse<R: BufRead>(reader: R, sentinels: &Sentinels) -> io::Result<Self> {
        let mut scanner = SubInputScanner::new(reader, sentinels);
        let mut sections = Vec::new();
        while let Some(section) = scanner.next_section()? {
            sections.push(section);
        }
        Ok(Self { sections })
    }

    pub fn from_path(path: &Path, sentinels: &Sentinels) -> Result<Self> {
        let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
        Self::parse(BufReader::new(file), sentinels).map_err(|e| HarnessError::io(path, e))
    }
}
