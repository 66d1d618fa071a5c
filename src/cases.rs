//! Case enumeration.
//!
//! A case is one program block paired with one stdin payload (or none). With
//! a fixture file, section `i` of the fixture belongs to block `i` of the
//! program and every subinput block of that section is its own case; without
//! one, each program block is a single case with no stdin.
//!
//! The two sides must advance in lockstep. A fixture with more or fewer
//! sections than the program has blocks would silently shift every later
//! result against its golden record, so [`CaseEnumerator::new`] checks the
//! counts up front and applies the configured [`FixturePolicy`].

use tracing::warn;

use crate::blocks::{FixtureFile, FixtureSection, InputBlock, SubInputBlock, TestProgram};
use crate::config::FixturePolicy;
use crate::errors::{HarnessError, Result};

/// One compile-and-run unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Case<'a> {
    /// Position of the program block.
    pub block: usize,
    /// Position of the subinput within its section, if there is a fixture.
    pub subinput: Option<usize>,
    pub input: &'a InputBlock,
    pub stdin: Option<&'a SubInputBlock>,
}

impl Case<'_> {
    pub fn source(&self) -> &[u8] {
        &self.input.text
    }

    pub fn stdin_bytes(&self) -> Option<&[u8]> {
        self.stdin.map(|s| s.stdin.as_slice())
    }

    /// Short label such as `#2` or `#2.1`, for progress logs.
    pub fn label(&self) -> String {
        match self.subinput {
            Some(sub) => format!("#{}.{}", self.block, sub),
            None => format!("#{}", self.block),
        }
    }
}

/// Ordered iterator over the cases of one program.
pub struct CaseEnumerator<'a> {
    blocks: &'a [InputBlock],
    sections: Option<Vec<&'a FixtureSection>>,
    block: usize,
    subinput: usize,
}

static EMPTY_SECTION: std::sync::OnceLock<FixtureSection> = std::sync::OnceLock::new();

fn empty_section() -> &'static FixtureSection {
    EMPTY_SECTION.get_or_init(FixtureSection::empty)
}

impl<'a> CaseEnumerator<'a> {
    /// Pairs `program` with `fixture`, failing under [`FixturePolicy::Strict`]
    /// when their section counts differ.
    pub fn new(
        program: &'a TestProgram,
        fixture: Option<&'a FixtureFile>,
        policy: FixturePolicy,
    ) -> Result<Self> {
        let sections = match fixture {
            None => None,
            Some(file) => Some(align(program, file, policy)?),
        };
        Ok(Self {
            blocks: &program.blocks,
            sections,
            block: 0,
            subinput: 0,
        })
    }

    /// Number of cases the enumeration yields in total.
    pub fn case_count(&self) -> usize {
        match &self.sections {
            None => self.blocks.len(),
            Some(sections) => sections.iter().map(|s| s.blocks.len()).sum(),
        }
    }
}

fn align<'a>(
    program: &'a TestProgram,
    file: &'a FixtureFile,
    policy: FixturePolicy,
) -> Result<Vec<&'a FixtureSection>> {
    let blocks = program.blocks.len();
    let sections = file.sections.len();
    if blocks != sections {
        match policy {
            FixturePolicy::Strict => {
                return Err(HarnessError::FixtureMisaligned {
                    program: program.name.clone(),
                    blocks,
                    sections,
                });
            }
            FixturePolicy::Lenient => {
                warn!(
                    program = %program.name,
                    blocks,
                    sections,
                    "fixture misaligned; padding with empty stdin and ignoring extra sections"
                );
            }
        }
    }
    Ok((0..blocks)
        .map(|i| file.sections.get(i).unwrap_or_else(|| empty_section()))
        .collect())
}

impl<'a> Iterator for CaseEnumerator<'a> {
    type Item = Case<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.blocks.get(self.block)?;
        match &self.sections {
            None => {
                let case = Case {
                    block: self.block,
                    subinput: None,
                    input,
                    stdin: None,
                };
                self.block += 1;
                Some(case)
            }
            Some(sections) => {
                let section = sections[self.block];
                let stdin = &section.blocks[self.subinput];
                let case = Case {
                    block: self.block,
                    subinput: Some(self.subinput),
                    input,
                    stdin: Some(stdin),
                };
                self.subinput += 1;
                if self.subinput == section.blocks.len() {
                    self.subinput = 0;
                    self.block += 1;
                }
                Some(case)
            }
        }
    }
}
