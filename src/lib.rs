pub use crate::errors::{HarnessError, Result};

pub mod blocks;
pub mod cases;
pub mod cli;
pub mod compare;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod orchestrator;
pub mod process;
pub mod record;
pub mod runner;
