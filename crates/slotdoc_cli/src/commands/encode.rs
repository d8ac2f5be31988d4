//! Encode command implementation.

use super::{read_input, CliResult};
use slotdoc_codec::base91;
use std::path::Path;

/// Runs the encode command.
pub fn run(input: Option<&Path>) -> CliResult<()> {
    let bytes = read_input(input)?;
    println!("{}", base91::encode(&bytes));
    Ok(())
}
