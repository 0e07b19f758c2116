//! Filesystem input and output.

mod output;
mod source;

pub use output::write_records;
pub use source::{CONFIG_FILE, FileError, SourceDirectory, SourceError};
