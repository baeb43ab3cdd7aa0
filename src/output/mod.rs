//! Output module for the ASN dataset file
//!
//! This module handles:
//! - Streaming records into the dataset file as they are scraped
//! - Patching the finished file into a well-formed document
//! - Reading a finished dataset back into records

mod reader;
mod writer;

pub use reader::{parse_dataset, read_dataset};
pub use writer::{format_entry, DatasetWriter, KeyStyle, ENTRY_SEPARATOR};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dataset writer already finalized")]
    Finalized,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
