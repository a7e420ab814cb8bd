//! Indexer type definitions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    /// A configured glob pattern could not be compiled
    #[error("Invalid catalog pattern: {0}")]
    InvalidPattern(String),
    /// Other generic error
    #[error("An error occurred: {0}")]
    Error(String),
}
