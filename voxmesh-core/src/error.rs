//! Error types for voxmesh

use thiserror::Error;

/// Main error type for voxmesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for voxmesh operations
pub type Result<T> = std::result::Result<T, Error>;
