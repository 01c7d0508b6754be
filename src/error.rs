//! Crate error type
//!
//! The simulation itself never fails; only configuration and leaderboard
//! (de)serialization at the edges can.

use thiserror::Error;

/// Errors raised while loading configuration or persisted data
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tuning value `{field}`: {reason}")]
    InvalidTuning { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
