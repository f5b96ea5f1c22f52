//! Error type for match construction and configuration loading
//!
//! Nothing that happens during play is an error: loose balls, empty rosters
//! and repeated completion are all absorbed by the simulator itself.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
