use std::io;

use thiserror::Error;

/// Reachability probe error types
#[derive(Error, Debug)]
pub enum ReachError {
    #[error("empty address")]
    EmptyAddress,

    #[error("invalid address: {0}")]
    Parse(#[from] url::ParseError),

    #[error("invalid port in address: {0}")]
    InvalidPort(String),

    #[error("missing host in address: {0}")]
    MissingHost(String),

    #[error("unknown network kind: {0}")]
    InvalidNetwork(String),

    #[error("dial error: {0}")]
    Dial(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ReachError>;
