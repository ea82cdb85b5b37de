use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write table {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Reasons a whole store export contributes nothing to a run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source file not found: {0}")]
    Unavailable(PathBuf),

    #[error("could not decode {path} with any of [{tried}]")]
    Decode { path: PathBuf, tried: String },

    #[error("header of {path} has no column labelled '{label}' for field {field}")]
    HeaderMismatch {
        path: PathBuf,
        field: &'static str,
        label: String,
    },

    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

impl SourceError {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Unavailable(_) => "unavailable",
            SourceError::Decode { .. } => "decode",
            SourceError::HeaderMismatch { .. } => "header_mismatch",
            SourceError::Read { .. } => "read",
        }
    }
}

/// Why a raw price token was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    #[error("empty price")]
    Empty,

    #[error("unparseable price '{0}'")]
    Unparseable(String),

    #[error("negative price {0}")]
    Negative(f64),
}
