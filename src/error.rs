use thiserror::Error;

/// Failures of the fallible surfaces: raw data parsing and configuration.
///
/// Lookups that simply find nothing are not errors; they return `None`
/// and log a warning.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to parse JSON data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unsupported armature type `{0}` in `{1}`")]
    UnsupportedArmature(String, String),
}

pub type Result<T> = std::result::Result<T, DataError>;
