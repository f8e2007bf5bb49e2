use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an optimization run before or between phases.
///
/// Malformed input lines are not errors; they are counted in
/// [`crate::io::clm::LoadReport`] and skipped.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog `{path}` contains no usable contigs")]
    EmptyCatalog { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("cannot resume from `{path}`: {reason}")]
    Resume { path: PathBuf, reason: String },
}

impl ScaffoldError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScaffoldError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
