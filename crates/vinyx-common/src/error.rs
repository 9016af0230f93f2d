use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VinyxError {
    #[error("No usable records in {}", path.display())]
    EmptyInput { path: PathBuf },

    #[error("Parse error in {} at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Records out of order in {} at line {line}: scores must be ascending", path.display())]
    UnsortedInput { path: PathBuf, line: u64 },

    #[error("Error running {program}. input: {input}, stderr:\n{stderr}")]
    ExternalProcess {
        program: String,
        input: String,
        stderr: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl VinyxError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        VinyxError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, line: u64, message: impl Into<String>) -> Self {
        VinyxError::Parse {
            path: path.as_ref().to_path_buf(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VinyxError>;
