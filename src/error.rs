use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while turning subtitle files into a report.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "No files found in folder '{folder}'. Include '.srt' extension to analyse individual file."
    )]
    NoSubtitleFiles { folder: PathBuf },

    #[error("'{path}' is not valid UTF-8 (check it is in unicode format)")]
    NotUnicode { path: PathBuf },

    #[error("'{path}' line {line}: {reason}")]
    InvalidSubtitle {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Couldn't import reference data from '{path}': {reason}")]
    Reference { path: PathBuf, reason: String },

    #[error("sample too small: need at least {needed} observations, got {got}")]
    SampleTooSmall { needed: usize, got: usize },

    #[error("empty sample")]
    EmptySample,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
