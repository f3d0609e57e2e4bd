use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Known-word index unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("Failed to build row for '{word}': {reason}")]
    RowBuild { word: String, reason: String },

    #[error("Tagger returned no tokens for non-empty input: {input:?}")]
    EmptyTaggerOutput { input: String },

    #[error("Known-word index corrupted: {0}")]
    IndexCorrupted(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("LexiconError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for LexiconError {
    fn from(error: std::io::Error) -> Self {
        LexiconError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for LexiconError {
    fn from(error: reqwest::Error) -> Self {
        LexiconError::Reqwest(Box::new(error))
    }
}
