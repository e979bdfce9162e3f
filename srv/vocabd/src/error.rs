use std::fmt;
use std::io;

/// Failure to load or validate the word data set
#[derive(Debug)]
pub enum DataLoadError {
    Io(io::Error),
    Parse(String),
    UnsupportedFormat(String),
    Empty,
    Invalid { word: String, reason: String },
}

impl fmt::Display for DataLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLoadError::Io(e) => write!(f, "could not read word data: {e}"),
            DataLoadError::Parse(msg) => write!(f, "could not parse word data: {msg}"),
            DataLoadError::UnsupportedFormat(ext) => write!(f, "unsupported data format '{ext}'"),
            DataLoadError::Empty => write!(f, "word data set is empty"),
            DataLoadError::Invalid { word, reason } => write!(f, "invalid entry '{word}': {reason}"),
        }
    }
}

impl std::error::Error for DataLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataLoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DataLoadError {
    fn from(value: io::Error) -> Self {
        DataLoadError::Io(value)
    }
}

impl From<serde_yaml::Error> for DataLoadError {
    fn from(e: serde_yaml::Error) -> Self {
        DataLoadError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for DataLoadError {
    fn from(e: serde_json::Error) -> Self {
        DataLoadError::Parse(e.to_string())
    }
}

/// Per-file audio failures. Never fatal: logged and swallowed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    Load { id: String, reason: String },
    Play { id: String, reason: String },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Load { id, reason } => write!(f, "failed to load audio {id}: {reason}"),
            AudioError::Play { id, reason } => write!(f, "failed to play audio {id}: {reason}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Errors surfaced to the caller of the checkout endpoint
#[derive(Debug)]
pub enum CheckoutError {
    InvalidRequest(String),
    NotConfigured,
    Provider(String),
}

impl fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutError::InvalidRequest(msg) => write!(f, "{msg}"),
            CheckoutError::NotConfigured => write!(f, "payment provider is not configured"),
            CheckoutError::Provider(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CheckoutError {}

impl From<reqwest::Error> for CheckoutError {
    fn from(e: reqwest::Error) -> Self {
        CheckoutError::Provider(e.to_string())
    }
}
