use std::collections::HashSet;
use std::fs;
use std::path::Path;
use log::{info, warn};
use crate::error::DataLoadError;
use crate::models::WordEntry;

/// Parse a word document, picking the format from the file extension
pub fn parse_words(text: &str, extension: &str) -> Result<Vec<WordEntry>, DataLoadError> {
    let parsed: Option<Vec<WordEntry>> = match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(text)?,
        "json" => serde_json::from_str(text)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    let words = parsed.unwrap_or_default();
    if words.is_empty() {
        return Err(DataLoadError::Empty);
    }
    validate_words(&words)?;
    Ok(words)
}

/// Check the invariants every entry must satisfy before the engine sees it
pub fn validate_words(words: &[WordEntry]) -> Result<(), DataLoadError> {
    let mut ranks = HashSet::new();

    for entry in words {
        let invalid = |reason: &str| DataLoadError::Invalid {
            word: entry.word.clone(),
            reason: reason.to_string(),
        };

        if entry.word.trim().is_empty() {
            return Err(invalid("word is empty"));
        }
        if entry.rank == 0 {
            return Err(invalid("rank must be a positive integer"));
        }
        if !ranks.insert(entry.rank) {
            return Err(invalid(&format!("duplicate rank {}", entry.rank)));
        }
        if !entry.freq.is_finite() || entry.freq <= 0.0 {
            return Err(invalid("freq must be positive"));
        }
        if entry.word_audio_file.is_empty() {
            return Err(invalid("at least one word audio file is required"));
        }
        if entry.sentence_audio_file.len() > entry.back_cards.len() {
            return Err(invalid("more sentence audio files than back cards"));
        }
    }

    Ok(())
}

/// Load and validate the word data set at `path`
pub fn load_words(path: &Path) -> Result<Vec<WordEntry>, DataLoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let text = fs::read_to_string(path)?;
    let mut words = parse_words(&text, &extension)?;
    words.sort_by_key(|w| w.rank);
    Ok(words)
}

/// Load the data set, degrading to an empty list with a warning on failure
pub fn load_words_or_warn(path: &Path) -> Vec<WordEntry> {
    match load_words(path) {
        Ok(words) => {
            info!("Loaded {} words from {}.", words.len(), path.display());
            words
        }
        Err(e) => {
            warn!("No word data available from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
