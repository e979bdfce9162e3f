use serde::{Deserialize, Serialize};
use crate::services::checkout::{CheckoutProvider, CheckoutSettings};

/// One definition/example variant shown on the back of a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackCard {
    pub definition_en: String,
    pub example_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_th: Option<String>,
}

/// A single vocabulary entry as stored in the word database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub rank: u32,
    pub freq: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    pub word_audio_file: Vec<String>,
    #[serde(default)]
    pub back_cards: Vec<BackCard>,
    #[serde(default)]
    pub sentence_audio_file: Vec<String>,
}

impl WordEntry {
    /// Audio to play for this entry given the flip state and back card.
    /// Sentence audio wins when flipped, otherwise the first word audio.
    pub fn audio_for(&self, flipped: bool, back_card_index: usize) -> Option<&str> {
        if flipped {
            if let Some(sentence) = self.sentence_audio_file.get(back_card_index) {
                return Some(sentence.as_str());
            }
        }
        self.word_audio_file.first().map(|s| s.as_str())
    }
}

/// Application state shared across all handlers
pub struct AppState {
    pub words: Vec<WordEntry>,
    pub checkout: Box<dyn CheckoutProvider>,
    pub checkout_settings: CheckoutSettings,
}

#[derive(Deserialize)]
pub struct WordsQuery {
    pub letter: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct CloudQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    /// Amount in minor units (cents)
    pub amount: Option<u64>,
    pub description: Option<String>,
    pub statement_descriptor: Option<String>,
    pub currency: Option<String>,
    /// Pre-configured price reference, used instead of an ad-hoc amount
    pub price: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> WordEntry {
        WordEntry {
            word: "run".to_string(),
            rank: 1,
            freq: 10.0,
            part_of_speech: None,
            word_audio_file: vec!["run.mp3".to_string()],
            back_cards: vec![
                BackCard {
                    definition_en: "move fast".to_string(),
                    example_en: "I run every day.".to_string(),
                    definition_th: None,
                    example_th: None,
                },
                BackCard {
                    definition_en: "manage".to_string(),
                    example_en: "She runs a shop.".to_string(),
                    definition_th: None,
                    example_th: None,
                },
            ],
            sentence_audio_file: vec!["run_0.mp3".to_string()],
        }
    }

    #[test]
    fn test_audio_for_front_uses_word_audio() {
        assert_eq!(entry().audio_for(false, 0), Some("run.mp3"));
        assert_eq!(entry().audio_for(false, 1), Some("run.mp3"));
    }

    #[test]
    fn test_audio_for_back_prefers_sentence_audio() {
        assert_eq!(entry().audio_for(true, 0), Some("run_0.mp3"));
        // No sentence audio recorded for the second back card
        assert_eq!(entry().audio_for(true, 1), Some("run.mp3"));
    }

    #[test]
    fn test_audio_for_without_any_audio() {
        let mut e = entry();
        e.word_audio_file.clear();
        e.sentence_audio_file.clear();
        assert_eq!(e.audio_for(true, 0), None);
    }
}
