//! Pure mapping from navigation state to what a card shows.

use std::fmt;
use serde::Serialize;
use crate::models::WordEntry;

const MIN_PERCENT: f64 = 5.0;
const MAX_PERCENT: f64 = 100.0;
const MAX_HUE: f64 = 120.0;

/// Frequency range of the loaded data set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyStats {
    pub min: f64,
    pub max: f64,
}

impl FrequencyStats {
    pub fn from_words(words: &[WordEntry]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for w in words {
            min = min.min(w.freq);
            max = max.max(w.freq);
        }
        if words.is_empty() {
            Self { min: 1.0, max: 1.0 }
        } else {
            Self { min, max }
        }
    }

    /// Log-scaled position of `freq` between min and max, in [5, 100]
    pub fn percent(&self, freq: f64) -> f64 {
        if freq <= 0.0 || self.min <= 0.0 {
            return MIN_PERCENT;
        }
        let (lo, hi) = (self.min.ln(), self.max.ln());
        if hi <= lo {
            return MAX_PERCENT;
        }
        let t = (freq.ln() - lo) / (hi - lo);
        (MIN_PERCENT + t * (MAX_PERCENT - MIN_PERCENT)).clamp(MIN_PERCENT, MAX_PERCENT)
    }
}

/// Hue in degrees signalling relative frequency: red for rare, green for common
pub fn frequency_hue(percent: f64) -> f64 {
    (percent * MAX_HUE / MAX_PERCENT).clamp(0.0, MAX_HUE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackView {
    pub definition: String,
    pub example: String,
    pub translation: Option<String>,
    pub card_number: usize,
    pub card_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub word: String,
    pub rank: u32,
    pub part_of_speech: Option<String>,
    pub flipped: bool,
    pub back: Option<BackView>,
    pub frequency_percent: f64,
    pub hue: f64,
    /// Word color carried over from the word cloud
    pub accent: Option<String>,
}

impl CardView {
    pub fn with_accent(mut self, accent: Option<&str>) -> Self {
        self.accent = accent.map(|c| c.to_string());
        self
    }

    /// Display color of the word: the carried-over accent, else the frequency hue
    pub fn color(&self) -> String {
        match &self.accent {
            Some(accent) => accent.clone(),
            None => format!("hsl({:.0}, 100%, 50%)", self.hue),
        }
    }
}

pub fn render(entry: &WordEntry, back_card_index: usize, flipped: bool, stats: &FrequencyStats) -> CardView {
    let frequency_percent = stats.percent(entry.freq);
    let back = if flipped {
        entry.back_cards.get(back_card_index).map(|card| BackView {
            definition: card.definition_en.clone(),
            example: card.example_en.clone(),
            translation: card.definition_th.clone(),
            card_number: back_card_index + 1,
            card_count: entry.back_cards.len(),
        })
    } else {
        None
    };

    CardView {
        word: entry.word.clone(),
        rank: entry.rank,
        part_of_speech: entry.part_of_speech.clone(),
        flipped,
        back,
        frequency_percent,
        hue: frequency_hue(frequency_percent),
        accent: None,
    }
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {}", self.rank, self.word)?;
        if !self.flipped {
            return Ok(());
        }
        if let Some(pos) = &self.part_of_speech {
            writeln!(f, "  ({})", pos)?;
        }
        match &self.back {
            Some(back) => {
                writeln!(f, "  [{}/{}] {}", back.card_number, back.card_count, back.definition)?;
                writeln!(f, "  e.g. {}", back.example)?;
                if let Some(th) = &back.translation {
                    writeln!(f, "  {}", th)?;
                }
            }
            None => writeln!(f, "  (no definitions)")?,
        }
        write!(f, "  frequency {:.0}%", self.frequency_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BackCard;

    fn entry(freq: f64, cards: usize) -> WordEntry {
        WordEntry {
            word: "light".to_string(),
            rank: 4,
            freq,
            part_of_speech: Some("noun".to_string()),
            word_audio_file: vec!["light.mp3".to_string()],
            back_cards: (0..cards)
                .map(|i| BackCard {
                    definition_en: format!("meaning {}", i),
                    example_en: format!("example {}", i),
                    definition_th: None,
                    example_th: None,
                })
                .collect(),
            sentence_audio_file: vec![],
        }
    }

    #[test]
    fn test_percent_bounds() {
        let stats = FrequencyStats { min: 1.0, max: 1000.0 };
        assert_eq!(stats.percent(1000.0), 100.0);
        assert_eq!(stats.percent(1.0), 5.0);
        assert_eq!(stats.percent(0.5), 5.0);
        assert_eq!(stats.percent(5000.0), 100.0);
    }

    #[test]
    fn test_percent_is_monotonic() {
        let stats = FrequencyStats { min: 1.0, max: 1000.0 };
        let mut last = 0.0;
        for f in [1.0, 2.0, 10.0, 31.6, 100.0, 500.0, 999.0, 1000.0] {
            let p = stats.percent(f);
            assert!(p >= last, "{} < {} at freq {}", p, last, f);
            last = p;
        }
        // log scale: the geometric midpoint lands halfway
        assert!((stats.percent(31.622776601683793) - 52.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_frequency_data_set() {
        let stats = FrequencyStats { min: 3.0, max: 3.0 };
        assert_eq!(stats.percent(3.0), 100.0);
    }

    #[test]
    fn test_hue_capped() {
        assert_eq!(frequency_hue(100.0), 120.0);
        assert_eq!(frequency_hue(5.0), 6.0);
        assert_eq!(frequency_hue(250.0), 120.0);
    }

    #[test]
    fn test_front_has_no_back() {
        let stats = FrequencyStats { min: 1.0, max: 10.0 };
        let view = render(&entry(10.0, 2), 0, false, &stats);
        assert!(view.back.is_none());
        assert_eq!(view.frequency_percent, 100.0);
        assert_eq!(view.color(), "hsl(120, 100%, 50%)");
    }

    #[test]
    fn test_accent_overrides_hue() {
        let stats = FrequencyStats { min: 1.0, max: 10.0 };
        let view = render(&entry(10.0, 0), 0, false, &stats).with_accent(Some("#40c4ff"));
        assert_eq!(view.color(), "#40c4ff");
        assert_eq!(view.hue, 120.0);
    }

    #[test]
    fn test_back_shows_selected_card() {
        let stats = FrequencyStats { min: 1.0, max: 10.0 };
        let view = render(&entry(1.0, 3), 1, true, &stats);
        let back = view.back.unwrap();
        assert_eq!(back.definition, "meaning 1");
        assert_eq!(back.card_number, 2);
        assert_eq!(back.card_count, 3);
    }

    #[test]
    fn test_back_without_cards() {
        let stats = FrequencyStats { min: 1.0, max: 10.0 };
        let view = render(&entry(1.0, 0), 0, true, &stats);
        assert!(view.back.is_none());
        assert!(view.to_string().contains("no definitions"));
    }
}
