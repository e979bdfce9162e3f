use rand::seq::SliceRandom;
use rand::Rng;
use crate::engine::render::FrequencyStats;
use crate::models::WordEntry;
use crate::utils::{available_letters, words_by_letter};

/// The working word list plus the rank-sorted order it started from.
/// An optional letter filter narrows both to words with that initial.
pub struct WordStore {
    words: Vec<WordEntry>,
    original: Vec<WordEntry>,
    all: Vec<WordEntry>,
    letter: Option<char>,
}

impl WordStore {
    pub fn new(mut entries: Vec<WordEntry>) -> Self {
        entries.sort_by_key(|w| w.rank);
        Self {
            words: entries.clone(),
            original: entries.clone(),
            all: entries,
            letter: None,
        }
    }

    /// Restrict the deck to words starting with `letter`; `None` shows every word.
    /// The working order goes back to rank order either way.
    pub fn filter_letter(&mut self, letter: Option<char>) {
        let letter = letter.and_then(|c| c.to_lowercase().next());
        self.original = match letter {
            Some(c) => words_by_letter(&self.all, c).into_iter().cloned().collect(),
            None => self.all.clone(),
        };
        self.letter = letter;
        self.words = self.original.clone();
    }

    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    /// Initials available for filtering across the whole data set
    pub fn letters(&self) -> Vec<char> {
        available_letters(&self.all)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WordEntry> {
        self.words.get(index)
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.words.shuffle(rng);
    }

    pub fn reset(&mut self) {
        self.words = self.original.clone();
    }

    /// Position of `word` in the current order, ignoring case
    pub fn position_of(&self, word: &str) -> Option<usize> {
        let needle = word.to_lowercase();
        self.words.iter().position(|w| w.word.to_lowercase() == needle)
    }

    pub fn frequency_stats(&self) -> FrequencyStats {
        FrequencyStats::from_words(&self.all)
    }
}
