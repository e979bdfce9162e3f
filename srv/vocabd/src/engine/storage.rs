//! Storage box for words swiped up out of the deck. Each stored word lands on
//! a free spot a little smaller than the one before and is tied to its
//! predecessor by a faint line.

use log::{debug, warn};
use rand::Rng;
use serde::Serialize;
use crate::engine::cloud::{overlaps, Bounds, Link, TextMetrics, LINK_OPACITY, MAX_ATTEMPTS};

pub const STORAGE_BASE_REM: f64 = 1.5;
pub const STORAGE_STEP_REM: f64 = 0.05;
pub const STORAGE_MIN_REM: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredWord {
    pub word: String,
    pub color: Option<String>,
    pub font_size: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl StoredWord {
    fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl Bounds for StoredWord {
    fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageBox {
    pub width: f64,
    pub height: f64,
    pub words: Vec<StoredWord>,
    pub links: Vec<Link>,
}

impl StorageBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ..Default::default() }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Font size for the next stored word
    pub fn next_font_size(&self) -> f64 {
        (STORAGE_BASE_REM - self.words.len() as f64 * STORAGE_STEP_REM).max(STORAGE_MIN_REM)
    }

    /// Place `word` on a free spot. Returns `None` when no spot was found.
    pub fn store<M: TextMetrics, R: Rng + ?Sized>(
        &mut self,
        word: &str,
        color: Option<&str>,
        metrics: &M,
        rng: &mut R,
    ) -> Option<&StoredWord> {
        let font_size = self.next_font_size();
        let (width, height) = metrics.measure(word, font_size);

        let mut spot = None;
        for _ in 0..MAX_ATTEMPTS {
            let x = rng.gen::<f64>() * (self.width - width).max(0.0);
            let y = rng.gen::<f64>() * (self.height - height).max(0.0);
            if !overlaps(x, y, width, height, &self.words) {
                spot = Some((x, y));
                break;
            }
        }

        let Some((x, y)) = spot else {
            warn!("Could not place word in storage: {}", word);
            return None;
        };

        let stored = StoredWord {
            word: word.to_string(),
            color: color.map(|c| c.to_string()),
            font_size,
            x,
            y,
            width,
            height,
        };
        if let Some(prev) = self.words.last() {
            let (x1, y1) = prev.center();
            let (x2, y2) = stored.center();
            let from = self.words.len() - 1;
            self.links.push(Link { from, to: from + 1, x1, y1, x2, y2, opacity: LINK_OPACITY });
        }
        self.words.push(stored);
        debug!("Stored '{}' ({} words in storage)", word, self.words.len());
        self.words.last()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.links.clear();
    }
}
