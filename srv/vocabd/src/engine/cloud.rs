//! Word cloud intro: frequency-sized words scattered without overlap,
//! revealed in a stagger and tied together by a faint nearest-neighbour graph.

use std::collections::HashMap;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use crate::models::WordEntry;

pub const MAX_ATTEMPTS: usize = 500;
pub const PADDING: f64 = 2.0;
pub const MIN_FONT_REM: f64 = 0.8;
pub const FONT_RANGE_REM: f64 = 2.2;
pub const REVEAL_WINDOW_MS: u64 = 3000;
pub const FREQ_DELAY_MS: f64 = 500.0;
pub const NEAREST_LINKS: usize = 6;
pub const LINK_OPACITY: f64 = 0.10;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 3.0;

pub const PALETTE: [&str; 8] = [
    "#ff4081", "#00ff88", "#40c4ff", "#ffd740", "#e040fb", "#ff6e40", "#69f0ae", "#b388ff",
];

/// Measures the box a word occupies at a given font size
pub trait TextMetrics {
    fn measure(&self, text: &str, font_rem: f64) -> (f64, f64);
}

/// Average-glyph approximation, good enough for server-side layouts
#[derive(Debug, Clone, Copy)]
pub struct ApproxMetrics {
    pub px_per_rem: f64,
    pub glyph_width: f64,
    pub line_height: f64,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        Self { px_per_rem: 16.0, glyph_width: 0.6, line_height: 1.2 }
    }
}

impl TextMetrics for ApproxMetrics {
    fn measure(&self, text: &str, font_rem: f64) -> (f64, f64) {
        let px = font_rem * self.px_per_rem;
        (text.chars().count() as f64 * px * self.glyph_width, px * self.line_height)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width: f64,
    pub viewport_height: f64,
}

impl Canvas {
    /// Taller than the viewport so the cloud scrolls, and roomier for big sets
    pub fn height_for(&self, distinct_words: usize) -> f64 {
        (self.viewport_height * 1.5).max(distinct_words as f64 * 15.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_size: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub reveal_delay_ms: u64,
}

impl PlacedWord {
    fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub from: usize,
    pub to: usize,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub opacity: f64,
}

/// Emitted when a cloud word is picked; seeds the flashcard session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordSelected {
    pub word: String,
    pub index: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TransitionStep {
    FadeOut { at_ms: u64, words: Vec<String> },
    HideLinks { at_ms: u64 },
    ZoomOut { at_ms: u64, word: String, scale: f64 },
    ShowFlashcard { at_ms: u64, index: usize, color: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CloudLayout {
    pub width: f64,
    pub height: f64,
    pub words: Vec<PlacedWord>,
    pub links: Vec<Link>,
    pub links_at_ms: u64,
    pub dropped: Vec<String>,
    /// Set when there was nothing to lay out
    pub no_words: bool,
}

/// Distinct words (case-insensitive) with occurrence counts, most frequent first.
/// The first-seen casing is kept for display; ties keep first-seen order.
pub fn count_words(entries: &[WordEntry]) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();

    for entry in entries {
        let lower = entry.word.to_lowercase();
        match counts.get_mut(&lower) {
            Some((_, count)) => *count += 1,
            None => {
                order.push(lower.clone());
                counts.insert(lower, (entry.word.clone(), 1));
            }
        }
    }

    let mut words: Vec<(String, usize)> = order
        .into_iter()
        .filter_map(|lower| counts.remove(&lower))
        .collect();
    words.sort_by_key(|&(_, count)| std::cmp::Reverse(count));
    words
}

/// Anything occupying an axis-aligned box on a canvas
pub trait Bounds {
    /// `(x, y, width, height)`
    fn bounds(&self) -> (f64, f64, f64, f64);
}

impl Bounds for PlacedWord {
    fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }
}

/// Axis-aligned overlap test against every placed box, with padding
pub fn overlaps<B: Bounds>(x: f64, y: f64, width: f64, height: f64, placed: &[B]) -> bool {
    placed.iter().any(|p| {
        let (px, py, pw, ph) = p.bounds();
        x + width + PADDING > px
            && x - PADDING < px + pw
            && y + height + PADDING > py
            && y - PADDING < py + ph
    })
}

/// Delay before a word fades in. The top 10% show immediately; the rest are
/// spread over the reveal window, more frequent words first.
fn reveal_delay(index: usize, count: usize, initial: usize, total: usize, min: usize, max: usize) -> u64 {
    if index < initial {
        return 0;
    }
    let remaining = total - initial;
    let per_word = if remaining > 0 { REVEAL_WINDOW_MS as f64 / remaining as f64 } else { 0.0 };
    let normalized = if max == min { 0.0 } else { (max - count) as f64 / (max - min) as f64 };
    (normalized * FREQ_DELAY_MS + (index - initial) as f64 * per_word).round() as u64
}

pub fn layout<M: TextMetrics, R: Rng + ?Sized>(
    entries: &[WordEntry],
    canvas: Canvas,
    metrics: &M,
    rng: &mut R,
) -> CloudLayout {
    let words = count_words(entries);
    let height = canvas.height_for(words.len());
    let mut cloud = CloudLayout {
        width: canvas.width,
        height,
        links_at_ms: REVEAL_WINDOW_MS,
        ..Default::default()
    };
    if words.is_empty() {
        cloud.no_words = true;
        return cloud;
    }

    let max = words.iter().map(|(_, c)| *c).max().unwrap_or(1);
    let min = words.iter().map(|(_, c)| *c).min().unwrap_or(1).max(1);
    let initial = (words.len() as f64 * 0.1).ceil() as usize;

    for (index, (word, count)) in words.iter().enumerate() {
        let font_size = MIN_FONT_REM + (*count as f64 / max as f64) * FONT_RANGE_REM;
        let (width, word_height) = metrics.measure(word, font_size);

        let mut spot = None;
        for _ in 0..MAX_ATTEMPTS {
            let x = rng.gen::<f64>() * (canvas.width - width).max(0.0);
            let y = rng.gen::<f64>() * (height - word_height).max(0.0);
            if !overlaps(x, y, width, word_height, &cloud.words) {
                spot = Some((x, y));
                break;
            }
        }

        let Some((x, y)) = spot else {
            warn!("Could not place word: {}", word);
            cloud.dropped.push(word.clone());
            continue;
        };

        let color = PALETTE.choose(rng).copied().unwrap_or(PALETTE[0]).to_string();
        cloud.words.push(PlacedWord {
            word: word.clone(),
            count: *count,
            font_size,
            x,
            y,
            width,
            height: word_height,
            color,
            reveal_delay_ms: reveal_delay(index, *count, initial, words.len(), min, max),
        });
    }

    cloud.links = nearest_links(&cloud.words);
    debug!(
        "Laid out {} words ({} dropped) with {} links",
        cloud.words.len(),
        cloud.dropped.len(),
        cloud.links.len()
    );
    cloud
}

/// Lines from each word to its nearest placed neighbours
pub fn nearest_links(words: &[PlacedWord]) -> Vec<Link> {
    let mut links = Vec::new();
    for (i, a) in words.iter().enumerate() {
        let mut others: Vec<(usize, f64)> = words
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(j, b)| (j, (a.x - b.x).hypot(a.y - b.y)))
            .collect();
        others.sort_by(|l, r| l.1.total_cmp(&r.1));

        let (x1, y1) = a.center();
        for &(j, _) in others.iter().take(NEAREST_LINKS) {
            let (x2, y2) = words[j].center();
            links.push(Link { from: i, to: j, x1, y1, x2, y2, opacity: LINK_OPACITY });
        }
    }
    links
}

impl CloudLayout {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn find(&self, word: &str) -> Option<&PlacedWord> {
        let needle = word.to_lowercase();
        self.words.iter().find(|w| w.word.to_lowercase() == needle)
    }

    /// Resolve a click on `word` against the deck it will open into
    pub fn select(&self, word: &str, deck: &[WordEntry]) -> Option<WordSelected> {
        let placed = self.find(word)?;
        let needle = placed.word.to_lowercase();
        let index = deck.iter().position(|e| e.word.to_lowercase() == needle)?;
        Some(WordSelected { word: placed.word.clone(), index, color: placed.color.clone() })
    }

    /// Animation plan for handing over from the cloud to the flashcard view
    pub fn transition(&self, selected: &WordSelected) -> Vec<TransitionStep> {
        let others = self
            .words
            .iter()
            .filter(|w| w.word != selected.word)
            .map(|w| w.word.clone())
            .collect();
        vec![
            TransitionStep::FadeOut { at_ms: 0, words: others },
            TransitionStep::HideLinks { at_ms: 0 },
            TransitionStep::ZoomOut { at_ms: 0, word: selected.word.clone(), scale: 10.0 },
            TransitionStep::ShowFlashcard { at_ms: 1000, index: selected.index, color: selected.color.clone() },
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

/// Pinch-zoom and pan state of the cloud canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pinch_start: f64,
    last_point: Option<TouchPoint>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: MIN_ZOOM, translate_x: 0.0, translate_y: 0.0, pinch_start: 0.0, last_point: None }
    }
}

fn distance(a: TouchPoint, b: TouchPoint) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

impl Viewport {
    pub fn touch_start(&mut self, touches: &[TouchPoint]) {
        if let [a, b] = touches {
            self.pinch_start = distance(*a, *b);
        }
    }

    pub fn touch_move(&mut self, touches: &[TouchPoint]) {
        match touches {
            [a, b] => {
                let d = distance(*a, *b);
                if self.pinch_start > 0.0 {
                    self.scale = (self.scale * d / self.pinch_start).clamp(MIN_ZOOM, MAX_ZOOM);
                }
                self.pinch_start = d;
            }
            [p] if self.scale > MIN_ZOOM => {
                let last = self.last_point.unwrap_or(*p);
                self.translate_x += (p.x - last.x) / self.scale;
                self.translate_y += (p.y - last.y) / self.scale;
                self.last_point = Some(*p);
            }
            _ => {}
        }
    }

    pub fn touch_end(&mut self) {
        self.last_point = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn transform(&self) -> String {
        format!("scale({}) translate({}px, {}px)", self.scale, self.translate_x, self.translate_y)
    }
}
