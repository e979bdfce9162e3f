use log::debug;
use rand::Rng;
use crate::engine::audio::{AudioEngine, AudioSink, LoadOutcome};
use crate::engine::cloud::{ApproxMetrics, PALETTE};
use crate::engine::render::{render, CardView, FrequencyStats};
use crate::engine::storage::{StorageBox, StoredWord};
use crate::engine::store::WordStore;
use crate::models::WordEntry;
use crate::utils::{circular_distance, neighborhood, wrap_index};

/// Distance from the last committed card within which audio plays and preloads
pub const AUDIO_WINDOW: usize = 2;

pub const STORAGE_WIDTH: f64 = 320.0;
pub const STORAGE_HEIGHT: f64 = 160.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub word_index: usize,
    pub back_card_index: usize,
    pub flipped: bool,
    pub last_interacted: usize,
}

/// Owns the deck position and drives rendering and audio on every move
pub struct NavigationController<S: AudioSink> {
    store: WordStore,
    stats: FrequencyStats,
    state: NavigationState,
    audio: AudioEngine<S>,
    view: Option<CardView>,
    /// Palette offset; a card's accent is `PALETTE[(offset + index) % len]`
    accent_offset: Option<usize>,
    storage: StorageBox,
}

impl<S: AudioSink> NavigationController<S> {
    pub fn new(store: WordStore, audio: AudioEngine<S>) -> Self {
        Self::starting_at(store, audio, 0)
    }

    /// Build a controller positioned on `index` (e.g. a word picked in the cloud)
    pub fn starting_at(store: WordStore, audio: AudioEngine<S>, index: usize) -> Self {
        let stats = store.frequency_stats();
        let start = if store.is_empty() { 0 } else { index % store.len() };
        let mut controller = Self {
            store,
            stats,
            state: NavigationState { word_index: start, last_interacted: start, ..Default::default() },
            audio,
            view: None,
            accent_offset: None,
            storage: StorageBox::new(STORAGE_WIDTH, STORAGE_HEIGHT),
        };
        controller.render();
        controller.preload_around(start);
        controller
    }

    /// Carry the cloud color of the current word into the cards. Following
    /// cards step through the palette from there. Colors outside the palette
    /// are ignored.
    pub fn with_accent(mut self, color: &str) -> Self {
        match PALETTE.iter().position(|c| c.eq_ignore_ascii_case(color)) {
            Some(pos) => {
                let len = PALETTE.len();
                self.accent_offset = Some((pos + len - self.state.word_index % len) % len);
                self.render();
            }
            None => debug!("Color {} is not in the palette, keeping frequency colors", color),
        }
        self
    }

    pub fn accent(&self) -> Option<&'static str> {
        self.accent_offset
            .map(|offset| PALETTE[(offset + self.state.word_index) % PALETTE.len()])
    }

    pub fn storage(&self) -> &StorageBox {
        &self.storage
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn view(&self) -> Option<&CardView> {
        self.view.as_ref()
    }

    pub fn store(&self) -> &WordStore {
        &self.store
    }

    pub fn audio(&self) -> &AudioEngine<S> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioEngine<S> {
        &mut self.audio
    }

    pub fn current_entry(&self) -> Option<&WordEntry> {
        self.store.get(self.state.word_index)
    }

    /// Audio id the current state would play
    pub fn current_audio(&self) -> Option<String> {
        self.current_entry()
            .and_then(|e| e.audio_for(self.state.flipped, self.state.back_card_index))
            .map(|s| s.to_string())
    }

    pub fn go_to(&mut self, index: usize) {
        if self.store.is_empty() {
            return;
        }
        let index = index % self.store.len();
        self.transition(index, 0, self.state.flipped);
    }

    pub fn next(&mut self) {
        let index = wrap_index(self.state.word_index, 1, self.store.len());
        self.go_to(index);
    }

    pub fn prev(&mut self) {
        let index = wrap_index(self.state.word_index, -1, self.store.len());
        self.go_to(index);
    }

    pub fn flip(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.transition(self.state.word_index, self.state.back_card_index, !self.state.flipped);
    }

    /// Move between definition variants of the flipped card
    pub fn cycle_back_card(&mut self, direction: isize) {
        let count = self.current_entry().map(|e| e.back_cards.len()).unwrap_or(0);
        if !self.state.flipped || count == 0 {
            return;
        }
        let back = wrap_index(self.state.back_card_index, direction, count);
        self.transition(self.state.word_index, back, true);
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.store.shuffle(rng);
        self.restart();
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.restart();
    }

    fn restart(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.transition(0, 0, self.state.flipped);
    }

    /// Narrow the deck to one initial letter (`None` for all words) and
    /// start over on its first card, face up
    pub fn select_letter(&mut self, letter: Option<char>) {
        self.audio.stop();
        self.store.filter_letter(letter);
        debug!("Deck filtered to {:?}: {} words", self.store.letter(), self.store.len());
        if self.store.is_empty() {
            self.state = NavigationState::default();
            self.view = None;
            return;
        }
        self.transition(0, 0, false);
    }

    /// Move the current word into the storage box, then show the next card
    pub fn store_current<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<StoredWord> {
        let word = self.current_entry()?.word.clone();
        let accent = self.accent();
        let stored = self
            .storage
            .store(&word, accent, &ApproxMetrics::default(), rng)
            .cloned();
        self.next();
        stored
    }

    /// Show `index` while the position control is being dragged.
    /// No audio and no change to the last committed position.
    pub fn preview(&mut self, index: usize) {
        if self.store.is_empty() {
            return;
        }
        self.state.word_index = index % self.store.len();
        self.state.back_card_index = 0;
        self.render();
    }

    /// Release of the position control
    pub fn commit(&mut self, index: usize) {
        self.go_to(index);
    }

    pub fn play_current(&mut self) {
        self.play_if_near(self.state.word_index);
    }

    pub fn unlock_audio(&mut self) -> bool {
        self.audio.unlock()
    }

    pub fn on_loaded(&mut self, outcome: LoadOutcome) {
        self.audio.on_loaded(&outcome.id, outcome.result);
    }

    fn transition(&mut self, word_index: usize, back_card_index: usize, flipped: bool) {
        self.audio.stop();

        let back_count = self.store.get(word_index).map(|e| e.back_cards.len()).unwrap_or(0);
        self.state.word_index = word_index;
        self.state.back_card_index = if back_count == 0 { 0 } else { back_card_index % back_count };
        self.state.flipped = flipped;
        self.state.last_interacted = word_index;
        debug!("Navigated to {:?}", self.state);

        self.render();
        self.play_if_near(word_index);
        self.preload_around(self.state.last_interacted);
    }

    fn render(&mut self) {
        self.view = self
            .store
            .get(self.state.word_index)
            .map(|entry| render(entry, self.state.back_card_index, self.state.flipped, &self.stats));
        let accent = self.accent();
        self.view = self.view.take().map(|view| view.with_accent(accent));
    }

    fn play_if_near(&mut self, target: usize) {
        if !self.audio.is_unlocked() {
            return;
        }
        if circular_distance(target, self.state.last_interacted, self.store.len()) > AUDIO_WINDOW {
            return;
        }
        if let Some(id) = self.current_audio() {
            self.audio.play(&id);
        }
    }

    fn preload_around(&mut self, center: usize) {
        let ids: Vec<String> = neighborhood(center, AUDIO_WINDOW, self.store.len())
            .into_iter()
            .filter_map(|idx| {
                let back = if idx == self.state.word_index { self.state.back_card_index } else { 0 };
                self.store
                    .get(idx)
                    .and_then(|e| e.audio_for(self.state.flipped, back))
                    .map(|s| s.to_string())
            })
            .collect();
        self.audio.preload(&ids);
    }
}
