//! Gesture, tap and keyboard fan-out into navigation calls.

use log::{debug, info};
use rand::Rng;
use crate::engine::audio::AudioSink;
use crate::engine::navigation::NavigationController;

/// Two taps closer than this are a double tap
pub const DOUBLE_TAP_MS: u64 = 300;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Swipe {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Enter,
    Char(char),
}

impl Key {
    /// Parse a key name as typed in the terminal front end
    pub fn parse(name: &str) -> Option<Key> {
        let name = name.trim();
        match name.to_lowercase().as_str() {
            "" | "enter" => Some(Key::Enter),
            "left" => Some(Key::ArrowLeft),
            "right" => Some(Key::ArrowRight),
            "up" => Some(Key::ArrowUp),
            "down" => Some(Key::ArrowDown),
            "space" => Some(Key::Space),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c.to_ascii_lowercase())),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    Swipe(Swipe),
    Tap,
    Key(Key),
    SliderDrag(usize),
    SliderRelease(usize),
    /// Letter picker; `None` clears the filter
    LetterSelect(Option<char>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Next,
    Prev,
    Flip,
    CycleBackCard(isize),
    Shuffle,
    Reset,
    Play,
    Preview(usize),
    Commit(usize),
    Store,
    SelectLetter(Option<char>),
}

#[derive(Debug, Default)]
pub struct InputAdapter {
    pending_tap: Option<u64>,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending_tap(&self) -> bool {
        self.pending_tap.is_some()
    }

    /// Translate a raw event. Taps are held back until it is clear whether a
    /// second one follows; see [`InputAdapter::tick`]. Any other event drops
    /// a held tap so it never plays against a different card.
    pub fn map_event(&mut self, event: InputEvent, now_ms: u64) -> Option<Action> {
        if event != InputEvent::Tap && self.pending_tap.take().is_some() {
            debug!("Held tap dropped by {:?}", event);
        }
        match event {
            InputEvent::Swipe(Swipe::Left) => Some(Action::Next),
            InputEvent::Swipe(Swipe::Right) => Some(Action::Prev),
            InputEvent::Swipe(Swipe::Up) => Some(Action::Store),
            InputEvent::Swipe(Swipe::Down) => Some(Action::CycleBackCard(1)),
            InputEvent::Tap => match self.pending_tap.replace(now_ms) {
                Some(first) if now_ms.saturating_sub(first) <= DOUBLE_TAP_MS => {
                    self.pending_tap = None;
                    Some(Action::Flip)
                }
                // The earlier tap's window ran out before any tick resolved it
                Some(_) => Some(Action::Play),
                None => None,
            },
            InputEvent::Key(key) => match key {
                Key::ArrowRight | Key::Char('n') => Some(Action::Next),
                Key::ArrowLeft | Key::Char('p') => Some(Action::Prev),
                Key::Space | Key::Enter | Key::Char('f') => Some(Action::Flip),
                Key::ArrowUp => Some(Action::CycleBackCard(-1)),
                Key::ArrowDown => Some(Action::CycleBackCard(1)),
                Key::Char('k') => Some(Action::Store),
                Key::Char('s') => Some(Action::Shuffle),
                Key::Char('r') => Some(Action::Reset),
                Key::Char('a') => Some(Action::Play),
                Key::Char(_) => None,
            },
            InputEvent::SliderDrag(index) => Some(Action::Preview(index)),
            InputEvent::SliderRelease(index) => Some(Action::Commit(index)),
            InputEvent::LetterSelect(letter) => Some(Action::SelectLetter(letter)),
        }
    }

    /// Resolve a lone tap once the double-tap window has passed
    pub fn tick(&mut self, now_ms: u64) -> Option<Action> {
        match self.pending_tap {
            Some(first) if now_ms.saturating_sub(first) > DOUBLE_TAP_MS => {
                self.pending_tap = None;
                Some(Action::Play)
            }
            _ => None,
        }
    }

    /// Feed an event through to the controller. Any user gesture unlocks audio.
    pub fn handle<S: AudioSink, R: Rng + ?Sized>(
        &mut self,
        nav: &mut NavigationController<S>,
        event: InputEvent,
        now_ms: u64,
        rng: &mut R,
    ) {
        nav.unlock_audio();
        if let Some(action) = self.map_event(event, now_ms) {
            dispatch(nav, action, rng);
        }
    }
}

pub fn dispatch<S: AudioSink, R: Rng + ?Sized>(
    nav: &mut NavigationController<S>,
    action: Action,
    rng: &mut R,
) {
    debug!("Input action {:?}", action);
    match action {
        Action::Next => nav.next(),
        Action::Prev => nav.prev(),
        Action::Flip => nav.flip(),
        Action::CycleBackCard(direction) => nav.cycle_back_card(direction),
        Action::Shuffle => nav.shuffle(rng),
        Action::Reset => nav.reset(),
        Action::Play => nav.play_current(),
        Action::Preview(index) => nav.preview(index),
        Action::Commit(index) => nav.commit(index),
        Action::Store => {
            if let Some(stored) = nav.store_current(rng) {
                info!("Stored '{}' ({} in storage)", stored.word, nav.storage().len());
            }
        }
        Action::SelectLetter(letter) => nav.select_letter(letter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::audio::tests::RecordingSink;
    use crate::engine::audio::{AudioEngine, CACHE_CAPACITY};
    use crate::engine::store::WordStore;
    use crate::models::WordEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn nav(n: u32) -> NavigationController<RecordingSink> {
        let words = (1..=n)
            .map(|r| WordEntry {
                word: format!("w{}", r),
                rank: r,
                freq: r as f64,
                part_of_speech: None,
                word_audio_file: vec![format!("w{}.mp3", r)],
                back_cards: vec![],
                sentence_audio_file: vec![],
            })
            .collect();
        NavigationController::new(WordStore::new(words), AudioEngine::new(RecordingSink::default(), CACHE_CAPACITY))
    }

    #[test]
    fn test_swipes() {
        let mut input = InputAdapter::new();
        assert_eq!(input.map_event(InputEvent::Swipe(Swipe::Left), 0), Some(Action::Next));
        assert_eq!(input.map_event(InputEvent::Swipe(Swipe::Right), 0), Some(Action::Prev));
        assert_eq!(input.map_event(InputEvent::Swipe(Swipe::Up), 0), Some(Action::Store));
        assert_eq!(input.map_event(InputEvent::Swipe(Swipe::Down), 0), Some(Action::CycleBackCard(1)));
    }

    #[test]
    fn test_down_gestures_agree() {
        let mut input = InputAdapter::new();
        assert_eq!(
            input.map_event(InputEvent::Swipe(Swipe::Down), 0),
            input.map_event(InputEvent::Key(Key::ArrowDown), 0)
        );
    }

    #[test]
    fn test_double_tap_flips() {
        let mut input = InputAdapter::new();
        assert_eq!(input.map_event(InputEvent::Tap, 1000), None);
        assert_eq!(input.map_event(InputEvent::Tap, 1200), Some(Action::Flip));
        assert!(!input.has_pending_tap());
        assert_eq!(input.tick(2000), None);
    }

    #[test]
    fn test_single_tap_plays_after_window() {
        let mut input = InputAdapter::new();
        assert_eq!(input.map_event(InputEvent::Tap, 1000), None);
        assert_eq!(input.tick(1200), None);
        assert_eq!(input.tick(1301), Some(Action::Play));
        assert_eq!(input.tick(1400), None);
    }

    #[test]
    fn test_slow_taps_are_two_singles() {
        let mut input = InputAdapter::new();
        let mut plays = 0;
        for action in [
            input.map_event(InputEvent::Tap, 0),
            input.map_event(InputEvent::Tap, 500),
            input.tick(900),
        ] {
            if action == Some(Action::Play) {
                plays += 1;
            }
        }
        assert_eq!(plays, 2);
        assert!(!input.has_pending_tap());
    }

    #[test]
    fn test_other_event_drops_held_tap() {
        let mut input = InputAdapter::new();
        assert_eq!(input.map_event(InputEvent::Tap, 0), None);
        assert_eq!(input.map_event(InputEvent::Swipe(Swipe::Left), 100), Some(Action::Next));
        assert!(!input.has_pending_tap());
        assert_eq!(input.tick(1000), None);
    }

    #[test]
    fn test_swipe_up_stores_word() {
        let mut nav = nav(4);
        let mut input = InputAdapter::new();
        let mut rng = StdRng::seed_from_u64(0);
        input.handle(&mut nav, InputEvent::Swipe(Swipe::Up), 0, &mut rng);
        assert_eq!(nav.storage().len(), 1);
        assert_eq!(nav.state().word_index, 1);
    }

    #[test]
    fn test_letter_select() {
        let mut nav = nav(12);
        let mut input = InputAdapter::new();
        let mut rng = StdRng::seed_from_u64(0);
        input.handle(&mut nav, InputEvent::LetterSelect(Some('w')), 0, &mut rng);
        assert_eq!(nav.store().len(), 12);
        input.handle(&mut nav, InputEvent::LetterSelect(Some('x')), 0, &mut rng);
        assert!(nav.store().is_empty());
    }

    #[test]
    fn test_keyboard_mapping() {
        let mut input = InputAdapter::new();
        let key = |input: &mut InputAdapter, k| input.map_event(InputEvent::Key(k), 0);
        assert_eq!(key(&mut input, Key::ArrowRight), Some(Action::Next));
        assert_eq!(key(&mut input, Key::Char('p')), Some(Action::Prev));
        assert_eq!(key(&mut input, Key::Space), Some(Action::Flip));
        assert_eq!(key(&mut input, Key::ArrowDown), Some(Action::CycleBackCard(1)));
        assert_eq!(key(&mut input, Key::Char('s')), Some(Action::Shuffle));
        assert_eq!(key(&mut input, Key::Char('z')), None);
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse(""), Some(Key::Enter));
        assert_eq!(Key::parse("Right"), Some(Key::ArrowRight));
        assert_eq!(Key::parse("N"), Some(Key::Char('n')));
        assert_eq!(Key::parse("hello"), None);
    }

    #[test]
    fn test_first_gesture_unlocks_audio() {
        let mut nav = nav(5);
        let mut input = InputAdapter::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!nav.audio().is_unlocked());
        input.handle(&mut nav, InputEvent::Swipe(Swipe::Left), 0, &mut rng);
        assert!(nav.audio().is_unlocked());
        assert_eq!(nav.state().word_index, 1);
    }

    #[test]
    fn test_slider_preview_then_commit() {
        let mut nav = nav(10);
        let mut input = InputAdapter::new();
        let mut rng = StdRng::seed_from_u64(0);
        for i in 1..=6 {
            input.handle(&mut nav, InputEvent::SliderDrag(i), 0, &mut rng);
        }
        assert_eq!(nav.state().last_interacted, 0);
        input.handle(&mut nav, InputEvent::SliderRelease(6), 0, &mut rng);
        assert_eq!(nav.state().last_interacted, 6);
        assert_eq!(nav.state().word_index, 6);
    }
}
