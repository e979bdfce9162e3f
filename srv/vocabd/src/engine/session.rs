use std::sync::Arc;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};
use crate::engine::audio::{spawn_loads, spawn_timers, AudioEngine, AudioLoader, AudioSink, LoadOutcome};
use crate::engine::cloud::WordSelected;
use crate::engine::input::{dispatch, InputAdapter, InputEvent, Key, Swipe};
use crate::engine::navigation::NavigationController;
use crate::engine::store::WordStore;
use crate::utils::parse_letter;

/// One flashcard session: the controller, its input adapter, and the
/// channels that bring audio loads and playback ends back onto the
/// session's task.
pub struct Session<S: AudioSink, L: AudioLoader> {
    nav: NavigationController<S>,
    input: InputAdapter,
    loader: Arc<L>,
    rng: StdRng,
    loads_tx: mpsc::UnboundedSender<LoadOutcome>,
    loads_rx: mpsc::UnboundedReceiver<LoadOutcome>,
    finished_tx: mpsc::UnboundedSender<u64>,
    finished_rx: mpsc::UnboundedReceiver<u64>,
    started: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub cache_capacity: usize,
    pub seed: Option<u64>,
}

impl<S: AudioSink, L: AudioLoader> Session<S, L> {
    pub fn new(store: WordStore, sink: S, loader: L, options: SessionOptions) -> Self {
        Self::starting_at(store, sink, loader, options, 0)
    }

    /// Open the deck on the word picked in the cloud
    pub fn from_selection(
        store: WordStore,
        selection: &WordSelected,
        sink: S,
        loader: L,
        options: SessionOptions,
    ) -> Self {
        info!("Starting session at '{}' (index {})", selection.word, selection.index);
        let mut session = Self::starting_at(store, sink, loader, options, selection.index);
        session.nav = session.nav.with_accent(&selection.color);
        session
    }

    fn starting_at(store: WordStore, sink: S, loader: L, options: SessionOptions, index: usize) -> Self {
        let audio = AudioEngine::new(sink, options.cache_capacity);
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        Self {
            nav: NavigationController::starting_at(store, audio, index),
            input: InputAdapter::new(),
            loader: Arc::new(loader),
            rng,
            loads_tx,
            loads_rx,
            finished_tx,
            finished_rx,
            started: Instant::now(),
        }
    }

    pub fn navigation(&self) -> &NavigationController<S> {
        &self.nav
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn handle(&mut self, event: InputEvent) {
        let now = self.now_ms();
        self.input.handle(&mut self.nav, event, now, &mut self.rng);
        self.flush_loads();
    }

    pub fn tick(&mut self) {
        if let Some(action) = self.input.tick(self.now_ms()) {
            dispatch(&mut self.nav, action, &mut self.rng);
            self.flush_loads();
        }
    }

    /// Start any loads and playback timers the controller queued
    pub fn flush_loads(&mut self) {
        let requests = self.nav.audio_mut().take_requests();
        if !requests.is_empty() {
            spawn_loads(&self.loader, requests, &self.loads_tx);
        }
        let timers = self.nav.audio_mut().take_timers();
        if !timers.is_empty() {
            spawn_timers(timers, &self.finished_tx);
        }
    }

    pub async fn next_load(&mut self) -> Option<LoadOutcome> {
        self.loads_rx.recv().await
    }

    pub async fn next_finished(&mut self) -> Option<u64> {
        self.finished_rx.recv().await
    }

    pub fn on_loaded(&mut self, outcome: LoadOutcome) {
        self.nav.on_loaded(outcome);
        self.flush_loads();
    }

    pub fn on_finished(&mut self, generation: u64) {
        self.nav.audio_mut().on_finished(generation);
    }

    fn print_card(&self) {
        match self.nav.view() {
            Some(view) => println!("{}", view),
            None => println!("No words to display."),
        }
        let storage = self.nav.storage();
        if !storage.is_empty() {
            let words: Vec<&str> = storage.words.iter().map(|w| w.word.as_str()).collect();
            println!("  stored: {}", words.join(" "));
        }
    }

    /// Drive the session from stdin until `q` or end of input
    pub async fn run_terminal(mut self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = time::interval(Duration::from_millis(50));

        self.flush_loads();
        self.print_card();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match parse_command(&line) {
                        Some(Command::Quit) => break,
                        Some(Command::Input(event)) => {
                            self.handle(event);
                            self.print_card();
                        }
                        None => warn!("Unknown command: {}", line.trim()),
                    }
                }
                Some(outcome) = self.loads_rx.recv() => self.on_loaded(outcome),
                Some(generation) = self.finished_rx.recv() => self.on_finished(generation),
                _ = ticker.tick() => {
                    if self.input.has_pending_tap() {
                        self.tick();
                    }
                }
            }
        }

        info!("Session finished");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Input(InputEvent),
}

/// Terminal command language: key names, `tap`, `swipe <dir>`,
/// `drag <n>` / `go <n>` (1-based), `letter <a-z|all>` and `q`.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next();

    let position = |arg: Option<&str>| -> Option<usize> {
        arg?.parse::<usize>().ok().map(|n| n.saturating_sub(1))
    };

    let event = match head.as_str() {
        "q" | "quit" => return Some(Command::Quit),
        "tap" => InputEvent::Tap,
        "swipe" => match arg?.to_lowercase().as_str() {
            "left" => InputEvent::Swipe(Swipe::Left),
            "right" => InputEvent::Swipe(Swipe::Right),
            "up" => InputEvent::Swipe(Swipe::Up),
            "down" => InputEvent::Swipe(Swipe::Down),
            _ => return None,
        },
        "drag" => InputEvent::SliderDrag(position(arg)?),
        "go" => InputEvent::SliderRelease(position(arg)?),
        "letter" => match arg? {
            "all" => InputEvent::LetterSelect(None),
            letter => InputEvent::LetterSelect(Some(parse_letter(letter)?)),
        },
        _ => InputEvent::Key(Key::parse(line)?),
    };
    Some(Command::Input(event))
}
