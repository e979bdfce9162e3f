//! Pronunciation audio: a small FIFO cache of loaded clips and a player that
//! keeps at most one clip active.
//!
//! The engine itself never awaits anything. Loads are queued as
//! [`LoadRequest`]s, executed by the session driver through an
//! [`AudioLoader`], and reported back with [`AudioEngine::on_loaded`].
//! Every play request bumps a generation counter; a completion that arrives
//! for an older generation never starts playback. Playback end is reported
//! the same way: the sink tells how long a clip runs, the driver arms a
//! [`PlaybackTimer`] and hands its generation back to
//! [`AudioEngine::on_finished`].

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use crate::error::AudioError;

pub const CACHE_CAPACITY: usize = 5;

/// A loaded, playable audio file
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub id: String,
    pub data: Arc<[u8]>,
}

impl Clip {
    pub fn new(id: &str, data: Vec<u8>) -> Self {
        Self { id: id.to_string(), data: data.into() }
    }
}

#[derive(Debug)]
enum Slot {
    Pending,
    Ready(Clip),
}

/// Bounded cache keyed by audio file id. Eviction follows insertion order;
/// lookups never reorder entries.
#[derive(Debug)]
pub struct AudioCache {
    capacity: usize,
    order: VecDeque<String>,
    slots: HashMap<String, Slot>,
}

impl AudioCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            slots: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        matches!(self.slots.get(id), Some(Slot::Pending))
    }

    pub fn get(&self, id: &str) -> Option<&Clip> {
        match self.slots.get(id) {
            Some(Slot::Ready(clip)) => Some(clip),
            _ => None,
        }
    }

    /// Ids in eviction order, oldest first
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Reserve pending slots for the ids not cached yet and return them.
    /// Older entries are evicted first so the batch fits.
    pub fn preload(&mut self, ids: &[String]) -> Vec<String> {
        let mut batch: Vec<String> = Vec::new();
        for id in ids {
            if !self.contains(id) && !batch.contains(id) {
                batch.push(id.clone());
            }
        }
        batch.truncate(self.capacity);

        while !self.order.is_empty() && self.order.len() + batch.len() > self.capacity {
            self.evict_oldest();
        }

        for id in &batch {
            self.order.push_back(id.clone());
            self.slots.insert(id.clone(), Slot::Pending);
        }
        batch
    }

    /// Evict oldest entries until the cache is within capacity
    pub fn evict_if_needed(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            if let Some(id) = self.evict_oldest() {
                evicted.push(id);
            }
        }
        evicted
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let id = self.order.pop_front()?;
        self.slots.remove(&id);
        debug!("Evicted audio {} from cache", id);
        Some(id)
    }

    /// Store a loaded clip. Returns false when the slot was evicted meanwhile.
    pub fn fill(&mut self, clip: Clip) -> bool {
        match self.slots.get_mut(&clip.id) {
            Some(slot) => {
                *slot = Slot::Ready(clip);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) {
        if self.slots.remove(id).is_some() {
            self.order.retain(|x| x != id);
        }
    }
}

/// A load the driver should perform on behalf of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub id: String,
    /// Set when the load was triggered by a play request rather than a preload
    pub generation: Option<u64>,
}

/// Clip end the driver should report back for `generation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTimer {
    pub generation: u64,
    pub after: Duration,
}

/// Output device the engine plays clips through
pub trait AudioSink {
    /// Start `clip`, returning how long it will play when that is known
    fn start(&mut self, clip: &Clip) -> Result<Option<Duration>, AudioError>;
    fn stop(&mut self);
}

/// Bit rate assumed by [`LogSink`] to estimate clip length
pub const ASSUMED_BITRATE: u64 = 128_000;

/// Headless sink: playback is only reported in the log
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn start(&mut self, clip: &Clip) -> Result<Option<Duration>, AudioError> {
        info!("Playing {} ({} bytes)", clip.id, clip.data.len());
        let millis = clip.data.len() as u64 * 8 * 1000 / ASSUMED_BITRATE;
        Ok(Some(Duration::from_millis(millis)))
    }

    fn stop(&mut self) {
        debug!("Playback stopped");
    }
}

/// Fetches audio files by id
pub trait AudioLoader: Send + Sync + 'static {
    fn load(&self, id: &str) -> impl Future<Output = Result<Clip, AudioError>> + Send;
}

/// Reads audio from `{audio_dir}/{id}`
#[derive(Debug, Clone)]
pub struct FileAudioLoader {
    audio_dir: PathBuf,
}

impl FileAudioLoader {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self { audio_dir: audio_dir.into() }
    }
}

impl AudioLoader for FileAudioLoader {
    async fn load(&self, id: &str) -> Result<Clip, AudioError> {
        let path = self.audio_dir.join(id);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Clip::new(id, data)),
            Err(e) => Err(AudioError::Load {
                id: id.to_string(),
                reason: format!("{}: {}", path.display(), e),
            }),
        }
    }
}

/// Completion of a load started with [`spawn_loads`]
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: String,
    pub result: Result<Clip, AudioError>,
}

/// Run each request on the tokio runtime and report outcomes on `tx`.
/// There is no cancellation: a superseded load simply completes unreferenced.
pub fn spawn_loads<L: AudioLoader>(
    loader: &Arc<L>,
    requests: Vec<LoadRequest>,
    tx: &mpsc::UnboundedSender<LoadOutcome>,
) {
    for request in requests {
        let loader = Arc::clone(loader);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = loader.load(&request.id).await;
            // Receiver gone means the session ended
            let _ = tx.send(LoadOutcome { id: request.id, result });
        });
    }
}

/// Report each timer's generation on `tx` once its clip has run out
pub fn spawn_timers(timers: Vec<PlaybackTimer>, tx: &mpsc::UnboundedSender<u64>) {
    for timer in timers {
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timer.after).await;
            let _ = tx.send(timer.generation);
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlayTicket {
    generation: u64,
    id: String,
}

pub struct AudioEngine<S: AudioSink> {
    cache: AudioCache,
    sink: S,
    unlocked: bool,
    generation: u64,
    active: Option<PlayTicket>,
    waiting: Option<PlayTicket>,
    requests: Vec<LoadRequest>,
    timers: Vec<PlaybackTimer>,
}

impl<S: AudioSink> AudioEngine<S> {
    pub fn new(sink: S, capacity: usize) -> Self {
        Self {
            cache: AudioCache::new(capacity),
            sink,
            unlocked: false,
            generation: 0,
            active: None,
            waiting: None,
            requests: Vec::new(),
            timers: Vec::new(),
        }
    }

    pub fn cache(&self) -> &AudioCache {
        &self.cache
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// One-way latch flipped by the first user gesture. Returns true the first time.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        info!("Audio unlocked");
        true
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|t| t.id.as_str())
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Stop whatever is playing and forget any play still waiting on a load
    pub fn stop(&mut self) {
        if self.active.take().is_some() {
            self.sink.stop();
        }
        self.waiting = None;
    }

    /// Play `id`, interrupting the current clip. Suppressed until unlocked.
    /// Returns the generation assigned to this request.
    pub fn play(&mut self, id: &str) -> Option<u64> {
        if !self.unlocked {
            debug!("Audio locked, not playing {}", id);
            return None;
        }
        self.stop();
        self.generation += 1;
        let ticket = PlayTicket { generation: self.generation, id: id.to_string() };

        if let Some(clip) = self.cache.get(id).cloned() {
            self.start(&clip, ticket);
        } else {
            if !self.cache.contains(id) {
                for id in self.cache.preload(&[id.to_string()]) {
                    self.requests.push(LoadRequest { id, generation: Some(ticket.generation) });
                }
            }
            debug!("Audio {} not loaded yet, waiting (generation {})", id, ticket.generation);
            self.waiting = Some(ticket);
        }
        Some(self.generation)
    }

    fn start(&mut self, clip: &Clip, ticket: PlayTicket) {
        match self.sink.start(clip) {
            Ok(length) => {
                if let Some(after) = length {
                    self.timers.push(PlaybackTimer { generation: ticket.generation, after });
                }
                self.active = Some(ticket);
            }
            Err(e) => warn!("{}", e),
        }
    }

    /// Queue loads for the neighbourhood of the current card
    pub fn preload(&mut self, ids: &[String]) {
        for id in self.cache.preload(ids) {
            self.requests.push(LoadRequest { id, generation: None });
        }
    }

    pub fn take_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn take_timers(&mut self) -> Vec<PlaybackTimer> {
        std::mem::take(&mut self.timers)
    }

    pub fn on_loaded(&mut self, id: &str, result: Result<Clip, AudioError>) {
        match result {
            Ok(clip) => {
                if !self.cache.fill(clip.clone()) {
                    debug!("Audio {} loaded after eviction, dropped", id);
                }
                let current = self
                    .waiting
                    .as_ref()
                    .is_some_and(|t| t.id == id && t.generation == self.generation);
                if current {
                    if let Some(ticket) = self.waiting.take() {
                        self.start(&clip, ticket);
                    }
                }
            }
            Err(e) => {
                warn!("{}", e);
                self.cache.remove(id);
                if self.waiting.as_ref().is_some_and(|t| t.id == id) {
                    self.waiting = None;
                }
            }
        }
    }

    /// The sink finished a clip. Stale generations are ignored.
    pub fn on_finished(&mut self, generation: u64) {
        if self.active.as_ref().is_some_and(|t| t.generation == generation) {
            debug!("Playback of generation {} finished", generation);
            self.active = None;
        }
    }
}
