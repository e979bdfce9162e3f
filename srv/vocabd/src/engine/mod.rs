//! Headless flashcard engine: deck navigation, audio caching, card
//! rendering, the word cloud intro, the storage box and input handling.

pub mod audio;
pub mod cloud;
pub mod input;
pub mod navigation;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;

pub use audio::{AudioEngine, AudioLoader, AudioSink, FileAudioLoader, LogSink, CACHE_CAPACITY};
pub use cloud::{CloudLayout, WordSelected};
pub use navigation::{NavigationController, NavigationState};
pub use session::{Session, SessionOptions};
pub use storage::StorageBox;
pub use store::WordStore;
