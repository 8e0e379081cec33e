//! Audio system
//!
//! Two independent playback cores composed by [`AudioSystem`]:
//!
//! ```text
//! AudioSystem
//!   ├── AssetStore<Buffer>        (sound id  -> decoded buffer + base volume)
//!   ├── AssetStore<MusicSource>   (music id  -> file path / linked memory + base volume)
//!   ├── VoicePool<Channel>        (N voices, first idle wins, saturation drops)
//!   └── MusicCrossfader<Stream>   (two slots, linear wall-clock crossfade)
//! ```
//!
//! Everything is single-threaded and frame-driven: call [`AudioSystem::update`]
//! once per frame from the thread that owns the system.

pub mod asset;
pub mod backend;
pub mod music;
pub mod spatial;
pub mod system;
pub mod voice_manager;

use std::path::PathBuf;
use thiserror::Error;

pub use asset::{AssetStore, AudioFormat, MusicSource};
pub use backend::{AudioBackend, AudioBackendConfig, MusicStream, PlaybackChannel};
pub use music::{CrossfadeState, MusicCrossfader};
pub use spatial::SoundPosition;
pub use system::AudioSystem;
pub use voice_manager::VoicePool;

/// Playback status shared by voices and music slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SoundStatus {
    /// Not playing; the channel is available
    #[default]
    Stopped,
    /// Paused mid-playback
    Paused,
    /// Playing
    Playing,
}

/// Audio system errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// Backend has not been initialized
    #[error("Audio backend not initialized")]
    BackendNotInitialized,

    /// Backend failed to open an output device
    #[error("Audio backend initialization failed: {0}")]
    BackendInitFailed(String),

    /// An asset with this identifier is already registered
    #[error("Audio asset already registered: {0}")]
    DuplicateId(String),

    /// No asset with this identifier is registered
    #[error("Unknown audio asset: {0}")]
    UnknownId(String),

    /// Audio bytes could not be decoded
    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    /// A music source could not be opened
    #[error("Failed to open music source {source_name}: {reason}")]
    OpenFailed {
        /// Path or description of the source
        source_name: String,
        /// Backend-provided reason
        reason: String,
    },

    /// The caller released the memory block a music track was linked to
    #[error("Linked music memory has been released")]
    MusicMemoryReleased,

    /// No music track has been selected yet
    #[error("No music track selected")]
    NoMusicSelected,

    /// Every voice is busy; the sound effect was dropped
    #[error("No idle voice available")]
    NoIdleVoice,

    /// File could not be read
    #[error("Failed to read audio file {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}
