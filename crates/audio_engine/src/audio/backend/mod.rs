//! Audio backend implementations
//!
//! Platform-independent abstraction over audio playback libraries. The
//! voice pool and the crossfader only ever talk to [`PlaybackChannel`] and
//! [`MusicStream`]; decoding and hardware output stay behind the backend.

pub mod headless;
#[cfg(feature = "rodio")]
pub mod rodio_backend;

use crate::audio::{AudioError, SoundStatus};
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use headless::HeadlessBackend;
#[cfg(feature = "rodio")]
pub use rodio_backend::RodioBackend;

/// Audio backend trait for platform abstraction
///
/// # Threading
/// Not required to be `Send + Sync`; the audio system is driven from a
/// single thread that owns the update loop.
pub trait AudioBackend {
    /// Decoded sound buffer, cheap to clone and share between voices
    type Buffer: Clone;

    /// One sound-effect playback channel
    type Channel: PlaybackChannel<Buffer = Self::Buffer>;

    /// One streamed music playback resource
    type Stream: MusicStream;

    /// Initialize the audio backend
    fn initialize(&mut self, config: &AudioBackendConfig) -> Result<(), AudioError>;

    /// Shutdown the audio backend
    fn shutdown(&mut self);

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;

    /// Decode a complete sound from encoded bytes
    fn decode_memory(&mut self, data: &[u8]) -> Result<Self::Buffer, AudioError>;

    /// Decode a complete sound from a file
    fn decode_file(&mut self, path: &Path) -> Result<Self::Buffer, AudioError>;

    /// Create an idle playback channel
    fn create_channel(&mut self) -> Self::Channel;

    /// Create a stopped music stream
    fn create_stream(&mut self) -> Self::Stream;
}

/// A single sound-effect playback channel
///
/// Gains use the 0-100 scale; callers convert from 0.0-1.0 multipliers.
pub trait PlaybackChannel {
    /// Buffer type this channel plays
    type Buffer;

    /// Bind a buffer for the next `play`
    fn bind(&mut self, buffer: &Self::Buffer);

    /// Set the gain (0-100)
    fn set_gain(&mut self, gain: f32);

    /// Current gain (0-100)
    fn gain(&self) -> f32;

    /// Set the spatial position
    fn set_position(&mut self, position: Vec3);

    /// Interpret the position relative to the listener instead of world space
    fn set_relative_to_listener(&mut self, relative: bool);

    /// Start (or resume) playback of the bound buffer
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Stop playback; the channel becomes available again
    fn stop(&mut self);

    /// Current playback status
    fn status(&self) -> SoundStatus;
}

/// A streamed music playback resource
///
/// Gains use the 0-100 scale.
pub trait MusicStream {
    /// Open a file for streaming, replacing whatever was open
    fn open_from_file(&mut self, path: &Path) -> Result<(), AudioError>;

    /// Open an encoded memory block for streaming, replacing whatever was open
    fn open_from_memory(&mut self, data: Arc<[u8]>) -> Result<(), AudioError>;

    /// Loop the stream when it reaches its end
    fn set_looping(&mut self, looping: bool);

    /// Set the gain (0-100)
    fn set_gain(&mut self, gain: f32);

    /// Current gain (0-100)
    fn gain(&self) -> f32;

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Stop playback and rewind
    fn stop(&mut self);

    /// Current playback status
    fn status(&self) -> SoundStatus;

    /// Playback position within the open source
    fn playing_offset(&self) -> Duration;
}

/// Configuration for audio backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioBackendConfig {
    /// Sample rate (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of output channels (1=mono, 2=stereo)
    pub channels: u16,
    /// Buffer size for audio processing
    pub buffer_size: usize,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            buffer_size: 4096,
        }
    }
}

/// Create and initialize the default audio backend for the platform
#[cfg(feature = "rodio")]
pub fn create_backend(config: &AudioBackendConfig) -> Result<RodioBackend, AudioError> {
    let mut backend = RodioBackend::new();
    backend.initialize(config)?;
    Ok(backend)
}
