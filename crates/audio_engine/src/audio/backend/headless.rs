//! Device-free audio backend
//!
//! Keeps the full channel/stream state machine (status, gain, position,
//! open source) without touching an output device. Sounds never finish on
//! their own; use [`HeadlessChannel::finish`] to simulate the end of a
//! sound. Useful for dedicated servers, CI, and tests.

use super::{AudioBackend, AudioBackendConfig, MusicStream, PlaybackChannel};
use crate::audio::{AudioError, AudioFormat, SoundStatus};
use crate::foundation::math::Vec3;
use crate::foundation::time::Stopwatch;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Validated, still-encoded sound data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessBuffer {
    data: Arc<[u8]>,
    format: AudioFormat,
}

impl HeadlessBuffer {
    /// Container format detected at decode time
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Encoded byte length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Backend that tracks playback state without producing sound
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    initialized: bool,
    config: AudioBackendConfig,
}

impl HeadlessBackend {
    /// Create a new, uninitialized headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration passed at initialization
    pub fn config(&self) -> &AudioBackendConfig {
        &self.config
    }

    fn validate(data: &[u8]) -> Result<AudioFormat, AudioError> {
        if data.is_empty() {
            return Err(AudioError::DecodeFailed("Empty audio data".to_string()));
        }
        let format = AudioFormat::detect(data);
        if !format.is_known() {
            return Err(AudioError::DecodeFailed("Unknown audio format".to_string()));
        }
        Ok(format)
    }
}

impl AudioBackend for HeadlessBackend {
    type Buffer = HeadlessBuffer;
    type Channel = HeadlessChannel;
    type Stream = HeadlessStream;

    fn initialize(&mut self, config: &AudioBackendConfig) -> Result<(), AudioError> {
        if !self.initialized {
            self.config = config.clone();
            self.initialized = true;
            log::info!("Headless audio backend initialized");
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.initialized {
            self.initialized = false;
            log::info!("Headless audio backend shutdown");
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn decode_memory(&mut self, data: &[u8]) -> Result<HeadlessBuffer, AudioError> {
        if !self.initialized {
            return Err(AudioError::BackendNotInitialized);
        }
        let format = Self::validate(data)?;
        Ok(HeadlessBuffer {
            data: Arc::from(data),
            format,
        })
    }

    fn decode_file(&mut self, path: &Path) -> Result<HeadlessBuffer, AudioError> {
        let data = std::fs::read(path).map_err(|source| AudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode_memory(&data)
    }

    fn create_channel(&mut self) -> HeadlessChannel {
        HeadlessChannel::default()
    }

    fn create_stream(&mut self) -> HeadlessStream {
        HeadlessStream::default()
    }
}

/// Headless sound-effect channel
#[derive(Debug, Clone)]
pub struct HeadlessChannel {
    buffer: Option<HeadlessBuffer>,
    status: SoundStatus,
    gain: f32,
    position: Vec3,
    relative: bool,
}

impl Default for HeadlessChannel {
    fn default() -> Self {
        Self {
            buffer: None,
            status: SoundStatus::Stopped,
            gain: 100.0,
            position: Vec3::zeros(),
            relative: false,
        }
    }
}

impl HeadlessChannel {
    /// Buffer currently bound to this channel
    pub fn bound(&self) -> Option<&HeadlessBuffer> {
        self.buffer.as_ref()
    }

    /// Last position set on this channel
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether the position is listener-relative
    pub fn is_relative_to_listener(&self) -> bool {
        self.relative
    }

    /// Simulate the bound sound reaching its end
    pub fn finish(&mut self) {
        self.status = SoundStatus::Stopped;
    }
}

impl PlaybackChannel for HeadlessChannel {
    type Buffer = HeadlessBuffer;

    fn bind(&mut self, buffer: &HeadlessBuffer) {
        self.status = SoundStatus::Stopped;
        self.buffer = Some(buffer.clone());
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn gain(&self) -> f32 {
        self.gain
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_relative_to_listener(&mut self, relative: bool) {
        self.relative = relative;
    }

    fn play(&mut self) {
        if self.buffer.is_some() {
            self.status = SoundStatus::Playing;
        }
    }

    fn pause(&mut self) {
        if self.status == SoundStatus::Playing {
            self.status = SoundStatus::Paused;
        }
    }

    fn stop(&mut self) {
        self.status = SoundStatus::Stopped;
    }

    fn status(&self) -> SoundStatus {
        self.status
    }
}

/// Headless music stream
#[derive(Debug, Clone)]
pub struct HeadlessStream {
    opened: Option<String>,
    status: SoundStatus,
    gain: f32,
    looping: bool,
    offset: Stopwatch,
}

impl Default for HeadlessStream {
    fn default() -> Self {
        Self {
            opened: None,
            status: SoundStatus::Stopped,
            gain: 100.0,
            looping: false,
            offset: Stopwatch::new(),
        }
    }
}

impl HeadlessStream {
    /// Description of the currently open source
    ///
    /// Files are described by their path, memory blocks as `memory:<len>`.
    pub fn opened_source(&self) -> Option<&str> {
        self.opened.as_deref()
    }

    /// Whether the stream loops
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    fn open_validated(&mut self, description: String, header: &[u8]) -> Result<(), AudioError> {
        self.stop();
        if !AudioFormat::detect(header).is_known() {
            return Err(AudioError::OpenFailed {
                source_name: description,
                reason: "Unknown audio format".to_string(),
            });
        }
        self.opened = Some(description);
        Ok(())
    }
}

impl MusicStream for HeadlessStream {
    fn open_from_file(&mut self, path: &Path) -> Result<(), AudioError> {
        let description = path.display().to_string();
        match std::fs::read(path) {
            Ok(data) => self.open_validated(description, &data),
            Err(e) => {
                self.stop();
                Err(AudioError::OpenFailed {
                    source_name: description,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn open_from_memory(&mut self, data: Arc<[u8]>) -> Result<(), AudioError> {
        self.open_validated(format!("memory:{}", data.len()), &data)
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn gain(&self) -> f32 {
        self.gain
    }

    fn play(&mut self) {
        if self.opened.is_some() {
            self.status = SoundStatus::Playing;
            self.offset.start();
        }
    }

    fn pause(&mut self) {
        if self.status == SoundStatus::Playing {
            self.status = SoundStatus::Paused;
            self.offset.stop();
        }
    }

    fn stop(&mut self) {
        self.status = SoundStatus::Stopped;
        self.offset.reset();
    }

    fn status(&self) -> SoundStatus {
        self.status
    }

    fn playing_offset(&self) -> Duration {
        self.offset.elapsed()
    }
}
