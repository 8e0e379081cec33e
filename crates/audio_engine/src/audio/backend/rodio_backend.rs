//! Rodio audio backend implementation
//!
//! Uses the Rodio library for cross-platform audio playback.
//! Rodio is pure Rust and supports WAV, OGG Vorbis, MP3, and FLAC formats.
//!
//! Sound effects play on [`SpatialSink`]s with the listener fixed at the
//! origin, so every position is effectively listener-relative. Music plays on
//! plain [`Sink`]s and is decoded while streaming.
//!
//! # Example
//!
//! ```no_run
//! use audio_engine::audio::backend::{AudioBackend, AudioBackendConfig, PlaybackChannel};
//! use audio_engine::audio::backend::rodio_backend::RodioBackend;
//!
//! let mut backend = RodioBackend::new();
//! backend.initialize(&AudioBackendConfig::default()).unwrap();
//!
//! let data = std::fs::read("resources/audio/laser.wav").unwrap();
//! let buffer = backend.decode_memory(&data).unwrap();
//!
//! let mut channel = backend.create_channel();
//! channel.bind(&buffer);
//! channel.set_gain(50.0);
//! channel.play();
//! ```

use super::{AudioBackend, AudioBackendConfig, MusicStream, PlaybackChannel};
use crate::audio::{AudioError, SoundStatus};
use crate::foundation::math::Vec3;
use crate::foundation::time::Stopwatch;
use rodio::buffer::SamplesBuffer;
use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source, SpatialSink};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Ear positions around the listener at the origin
const LEFT_EAR: [f32; 3] = [-0.1, 0.0, 0.0];
const RIGHT_EAR: [f32; 3] = [0.1, 0.0, 0.0];

fn to_array(position: Vec3) -> [f32; 3] {
    [position.x, position.y, position.z]
}

/// Fully decoded sound, shared between every voice that plays it
///
/// Clones share the buffered frames, so triggering a sound never copies
/// its samples.
#[derive(Clone)]
pub struct RodioSoundBuffer {
    channels: u16,
    sample_rate: u32,
    sample_count: usize,
    source: Buffered<SamplesBuffer<i16>>,
}

impl RodioSoundBuffer {
    fn decode<R>(reader: R) -> Result<Self, AudioError>
    where
        R: std::io::Read + std::io::Seek + Send + Sync + 'static,
    {
        let decoder = Decoder::new(reader)
            .map_err(|e| AudioError::DecodeFailed(format!("Failed to decode audio: {}", e)))?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<i16> = decoder.collect();

        if samples.is_empty() {
            return Err(AudioError::DecodeFailed("Audio contains no samples".to_string()));
        }

        Ok(Self {
            channels,
            sample_rate,
            sample_count: samples.len(),
            source: SamplesBuffer::new(channels, sample_rate, samples).buffered(),
        })
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback length
    pub fn duration(&self) -> Duration {
        let frames = self.sample_count as f64 / f64::from(self.channels.max(1));
        Duration::from_secs_f64(frames / f64::from(self.sample_rate.max(1)))
    }

    fn to_source(&self) -> Buffered<SamplesBuffer<i16>> {
        self.source.clone()
    }
}

impl std::fmt::Debug for RodioSoundBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundBuffer")
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("sample_count", &self.sample_count)
            .finish_non_exhaustive()
    }
}

/// Rodio-based audio backend
pub struct RodioBackend {
    /// Audio output stream (must be kept alive)
    _output_stream: Option<OutputStream>,
    /// Output stream handle for creating sinks
    stream_handle: Option<OutputStreamHandle>,
    /// Initialization state
    initialized: bool,
}

impl RodioBackend {
    /// Create a new Rodio backend
    pub fn new() -> Self {
        Self {
            _output_stream: None,
            stream_handle: None,
            initialized: false,
        }
    }

    fn require_initialized(&self) -> Result<(), AudioError> {
        if self.initialized {
            Ok(())
        } else {
            Err(AudioError::BackendNotInitialized)
        }
    }
}

impl AudioBackend for RodioBackend {
    type Buffer = RodioSoundBuffer;
    type Channel = RodioChannel;
    type Stream = RodioMusicStream;

    fn initialize(&mut self, _config: &AudioBackendConfig) -> Result<(), AudioError> {
        if self.initialized {
            return Ok(());
        }

        // Create output stream
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::BackendInitFailed(format!("Failed to create audio output: {}", e)))?;

        self._output_stream = Some(stream);
        self.stream_handle = Some(stream_handle);
        self.initialized = true;

        log::info!("Rodio audio backend initialized");
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }

        // Drop stream handle and output
        self.stream_handle = None;
        self._output_stream = None;
        self.initialized = false;

        log::info!("Rodio audio backend shutdown");
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn decode_memory(&mut self, data: &[u8]) -> Result<RodioSoundBuffer, AudioError> {
        self.require_initialized()?;
        RodioSoundBuffer::decode(Cursor::new(data.to_vec()))
    }

    fn decode_file(&mut self, path: &Path) -> Result<RodioSoundBuffer, AudioError> {
        self.require_initialized()?;
        let file = File::open(path).map_err(|source| AudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        RodioSoundBuffer::decode(BufReader::new(file))
    }

    fn create_channel(&mut self) -> RodioChannel {
        RodioChannel::new(self.stream_handle.clone())
    }

    fn create_stream(&mut self) -> RodioMusicStream {
        RodioMusicStream::new(self.stream_handle.clone())
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sound-effect channel backed by a spatial sink
///
/// A fresh sink is created on every start; stopping drops it.
pub struct RodioChannel {
    stream_handle: Option<OutputStreamHandle>,
    sink: Option<SpatialSink>,
    buffer: Option<RodioSoundBuffer>,
    gain: f32,
    position: Vec3,
    relative: bool,
}

impl RodioChannel {
    fn new(stream_handle: Option<OutputStreamHandle>) -> Self {
        Self {
            stream_handle,
            sink: None,
            buffer: None,
            gain: 100.0,
            position: Vec3::zeros(),
            relative: false,
        }
    }

    fn start(&mut self) -> Result<(), AudioError> {
        let stream_handle = self.stream_handle.as_ref().ok_or(AudioError::BackendNotInitialized)?;
        let Some(buffer) = self.buffer.as_ref() else {
            return Ok(());
        };

        let sink = SpatialSink::try_new(stream_handle, to_array(self.position), LEFT_EAR, RIGHT_EAR)
            .map_err(|e| AudioError::BackendInitFailed(format!("Failed to create sink: {}", e)))?;
        sink.set_volume(self.gain / 100.0);
        sink.append(buffer.to_source());
        self.sink = Some(sink);
        Ok(())
    }

    /// Whether the position is listener-relative
    ///
    /// The listener never moves in this backend, so both modes sound the same.
    pub fn is_relative_to_listener(&self) -> bool {
        self.relative
    }
}

impl PlaybackChannel for RodioChannel {
    type Buffer = RodioSoundBuffer;

    fn bind(&mut self, buffer: &RodioSoundBuffer) {
        self.stop();
        self.buffer = Some(buffer.clone());
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        if let Some(sink) = &self.sink {
            sink.set_volume(gain / 100.0);
        }
    }

    fn gain(&self) -> f32 {
        self.gain
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        if let Some(sink) = &self.sink {
            sink.set_emitter_position(to_array(position));
        }
    }

    fn set_relative_to_listener(&mut self, relative: bool) {
        self.relative = relative;
    }

    fn play(&mut self) {
        match self.status() {
            SoundStatus::Playing => {}
            SoundStatus::Paused => {
                if let Some(sink) = &self.sink {
                    sink.play();
                }
            }
            SoundStatus::Stopped => {
                if let Err(e) = self.start() {
                    log::warn!("Sound channel could not start: {}", e);
                }
            }
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn status(&self) -> SoundStatus {
        match &self.sink {
            None => SoundStatus::Stopped,
            Some(sink) if sink.empty() => SoundStatus::Stopped,
            Some(sink) if sink.is_paused() => SoundStatus::Paused,
            Some(_) => SoundStatus::Playing,
        }
    }
}

/// Source a music stream was opened from
#[derive(Debug, Clone)]
enum OpenedMusic {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl OpenedMusic {
    fn decoder(&self) -> Result<Box<dyn Source<Item = i16> + Send>, AudioError> {
        let source: Box<dyn Source<Item = i16> + Send> = match self {
            Self::File(path) => {
                let file = File::open(path).map_err(|e| Self::open_failed(path.display(), e))?;
                let decoder = Decoder::new(BufReader::new(file))
                    .map_err(|e| Self::open_failed(path.display(), e))?;
                Box::new(decoder)
            }
            Self::Memory(data) => {
                let decoder = Decoder::new(Cursor::new(Arc::clone(data)))
                    .map_err(|e| Self::open_failed("<memory>", e))?;
                Box::new(decoder)
            }
        };
        Ok(source)
    }

    fn open_failed(source_name: impl std::fmt::Display, reason: impl std::fmt::Display) -> AudioError {
        AudioError::OpenFailed {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Streamed music on a rodio sink
///
/// Opening validates the source by constructing a decoder; every start
/// (after open or stop) decodes from the beginning again.
pub struct RodioMusicStream {
    stream_handle: Option<OutputStreamHandle>,
    opened: Option<OpenedMusic>,
    total_duration: Option<Duration>,
    sink: Option<Sink>,
    looping: bool,
    gain: f32,
    offset: Stopwatch,
}

impl RodioMusicStream {
    fn new(stream_handle: Option<OutputStreamHandle>) -> Self {
        Self {
            stream_handle,
            opened: None,
            total_duration: None,
            sink: None,
            looping: false,
            gain: 100.0,
            offset: Stopwatch::new(),
        }
    }

    fn open(&mut self, opened: OpenedMusic) -> Result<(), AudioError> {
        self.stop();
        let decoder = opened.decoder()?;
        self.total_duration = decoder.total_duration();
        self.opened = Some(opened);
        Ok(())
    }

    fn start(&mut self) -> Result<(), AudioError> {
        let stream_handle = self.stream_handle.as_ref().ok_or(AudioError::BackendNotInitialized)?;
        let Some(opened) = self.opened.as_ref() else {
            return Ok(());
        };

        let source = opened.decoder()?;
        let sink = Sink::try_new(stream_handle)
            .map_err(|e| AudioError::BackendInitFailed(format!("Failed to create sink: {}", e)))?;
        sink.set_volume(self.gain / 100.0);
        if self.looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        self.sink = Some(sink);
        self.offset.restart();
        Ok(())
    }
}

impl MusicStream for RodioMusicStream {
    fn open_from_file(&mut self, path: &Path) -> Result<(), AudioError> {
        self.open(OpenedMusic::File(path.to_path_buf()))
    }

    fn open_from_memory(&mut self, data: Arc<[u8]>) -> Result<(), AudioError> {
        self.open(OpenedMusic::Memory(data))
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        if let Some(sink) = &self.sink {
            sink.set_volume(gain / 100.0);
        }
    }

    fn gain(&self) -> f32 {
        self.gain
    }

    fn play(&mut self) {
        match self.status() {
            SoundStatus::Playing => {}
            SoundStatus::Paused => {
                if let Some(sink) = &self.sink {
                    sink.play();
                    self.offset.start();
                }
            }
            SoundStatus::Stopped => {
                if let Err(e) = self.start() {
                    log::warn!("Music stream could not start: {}", e);
                }
            }
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
            self.offset.stop();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.offset.reset();
    }

    fn status(&self) -> SoundStatus {
        match &self.sink {
            None => SoundStatus::Stopped,
            Some(sink) if sink.empty() => SoundStatus::Stopped,
            Some(sink) if sink.is_paused() => SoundStatus::Paused,
            Some(_) => SoundStatus::Playing,
        }
    }

    fn playing_offset(&self) -> Duration {
        let elapsed = self.offset.elapsed();
        match self.total_duration {
            Some(total) if self.looping && !total.is_zero() => {
                let wrapped = elapsed.as_nanos() % total.as_nanos();
                Duration::from_nanos(u64::try_from(wrapped).unwrap_or(u64::MAX))
            }
            _ => elapsed,
        }
    }
}
