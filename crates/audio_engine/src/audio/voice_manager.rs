//! Voice management system
//!
//! Fixed-capacity pool of sound-effect channels ("voices"). A trigger takes
//! the first idle voice in index order. When every voice is busy the new
//! sound is dropped: no queueing and no stealing, so sounds that are already
//! playing are never cut off.

use crate::audio::backend::PlaybackChannel;
use crate::audio::SoundStatus;
use crate::foundation::math::Vec3;

/// Pool of preallocated playback channels
pub struct VoicePool<C> {
    voices: Vec<C>,
}

impl<C: PlaybackChannel> VoicePool<C> {
    /// Create a pool of `capacity` voices built by `make_voice`
    pub fn with_capacity(capacity: usize, make_voice: impl FnMut() -> C) -> Self {
        let mut voices = Vec::with_capacity(capacity);
        voices.resize_with(capacity, make_voice);
        Self { voices }
    }

    /// Start `buffer` on the first idle voice
    ///
    /// # Arguments
    /// * `buffer` - Decoded sound to play
    /// * `position` - Listener-relative position
    /// * `volume` - Gain multiplier (0.0 to 1.0, scaled to the backend's 0-100)
    ///
    /// # Returns
    /// Index of the voice that started, or `None` if every voice is busy.
    /// A rejected trigger leaves every voice untouched.
    pub fn trigger(&mut self, buffer: &C::Buffer, position: Vec3, volume: f32) -> Option<usize> {
        let index = self
            .voices
            .iter()
            .position(|voice| voice.status() == SoundStatus::Stopped)?;

        let voice = &mut self.voices[index];
        voice.bind(buffer);
        voice.set_gain(volume * 100.0);
        voice.set_position(position);
        voice.set_relative_to_listener(true);
        voice.play();
        Some(index)
    }

    /// Stop every voice regardless of its status
    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Grow or shrink the pool
    ///
    /// Shrinking stops and drops the trailing voices along with whatever
    /// they were playing. Growing appends idle voices built by `make_voice`.
    pub fn resize_with(&mut self, capacity: usize, make_voice: impl FnMut() -> C) {
        if capacity < self.voices.len() {
            for voice in &mut self.voices[capacity..] {
                voice.stop();
            }
        }
        self.voices.resize_with(capacity, make_voice);
        log::debug!("Voice pool resized to {} voices", capacity);
    }

    /// Total number of voices
    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    /// Number of voices currently playing (paused voices excluded)
    pub fn playing_count(&self) -> usize {
        self.count_with(SoundStatus::Playing)
    }

    /// Number of voices available for a trigger
    pub fn idle_count(&self) -> usize {
        self.count_with(SoundStatus::Stopped)
    }

    /// Check if a trigger would succeed
    pub fn has_idle_voice(&self) -> bool {
        self.voices.iter().any(|voice| voice.status() == SoundStatus::Stopped)
    }

    /// Voice at `index`
    pub fn voice(&self, index: usize) -> Option<&C> {
        self.voices.get(index)
    }

    /// Mutable voice at `index`
    pub fn voice_mut(&mut self, index: usize) -> Option<&mut C> {
        self.voices.get_mut(index)
    }

    /// All voices in index order
    pub fn voices(&self) -> impl Iterator<Item = &C> {
        self.voices.iter()
    }

    fn count_with(&self, status: SoundStatus) -> usize {
        self.voices.iter().filter(|voice| voice.status() == status).count()
    }
}
