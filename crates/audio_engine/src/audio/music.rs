//! Music system
//!
//! Double-buffered music playback with a linear, wall-clock crossfade.
//!
//! Two persistent stream slots alternate between the *active* role (the
//! current track, fading in) and the *inactive* role (the previous track,
//! fading out). A switch flips the roles, opens the new track into the now
//! active slot at zero gain and restarts the fade clock. Every
//! [`MusicCrossfader::update`] then sets
//!
//! ```text
//! ratio    = elapsed / duration            (zero duration => complete)
//! active   = target * min(ratio, 1) * 100
//! inactive = previous * (1 - ratio)        while ratio <= 1
//!            stopped                       once ratio > 1
//! ```
//!
//! Because the ratio comes from a [`Clock`] rather than a frame count,
//! irregular update intervals are fine; a long gap simply makes the fade
//! jump ahead on the next update.

use crate::audio::asset::MusicSource;
use crate::audio::backend::MusicStream;
use crate::audio::{AudioError, SoundStatus};
use crate::foundation::math::utils::lerp;
use crate::foundation::time::{Clock, Stopwatch};
use std::time::Duration;

/// Where the crossfader is in a track transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeState {
    /// Nothing has ever been switched to
    Idle,
    /// The current track is still fading in
    FadingIn,
    /// The fade is over; the previous track is silenced
    SteadyState,
}

/// Transition parameters captured at the last switch
#[derive(Debug, Clone)]
struct FadeState {
    /// Track in the active slot; `None` until the first switch
    track: Option<MusicSource>,
    /// Base volume of the current track (0.0 to 1.0)
    base_volume: f32,
    /// Per-switch multiplier on top of the base volume
    volume_multiplier: f32,
    /// Gain (0-100) the previous track had when the switch happened
    previous_volume: f32,
    /// Fade length
    duration: Duration,
}

impl Default for FadeState {
    fn default() -> Self {
        Self {
            track: None,
            base_volume: 1.0,
            volume_multiplier: 1.0,
            previous_volume: 0.0,
            duration: Duration::ZERO,
        }
    }
}

/// Two-slot crossfading music player
pub struct MusicCrossfader<S, K = Stopwatch> {
    slots: [S; 2],
    active: usize,
    fade: FadeState,
    clock: K,
}

impl<S: MusicStream, K: Clock> MusicCrossfader<S, K> {
    /// Create a crossfader with two looping slots built by `make_stream`
    pub fn new(mut make_stream: impl FnMut() -> S, clock: K) -> Self {
        let mut slots = [make_stream(), make_stream()];
        for slot in &mut slots {
            slot.set_looping(true);
        }

        Self {
            slots,
            active: 0,
            fade: FadeState::default(),
            clock,
        }
    }

    /// Switch to a new track, crossfading from the current one
    ///
    /// # Arguments
    /// * `source` - Where to stream the new track from
    /// * `base_volume` - Base volume of the new track (0.0 to 1.0)
    /// * `duration` - Crossfade length; zero switches on the next update
    /// * `volume_multiplier` - Extra multiplier for this playback only
    ///
    /// # Errors
    /// `OpenFailed` or `MusicMemoryReleased` if the source cannot be opened.
    /// The slot roles have already flipped by then: the active slot is left
    /// stopped and the previous track fades out on the remaining clock of the
    /// last successful switch.
    pub fn switch_to(
        &mut self,
        source: MusicSource,
        base_volume: f32,
        duration: Duration,
        volume_multiplier: f32,
    ) -> Result<(), AudioError> {
        self.fade.previous_volume = self.slots[self.active].gain();
        self.active = Self::other(self.active);

        let description = source.describe();
        self.fade.base_volume = base_volume;
        self.fade.volume_multiplier = volume_multiplier;
        let track = self.fade.track.insert(source);

        let current = &mut self.slots[self.active];
        if current.status() == SoundStatus::Playing {
            current.stop();
        }
        if let Err(e) = track.open_into(current) {
            log::warn!("Failed to open music {}: {}", description, e);
            return Err(e);
        }

        current.set_gain(0.0);
        self.fade.duration = duration;
        current.play();
        self.clock.restart();

        log::info!("Switched music to {} (fade {:?})", description, duration);
        Ok(())
    }

    /// Restart the current track immediately, without a fade
    ///
    /// # Errors
    /// `NoMusicSelected` before the first switch, otherwise as [`Self::switch_to`].
    pub fn restart_current(&mut self) -> Result<(), AudioError> {
        let track = self.fade.track.clone().ok_or(AudioError::NoMusicSelected)?;
        self.switch_to(track, self.fade.base_volume, Duration::ZERO, self.fade.volume_multiplier)
    }

    /// Advance the crossfade (call once per frame)
    pub fn update(&mut self) {
        if self.fade.track.is_none() {
            return;
        }

        let ratio = self.fade_ratio();
        let target = self.fade.base_volume * self.fade.volume_multiplier * 100.0;
        let previous_volume = self.fade.previous_volume;

        self.slots[self.active].set_gain(lerp(0.0, target, ratio.min(1.0)));

        let previous = &mut self.slots[Self::other(self.active)];
        if ratio <= 1.0 {
            previous.set_gain(lerp(previous_volume, 0.0, ratio));
        } else if previous.status() == SoundStatus::Playing {
            previous.stop();
        }
    }

    /// Change the base volume of the current track
    ///
    /// Takes effect on the next update.
    pub fn set_base_volume(&mut self, base_volume: f32) {
        self.fade.base_volume = base_volume;
    }

    /// Pause the current track if it is playing
    pub fn pause(&mut self) {
        if self.status() == SoundStatus::Playing {
            self.slots[self.active].pause();
        }
    }

    /// Resume the current track if it is paused
    pub fn resume(&mut self) {
        if self.status() == SoundStatus::Paused {
            self.slots[self.active].play();
        }
    }

    /// Stop both slots
    pub fn stop(&mut self) {
        for slot in &mut self.slots {
            slot.stop();
        }
    }

    /// Status of the current track
    pub fn status(&self) -> SoundStatus {
        self.slots[self.active].status()
    }

    /// Playback position of the current track (zero when stopped)
    pub fn position(&self) -> Duration {
        if self.status() == SoundStatus::Stopped {
            return Duration::ZERO;
        }
        self.slots[self.active].playing_offset()
    }

    /// Where the crossfader is in the current transition
    pub fn state(&self) -> CrossfadeState {
        if self.fade.track.is_none() {
            CrossfadeState::Idle
        } else if self.clock.elapsed() < self.fade.duration {
            CrossfadeState::FadingIn
        } else {
            CrossfadeState::SteadyState
        }
    }

    /// Fade progress clamped to `[0, 1]`
    pub fn fade_progress(&self) -> f32 {
        self.fade_ratio().min(1.0)
    }

    /// Source of the current track
    pub fn current_source(&self) -> Option<&MusicSource> {
        self.fade.track.as_ref()
    }

    /// Slot playing (or fading in) the current track
    pub fn active_slot(&self) -> &S {
        &self.slots[self.active]
    }

    /// Slot holding the previous track
    pub fn inactive_slot(&self) -> &S {
        &self.slots[Self::other(self.active)]
    }

    /// Unclamped fade ratio; infinite for a zero-length fade
    fn fade_ratio(&self) -> f32 {
        if self.fade.duration.is_zero() {
            return f32::INFINITY;
        }
        self.clock.elapsed().as_secs_f32() / self.fade.duration.as_secs_f32()
    }

    const fn other(slot: usize) -> usize {
        1 - slot
    }
}
