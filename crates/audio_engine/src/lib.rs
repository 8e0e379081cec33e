//! # Audio Engine
//!
//! Game audio built around two small cores: a polyphonic sound-effect voice
//! pool and a two-slot music player with linear crossfades.
//!
//! ## Features
//!
//! - **Voice Pool**: Fixed number of effect channels, first idle voice wins, overflow is dropped
//! - **Crossfading Music**: Wall-clock linear fades between looping tracks
//! - **Identifier-based Assets**: Sounds and music registered by name with per-asset volume
//! - **Pluggable Backends**: rodio output or a device-free headless backend
//! - **TOML/RON Configuration**: Voice count, default fade, and output settings
//!
//! ## Quick Start
//!
//! The headless backend runs anywhere; swap in `create_backend` (feature
//! `rodio`) for real output.
//!
//! ```rust,no_run
//! use audio_engine::prelude::*;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     audio_engine::foundation::logging::init();
//!
//!     let config = AudioConfig::default();
//!     let mut audio = AudioSystem::new(HeadlessBackend::new(), &config)?;
//!
//!     audio.load_sound_from_file("laser", "assets/laser.wav")?;
//!     audio.link_music_file("theme", "assets/theme.ogg")?;
//!     audio.play_music("theme", Duration::from_secs(2), 1.0)?;
//!
//!     loop {
//!         audio.update();
//!         let _ = audio.play_sound("laser", 0.8);
//!         # break;
//!     }
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod config;
pub mod foundation;

/// Common imports for engine users
pub mod prelude {
    #[cfg(feature = "rodio")]
    pub use crate::audio::backend::{create_backend, RodioBackend};
    pub use crate::{
        audio::{
            backend::HeadlessBackend, AudioBackend, AudioError, AudioSystem, CrossfadeState, SoundPosition,
            SoundStatus,
        },
        config::{AudioConfig, Config},
        foundation::{
            math::{Vec2, Vec3},
            time::{Clock, ManualClock, Stopwatch},
        },
    };
}
