//! Jukebox demo application
//!
//! Plays every audio file given on the command line as a looping music
//! track, crossfading to the next one every few seconds, and fires each file
//! as a sound effect from a different direction once per second.
//!
//! ```text
//! jukebox [--config audio.toml] <file>...
//! ```

use audio_engine::audio::backend::{create_backend, RodioBackend};
use audio_engine::audio::{AudioError, AudioSystem};
use audio_engine::config::{AudioConfig, Config, ConfigError};
use audio_engine::foundation::math::Vec2;
use clap::Parser;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

const FRAME_TIME: Duration = Duration::from_micros(16_667);
const TRACK_TIME: Duration = Duration::from_secs(8);
const CROSSFADE: Duration = Duration::from_secs(3);
const SOUND_INTERVAL: Duration = Duration::from_secs(1);

#[derive(thiserror::Error, Debug)]
enum JukeboxError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Crossfading jukebox demo
#[derive(Parser, Debug)]
#[command(name = "jukebox", version, about)]
struct Args {
    /// Audio configuration file (.toml or .ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Audio files to play as music and sound effects
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

struct Jukebox {
    audio: AudioSystem<RodioBackend>,
    tracks: Vec<String>,
    current: usize,
    track_started: Instant,
    last_sound: Instant,
    sound_angle: f32,
}

impl Jukebox {
    fn new(config: &AudioConfig, files: &[PathBuf]) -> Result<Self, JukeboxError> {
        let backend = create_backend(&config.backend)?;
        let mut audio = AudioSystem::new(backend, config)?;

        let mut tracks = Vec::new();
        for (index, file) in files.iter().enumerate() {
            let id = format!("track{index}");
            if let Err(e) = audio.load_sound_from_file(&id, file) {
                log::warn!("Skipping sound effect for {}: {}", file.display(), e);
            }
            audio.link_music_file(&id, file)?;
            tracks.push(id);
        }

        let now = Instant::now();
        Ok(Self {
            audio,
            tracks,
            current: 0,
            track_started: now,
            last_sound: now,
            sound_angle: 0.0,
        })
    }

    fn run(&mut self) -> Result<(), JukeboxError> {
        self.audio.play_music_default(&self.tracks[0])?;
        let total = TRACK_TIME * u32::try_from(self.tracks.len()).unwrap_or(u32::MAX);
        let start = Instant::now();

        while start.elapsed() < total {
            let frame_start = Instant::now();
            self.update();
            if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }

        self.audio.stop_all();
        Ok(())
    }

    fn update(&mut self) {
        if self.track_started.elapsed() >= TRACK_TIME && self.tracks.len() > 1 {
            self.current = (self.current + 1) % self.tracks.len();
            let id = &self.tracks[self.current];
            if let Err(e) = self.audio.play_music(id, CROSSFADE, 1.0) {
                log::error!("Could not switch to {}: {}", id, e);
            }
            self.track_started = Instant::now();
        }

        if self.last_sound.elapsed() >= SOUND_INTERVAL {
            let id = &self.tracks[self.current];
            let position = Vec2::new(self.sound_angle.cos(), self.sound_angle.sin()) * 2.0;
            match self.audio.play_sound_2d(id, position, 0.5) {
                Ok(voice) => log::debug!("Fired {} on voice {}", id, voice),
                Err(e) => log::debug!("Sound {} not played: {}", id, e),
            }
            self.sound_angle += std::f32::consts::FRAC_PI_4;
            self.last_sound = Instant::now();
        }

        self.audio.update();
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    log::info!("Starting jukebox demo");

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("Jukebox error: {}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }

    log::info!("Jukebox demo finished successfully");
}

fn run(args: &Args) -> Result<(), JukeboxError> {
    let config = match &args.config {
        Some(path) => AudioConfig::load_from_file(path)?,
        None => AudioConfig::default(),
    };
    log::info!(
        "Using {} voices, default fade {:?}",
        config.initial_voice_capacity,
        config.default_fade
    );

    let mut jukebox = Jukebox::new(&config, &args.files)?;
    jukebox.run()
}
