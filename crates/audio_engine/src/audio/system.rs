//! Audio facade
//!
//! Resolves string identifiers to decoded buffers and music sources, applies
//! per-asset base volumes, and delegates to the voice pool and the music
//! crossfader.

use crate::audio::asset::{AssetStore, MusicSource};
use crate::audio::backend::AudioBackend;
use crate::audio::music::{CrossfadeState, MusicCrossfader};
use crate::audio::spatial::SoundPosition;
use crate::audio::voice_manager::VoicePool;
use crate::audio::{AudioError, SoundStatus};
use crate::config::AudioConfig;
use crate::foundation::math::Vec2;
use crate::foundation::time::{Clock, Stopwatch};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Sound effects and crossfading music behind one identifier-based API
///
/// # Example
///
/// ```
/// use audio_engine::audio::{AudioSystem, backend::HeadlessBackend};
/// use audio_engine::config::AudioConfig;
///
/// let mut audio = AudioSystem::new(HeadlessBackend::new(), &AudioConfig::default()).unwrap();
/// audio.load_sound_from_memory("blip", b"RIFF\0\0\0\0WAVE").unwrap();
/// audio.play_sound("blip", 1.0).unwrap();
/// audio.update();
/// assert_eq!(audio.sounds_playing(), 1);
/// ```
pub struct AudioSystem<B: AudioBackend, C: Clock = Stopwatch> {
    backend: B,
    sounds: AssetStore<B::Buffer>,
    music: AssetStore<MusicSource>,
    voices: VoicePool<B::Channel>,
    crossfader: MusicCrossfader<B::Stream, C>,
    current_music: Option<String>,
    default_fade: Duration,
}

impl<B: AudioBackend> AudioSystem<B, Stopwatch> {
    /// Initialize `backend` and build the voice pool and music slots
    ///
    /// # Errors
    /// Whatever the backend reports from initialization.
    pub fn new(backend: B, config: &AudioConfig) -> Result<Self, AudioError> {
        Self::with_clock(backend, config, Stopwatch::start_new())
    }
}

impl<B: AudioBackend, C: Clock> AudioSystem<B, C> {
    /// Like [`AudioSystem::new`] with a custom fade clock
    ///
    /// # Errors
    /// Whatever the backend reports from initialization.
    pub fn with_clock(mut backend: B, config: &AudioConfig, clock: C) -> Result<Self, AudioError> {
        backend.initialize(&config.backend)?;

        let voices = VoicePool::with_capacity(config.initial_voice_capacity, || backend.create_channel());
        let crossfader = MusicCrossfader::new(|| backend.create_stream(), clock);

        log::info!(
            "Audio system ready with {} voices",
            config.initial_voice_capacity
        );

        Ok(Self {
            backend,
            sounds: AssetStore::new(),
            music: AssetStore::new(),
            voices,
            crossfader,
            current_music: None,
            default_fade: config.default_fade,
        })
    }

    /// Advance the music crossfade (call once per frame)
    pub fn update(&mut self) {
        self.crossfader.update();
    }

    // Sound registration

    /// Decode a sound file and register it under `id`
    ///
    /// # Errors
    /// `DuplicateId`, `Io`, or `DecodeFailed`. Nothing is registered on failure.
    pub fn load_sound_from_file(&mut self, id: &str, path: impl AsRef<Path>) -> Result<(), AudioError> {
        self.ensure_sound_free(id)?;
        let buffer = self.backend.decode_file(path.as_ref())?;
        self.register_sound(id, buffer)
    }

    /// Decode encoded sound bytes and register them under `id`
    ///
    /// # Errors
    /// `DuplicateId` or `DecodeFailed`. Nothing is registered on failure.
    pub fn load_sound_from_memory(&mut self, id: &str, data: &[u8]) -> Result<(), AudioError> {
        self.ensure_sound_free(id)?;
        let buffer = self.backend.decode_memory(data)?;
        self.register_sound(id, buffer)
    }

    /// Read a complete encoded sound from `reader` and register it under `id`
    ///
    /// # Errors
    /// `DuplicateId`, `Io` (read failure), or `DecodeFailed`.
    pub fn load_sound_from_reader(&mut self, id: &str, mut reader: impl Read) -> Result<(), AudioError> {
        self.ensure_sound_free(id)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(|source| AudioError::Io {
            path: PathBuf::from(format!("<reader:{id}>")),
            source,
        })?;
        let buffer = self.backend.decode_memory(&data)?;
        self.register_sound(id, buffer)
    }

    /// Register an already decoded buffer under `id`
    ///
    /// # Errors
    /// `DuplicateId` if the identifier is taken.
    pub fn insert_sound_buffer(&mut self, id: &str, buffer: B::Buffer) -> Result<(), AudioError> {
        self.register_sound(id, buffer)
    }

    // Music registration

    /// Register a music file to be streamed from disk
    ///
    /// The file is only opened when the track is played.
    ///
    /// # Errors
    /// `DuplicateId` if the identifier is taken; the original source is kept.
    pub fn link_music_file(&mut self, id: &str, path: impl Into<PathBuf>) -> Result<(), AudioError> {
        self.music.insert(id, MusicSource::File(path.into()))?;
        log::debug!("Linked music '{}' to file", id);
        Ok(())
    }

    /// Register a caller-owned memory block to be streamed
    ///
    /// Only a weak reference is kept. The caller must hold on to `block` for
    /// as long as the track may be played; once it is dropped, playing the
    /// track fails with [`AudioError::MusicMemoryReleased`].
    ///
    /// # Errors
    /// `DuplicateId` if the identifier is taken; the original source is kept.
    pub fn link_music_memory(&mut self, id: &str, block: &Arc<[u8]>) -> Result<(), AudioError> {
        self.music.insert(id, MusicSource::linked(block))?;
        log::debug!("Linked music '{}' to {} bytes of memory", id, block.len());
        Ok(())
    }

    // Sound effects

    /// Play a sound on the listener
    ///
    /// # Returns
    /// Index of the voice that took the sound.
    ///
    /// # Errors
    /// `UnknownId`, or `NoIdleVoice` when every voice is busy (the sound is dropped).
    pub fn play_sound(&mut self, id: &str, volume: f32) -> Result<usize, AudioError> {
        self.play_sound_at(id, SoundPosition::Listener, volume)
    }

    /// Play a sound at a listener-relative position
    ///
    /// # Errors
    /// `UnknownId` or `NoIdleVoice`.
    pub fn play_sound_at(
        &mut self,
        id: &str,
        position: impl Into<SoundPosition>,
        volume: f32,
    ) -> Result<usize, AudioError> {
        let (buffer, base_volume) = self
            .sounds
            .entry(id)
            .ok_or_else(|| AudioError::UnknownId(id.to_string()))?;

        self.voices
            .trigger(buffer, position.into().to_listener_space(), base_volume * volume)
            .ok_or_else(|| {
                log::trace!("Dropped sound '{}': all {} voices busy", id, self.voices.capacity());
                AudioError::NoIdleVoice
            })
    }

    /// Play a sound on the plane just in front of the listener
    ///
    /// # Errors
    /// `UnknownId` or `NoIdleVoice`.
    pub fn play_sound_2d(&mut self, id: &str, position: Vec2, volume: f32) -> Result<usize, AudioError> {
        self.play_sound_at(id, SoundPosition::Plane(position), volume)
    }

    // Music

    /// Crossfade to a registered music track
    ///
    /// # Arguments
    /// * `id` - Music identifier
    /// * `fade` - Crossfade length; zero switches on the next update
    /// * `volume` - Multiplier on top of the track's base volume
    ///
    /// # Errors
    /// `UnknownId` without side effects. `OpenFailed` or `MusicMemoryReleased`
    /// after the current track identifier and the slot roles have already
    /// changed; treat the music as unchanged.
    pub fn play_music(&mut self, id: &str, fade: Duration, volume: f32) -> Result<(), AudioError> {
        let (source, base_volume) = self
            .music
            .entry(id)
            .ok_or_else(|| AudioError::UnknownId(id.to_string()))?;
        let source = source.clone();

        self.current_music = Some(id.to_string());
        self.crossfader.switch_to(source, base_volume, fade, volume)
    }

    /// Crossfade to a track using the configured default fade and full volume
    ///
    /// # Errors
    /// As [`Self::play_music`].
    pub fn play_music_default(&mut self, id: &str) -> Result<(), AudioError> {
        self.play_music(id, self.default_fade, 1.0)
    }

    /// Restart the current track from the beginning without a fade
    ///
    /// # Errors
    /// `NoMusicSelected` if no track was ever played, otherwise as [`Self::play_music`].
    pub fn restart_music(&mut self) -> Result<(), AudioError> {
        self.crossfader.restart_current()
    }

    // Volumes

    /// Set the base volume of a registered sound
    ///
    /// Affects future plays only.
    ///
    /// # Errors
    /// `UnknownId` if nothing is registered under `id`.
    pub fn assign_volume_sound(&mut self, id: &str, volume: f32) -> Result<(), AudioError> {
        self.sounds.assign_volume(id, volume)
    }

    /// Set the base volume of a registered music track
    ///
    /// Applies on the next update if `id` is the current track.
    ///
    /// # Errors
    /// `UnknownId` if nothing is registered under `id`.
    pub fn assign_volume_music(&mut self, id: &str, volume: f32) -> Result<(), AudioError> {
        self.music.assign_volume(id, volume)?;
        if self.current_music.as_deref() == Some(id) {
            self.crossfader.set_base_volume(volume);
        }
        Ok(())
    }

    // Transport

    /// Pause the current track if it is playing
    pub fn pause_music(&mut self) {
        self.crossfader.pause();
    }

    /// Resume the current track if it is paused
    pub fn resume_music(&mut self) {
        self.crossfader.resume();
    }

    /// Stop every sound effect
    pub fn stop_fx(&mut self) {
        self.voices.stop_all();
    }

    /// Stop both music slots
    pub fn stop_music(&mut self) {
        self.crossfader.stop();
    }

    /// Stop sound effects and music
    pub fn stop_all(&mut self) {
        self.stop_fx();
        self.stop_music();
    }

    // Voices

    /// Change the number of sound-effect voices
    ///
    /// Shrinking cuts off whatever the dropped voices were playing.
    pub fn set_max_voices(&mut self, capacity: usize) {
        let backend = &mut self.backend;
        self.voices.resize_with(capacity, || backend.create_channel());
    }

    /// Number of sound-effect voices
    pub fn max_voices(&self) -> usize {
        self.voices.capacity()
    }

    /// Number of sound effects currently playing
    pub fn sounds_playing(&self) -> usize {
        self.voices.playing_count()
    }

    // Queries

    /// Decoded buffer registered under `id`
    pub fn buffer(&self, id: &str) -> Option<&B::Buffer> {
        self.sounds.get(id)
    }

    /// Identifier of the current music track
    pub fn current_music(&self) -> Option<&str> {
        self.current_music.as_deref()
    }

    /// Status of the current music track
    pub fn current_music_status(&self) -> SoundStatus {
        self.crossfader.status()
    }

    /// Playback position of the current track (zero when stopped)
    pub fn current_music_position(&self) -> Duration {
        self.crossfader.position()
    }

    /// Where the crossfade currently is
    pub fn crossfade_state(&self) -> CrossfadeState {
        self.crossfader.state()
    }

    /// Registered sound effects
    pub fn sounds(&self) -> &AssetStore<B::Buffer> {
        &self.sounds
    }

    /// Registered music tracks
    pub fn music(&self) -> &AssetStore<MusicSource> {
        &self.music
    }

    /// Sound-effect voices
    pub fn voices(&self) -> &VoicePool<B::Channel> {
        &self.voices
    }

    /// Mutable sound-effect voices
    pub fn voices_mut(&mut self) -> &mut VoicePool<B::Channel> {
        &mut self.voices
    }

    /// Music crossfader
    pub fn crossfader(&self) -> &MusicCrossfader<B::Stream, C> {
        &self.crossfader
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_sound_free(&self, id: &str) -> Result<(), AudioError> {
        if self.sounds.contains(id) {
            return Err(AudioError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    fn register_sound(&mut self, id: &str, buffer: B::Buffer) -> Result<(), AudioError> {
        self.sounds.insert(id, buffer)?;
        log::debug!("Registered sound '{}'", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::headless::HeadlessBackend;
    use crate::foundation::math::Vec3;
    use crate::foundation::time::ManualClock;
    use crate::audio::{MusicStream, PlaybackChannel};
    use approx::assert_relative_eq;

    const WAV: &[u8] = b"RIFF\0\0\0\0WAVE";
    const OGG: &[u8] = b"OggS\0\0\0\0";

    fn system(capacity: usize) -> (AudioSystem<HeadlessBackend, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let config = AudioConfig {
            initial_voice_capacity: capacity,
            ..AudioConfig::default()
        };
        let audio = AudioSystem::with_clock(HeadlessBackend::new(), &config, clock.clone()).unwrap();
        (audio, clock)
    }

    #[test]
    fn test_new_initializes_backend() {
        let (audio, _) = system(64);
        assert!(audio.backend().is_initialized());
        assert_eq!(audio.max_voices(), 64);
        assert_eq!(audio.crossfade_state(), CrossfadeState::Idle);
        assert_eq!(audio.current_music(), None);
    }

    #[test]
    fn test_sound_loading_paths_agree() {
        let (mut audio, _) = system(4);
        audio.load_sound_from_memory("memory", WAV).unwrap();
        audio.load_sound_from_reader("reader", std::io::Cursor::new(WAV)).unwrap();

        assert_eq!(audio.buffer("memory"), audio.buffer("reader"));
        assert_eq!(audio.sounds().volume("reader"), Some(1.0));
    }

    #[test]
    fn test_failed_decode_registers_nothing() {
        let (mut audio, _) = system(4);
        let result = audio.load_sound_from_memory("bad", b"not audio");
        assert!(matches!(result, Err(AudioError::DecodeFailed(_))));
        assert!(audio.buffer("bad").is_none());
        assert_eq!(audio.sounds().volume("bad"), None);
    }

    #[test]
    fn test_duplicate_sound_is_rejected() {
        let (mut audio, _) = system(4);
        audio.load_sound_from_memory("blip", WAV).unwrap();
        let result = audio.load_sound_from_memory("blip", OGG);
        assert!(matches!(result, Err(AudioError::DuplicateId(_))));
        assert_eq!(audio.buffer("blip").map(|b| b.format()), Some(crate::audio::AudioFormat::Wav));
    }

    #[test]
    fn test_play_sound_applies_base_volume() {
        let (mut audio, _) = system(2);
        audio.load_sound_from_memory("blip", WAV).unwrap();
        audio.assign_volume_sound("blip", 0.5).unwrap();

        let index = audio.play_sound("blip", 0.5).unwrap();
        assert_relative_eq!(audio.voices().voice(index).unwrap().gain(), 25.0);
    }

    #[test]
    fn test_play_sound_unknown_id() {
        let (mut audio, _) = system(2);
        assert!(matches!(audio.play_sound("ghost", 1.0), Err(AudioError::UnknownId(_))));
        assert_eq!(audio.sounds_playing(), 0);
    }

    #[test]
    fn test_play_sound_2d_offsets_forward() {
        let (mut audio, _) = system(1);
        audio.load_sound_from_memory("blip", WAV).unwrap();
        let index = audio.play_sound_2d("blip", Vec2::new(4.0, 5.0), 1.0).unwrap();

        let position = audio.voices().voice(index).unwrap().position();
        assert_eq!(position.x, 4.0);
        assert_eq!(position.y, 5.0);
        assert!(position.z > 0.0);
    }

    #[test]
    fn test_play_sound_at_space() {
        let (mut audio, _) = system(1);
        audio.load_sound_from_memory("blip", WAV).unwrap();
        let offset = Vec3::new(-1.0, 0.0, 2.0);
        let index = audio.play_sound_at("blip", offset, 1.0).unwrap();
        assert_eq!(audio.voices().voice(index).unwrap().position(), offset);
    }

    #[test]
    fn test_play_music_unknown_id_has_no_side_effects() {
        let (mut audio, _) = system(1);
        let result = audio.play_music("nope", Duration::ZERO, 1.0);
        assert!(matches!(result, Err(AudioError::UnknownId(_))));
        assert_eq!(audio.current_music(), None);
        assert_eq!(audio.crossfade_state(), CrossfadeState::Idle);
    }

    #[test]
    fn test_assign_volume_music_updates_current_track() {
        let (mut audio, _) = system(1);
        let block: Arc<[u8]> = Arc::from(OGG);
        audio.link_music_memory("theme", &block).unwrap();
        audio.play_music("theme", Duration::ZERO, 1.0).unwrap();
        audio.update();
        assert_relative_eq!(audio.crossfader().active_slot().gain(), 100.0);

        audio.assign_volume_music("theme", 0.3).unwrap();
        audio.update();
        assert_relative_eq!(audio.crossfader().active_slot().gain(), 30.0);
        assert!(matches!(audio.assign_volume_music("other", 0.3), Err(AudioError::UnknownId(_))));
    }

    #[test]
    fn test_play_music_default_uses_configured_fade() {
        let clock = ManualClock::new();
        let config = AudioConfig {
            default_fade: Duration::from_secs(1),
            ..AudioConfig::default()
        };
        let mut audio = AudioSystem::with_clock(HeadlessBackend::new(), &config, clock.clone()).unwrap();
        let block: Arc<[u8]> = Arc::from(OGG);
        audio.link_music_memory("theme", &block).unwrap();

        audio.play_music_default("theme").unwrap();
        clock.advance(Duration::from_millis(500));
        audio.update();
        assert_eq!(audio.crossfade_state(), CrossfadeState::FadingIn);
        assert_relative_eq!(audio.crossfader().active_slot().gain(), 50.0);
    }

    #[test]
    fn test_restart_music_without_selection() {
        let (mut audio, _) = system(1);
        assert!(matches!(audio.restart_music(), Err(AudioError::NoMusicSelected)));
    }

    #[test]
    fn test_stop_all_stops_fx_and_music() {
        let (mut audio, _) = system(2);
        let block: Arc<[u8]> = Arc::from(OGG);
        audio.load_sound_from_memory("blip", WAV).unwrap();
        audio.link_music_memory("theme", &block).unwrap();
        audio.play_sound("blip", 1.0).unwrap();
        audio.play_music("theme", Duration::ZERO, 1.0).unwrap();

        audio.stop_all();
        assert_eq!(audio.sounds_playing(), 0);
        assert_eq!(audio.current_music_status(), SoundStatus::Stopped);
        assert_eq!(audio.current_music_position(), Duration::ZERO);
        assert_eq!(audio.current_music(), Some("theme"));
    }

    #[test]
    fn test_set_max_voices() {
        let (mut audio, _) = system(2);
        audio.set_max_voices(5);
        assert_eq!(audio.max_voices(), 5);
        audio.set_max_voices(0);
        assert_eq!(audio.max_voices(), 0);
    }
}
