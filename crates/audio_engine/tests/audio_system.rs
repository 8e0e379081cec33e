//! Integration tests for the audio facade
//!
//! Runs against the headless backend with a hand-driven clock so fades are
//! deterministic.

use approx::assert_relative_eq;
use audio_engine::audio::backend::headless::HeadlessStream;
use audio_engine::audio::{MusicStream, PlaybackChannel};
use audio_engine::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const BLIP: &[u8] = b"RIFF\x24\0\0\0WAVEfmt ";
const FADE: Duration = Duration::from_secs(4);

fn audio_system(capacity: usize) -> (AudioSystem<HeadlessBackend, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let config = AudioConfig {
        initial_voice_capacity: capacity,
        ..AudioConfig::default()
    };
    let audio = AudioSystem::with_clock(HeadlessBackend::new(), &config, clock.clone())
        .expect("headless backend always initializes");
    (audio, clock)
}

fn active(audio: &AudioSystem<HeadlessBackend, ManualClock>) -> &HeadlessStream {
    audio.crossfader().active_slot()
}

fn inactive(audio: &AudioSystem<HeadlessBackend, ManualClock>) -> &HeadlessStream {
    audio.crossfader().inactive_slot()
}

#[test]
fn simultaneous_triggers_up_to_capacity_all_play() {
    let (mut audio, _) = audio_system(6);
    audio.load_sound_from_memory("blip", BLIP).unwrap();

    for n in 1..=6 {
        audio.play_sound("blip", 1.0).unwrap();
        assert_eq!(audio.sounds_playing(), n);
    }
}

#[test]
fn saturated_pool_drops_new_sounds() {
    let (mut audio, _) = audio_system(2);
    audio.load_sound_from_memory("blip", BLIP).unwrap();

    let results: Vec<bool> = (0..3).map(|_| audio.play_sound("blip", 1.0).is_ok()).collect();
    assert_eq!(results, [true, true, false]);
    assert!(matches!(audio.play_sound("blip", 1.0), Err(AudioError::NoIdleVoice)));
    assert_eq!(audio.sounds_playing(), 2);

    // A finished voice frees up a slot again
    audio.voices_mut().voice_mut(0).unwrap().finish();
    assert_eq!(audio.play_sound("blip", 1.0).unwrap(), 0);
}

#[test]
fn shrinking_voices_keeps_leading_sounds() {
    let (mut audio, _) = audio_system(8);
    audio.load_sound_from_memory("blip", BLIP).unwrap();
    for _ in 0..5 {
        audio.play_sound("blip", 1.0).unwrap();
    }

    audio.set_max_voices(3);
    assert_eq!(audio.max_voices(), 3);
    assert!(audio.sounds_playing() <= 3);
    assert!(audio.voices().voices().all(|v| v.status() == SoundStatus::Playing));
}

#[test]
fn sound_file_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blip.wav");
    std::fs::write(&path, BLIP).unwrap();

    let (mut audio, _) = audio_system(1);
    audio.load_sound_from_file("blip", &path).unwrap();
    assert!(audio.buffer("blip").is_some());

    let missing = audio.load_sound_from_file("ghost", dir.path().join("ghost.wav"));
    assert!(matches!(missing, Err(AudioError::Io { .. })));
    assert!(audio.buffer("ghost").is_none());
}

#[test]
fn crossfade_gains_over_time() {
    let (mut audio, clock) = audio_system(1);
    let intro: Arc<[u8]> = Arc::from(&b"OggS-intro"[..]);
    let battle: Arc<[u8]> = Arc::from(&b"OggS-battle-theme"[..]);
    audio.link_music_memory("intro", &intro).unwrap();
    audio.link_music_memory("battle", &battle).unwrap();
    audio.assign_volume_music("battle", 0.5).unwrap();

    audio.play_music("intro", Duration::ZERO, 1.0).unwrap();
    audio.update();
    assert_relative_eq!(active(&audio).gain(), 100.0);

    audio.play_music("battle", FADE, 1.0).unwrap();
    assert_eq!(audio.current_music(), Some("battle"));
    assert_eq!(audio.crossfade_state(), CrossfadeState::FadingIn);

    let mut gains = Vec::new();
    for step in [Duration::ZERO, FADE / 2, FADE / 2] {
        clock.advance(step);
        audio.update();
        gains.push((active(&audio).gain(), inactive(&audio).gain()));
    }

    assert_relative_eq!(gains[0].0, 0.0);
    assert_relative_eq!(gains[1].0, 25.0);
    assert_relative_eq!(gains[2].0, 50.0);
    assert_relative_eq!(gains[0].1, 100.0);
    assert_relative_eq!(gains[1].1, 50.0);
    assert_relative_eq!(gains[2].1, 0.0);
    assert_eq!(audio.crossfade_state(), CrossfadeState::SteadyState);

    clock.advance(Duration::from_millis(16));
    audio.update();
    assert_eq!(inactive(&audio).status(), SoundStatus::Stopped);
    assert_eq!(active(&audio).opened_source(), Some("memory:17"));
}

#[test]
fn zero_duration_switch_is_immediate() {
    let (mut audio, _) = audio_system(1);
    let a: Arc<[u8]> = Arc::from(&b"fLaC-a"[..]);
    let b: Arc<[u8]> = Arc::from(&b"fLaC-bb"[..]);
    audio.link_music_memory("a", &a).unwrap();
    audio.link_music_memory("b", &b).unwrap();

    audio.play_music("a", FADE, 1.0).unwrap();
    audio.play_music("b", Duration::ZERO, 1.0).unwrap();
    audio.update();

    assert_relative_eq!(active(&audio).gain(), 100.0);
    assert_eq!(inactive(&audio).status(), SoundStatus::Stopped);
}

#[test]
fn duplicate_music_id_keeps_original_source() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("original.ogg");
    let impostor = dir.path().join("impostor.ogg");
    std::fs::write(&original, b"OggS-original").unwrap();
    std::fs::write(&impostor, b"OggS-impostor").unwrap();

    let (mut audio, _) = audio_system(1);
    audio.link_music_file("theme", &original).unwrap();
    let second = audio.link_music_file("theme", &impostor);
    assert!(matches!(second, Err(AudioError::DuplicateId(_))));

    audio.play_music("theme", Duration::ZERO, 1.0).unwrap();
    let opened = original.display().to_string();
    assert_eq!(active(&audio).opened_source(), Some(opened.as_str()));
}

#[test]
fn released_music_memory_fails_to_play() {
    let (mut audio, _) = audio_system(1);
    let block: Arc<[u8]> = Arc::from(&b"OggS-temp"[..]);
    audio.link_music_memory("temp", &block).unwrap();
    drop(block);

    let result = audio.play_music("temp", Duration::ZERO, 1.0);
    assert!(matches!(result, Err(AudioError::MusicMemoryReleased)));
    assert_eq!(audio.current_music_status(), SoundStatus::Stopped);
}

#[test]
fn failed_open_leaves_previous_track_fading_out() {
    let dir = tempfile::tempdir().unwrap();
    let (mut audio, _) = audio_system(1);
    let good: Arc<[u8]> = Arc::from(&b"OggS-good"[..]);
    audio.link_music_memory("good", &good).unwrap();
    audio.link_music_file("missing", dir.path().join("missing.ogg")).unwrap();

    audio.play_music("good", Duration::ZERO, 1.0).unwrap();
    audio.update();

    let result = audio.play_music("missing", FADE, 1.0);
    assert!(matches!(result, Err(AudioError::OpenFailed { .. })));
    assert_eq!(audio.current_music(), Some("missing"));
    assert_eq!(audio.current_music_status(), SoundStatus::Stopped);
    assert_eq!(inactive(&audio).status(), SoundStatus::Playing);
}

#[test]
fn pause_and_resume_are_guarded() {
    let (mut audio, _) = audio_system(1);
    audio.pause_music();
    audio.resume_music();
    assert_eq!(audio.current_music_status(), SoundStatus::Stopped);

    let track: Arc<[u8]> = Arc::from(&b"OggS-loop"[..]);
    audio.link_music_memory("loop", &track).unwrap();
    audio.play_music("loop", Duration::ZERO, 1.0).unwrap();

    audio.resume_music();
    assert_eq!(audio.current_music_status(), SoundStatus::Playing);
    audio.pause_music();
    assert_eq!(audio.current_music_status(), SoundStatus::Paused);
    audio.pause_music();
    assert_eq!(audio.current_music_status(), SoundStatus::Paused);
    audio.resume_music();
    assert_eq!(audio.current_music_status(), SoundStatus::Playing);
}

#[test]
fn restart_music_replays_current_track() {
    let (mut audio, clock) = audio_system(1);
    let track: Arc<[u8]> = Arc::from(&b"OggS-loop"[..]);
    audio.link_music_memory("loop", &track).unwrap();
    audio.play_music("loop", FADE, 1.0).unwrap();
    clock.advance(FADE / 4);
    audio.update();

    audio.restart_music().unwrap();
    audio.update();
    assert_eq!(audio.current_music(), Some("loop"));
    assert_relative_eq!(active(&audio).gain(), 100.0);
    assert_eq!(inactive(&audio).status(), SoundStatus::Stopped);
    assert_eq!(audio.crossfade_state(), CrossfadeState::SteadyState);
}

#[test]
fn music_position_tracks_playback_and_holds_while_paused() {
    let (mut audio, _) = audio_system(1);
    let track: Arc<[u8]> = Arc::from(&b"OggS-position"[..]);
    audio.link_music_memory("theme", &track).unwrap();
    audio.play_music("theme", Duration::ZERO, 1.0).unwrap();

    std::thread::sleep(Duration::from_millis(5));
    let playing = audio.current_music_position();
    assert!(playing > Duration::ZERO);

    audio.pause_music();
    let paused = audio.current_music_position();
    assert!(paused >= playing);

    // Offset is frozen while paused
    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(audio.current_music_position(), paused);

    audio.resume_music();
    std::thread::sleep(Duration::from_millis(2));
    assert!(audio.current_music_position() > paused);
}
