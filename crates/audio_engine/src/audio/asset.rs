//! Audio asset bookkeeping
//!
//! Identifier-keyed storage for decoded sound buffers and music sources,
//! each paired with a per-asset base volume.

use crate::audio::backend::MusicStream;
use crate::audio::AudioError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

/// Base volume given to every newly registered asset
pub const DEFAULT_ASSET_VOLUME: f32 = 1.0;

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// WAV uncompressed
    Wav,
    /// OGG Vorbis compressed
    Ogg,
    /// MP3 compressed
    Mp3,
    /// FLAC lossless
    Flac,
    /// Unknown format
    Unknown,
}

impl AudioFormat {
    /// Detect audio format from magic bytes
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.len() < 4 {
            return Self::Unknown;
        }

        match &bytes[0..4] {
            b"RIFF" => Self::Wav,
            b"OggS" => Self::Ogg,
            b"fLaC" => Self::Flac,
            // MP3 can start with ID3 tag or frame sync
            [0xFF, 0xFB, _, _] | [0xFF, 0xFA, _, _] => Self::Mp3,
            [b'I', b'D', b'3', _] => Self::Mp3,
            _ => Self::Unknown,
        }
    }

    /// Whether the bytes look like a container we can play
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

/// Where a music track is streamed from
///
/// `Memory` holds only a weak reference to the caller's block: the caller
/// keeps the `Arc` alive for as long as the track may be switched to. Once
/// every strong reference is gone, switching to the track fails with
/// [`AudioError::MusicMemoryReleased`]. A slot that is already streaming
/// holds its own strong reference until it is reopened.
#[derive(Debug, Clone)]
pub enum MusicSource {
    /// Stream from a file on disk
    File(PathBuf),
    /// Stream from a caller-owned memory block
    Memory(Weak<[u8]>),
}

impl MusicSource {
    /// Link a caller-owned memory block without taking ownership
    pub fn linked(block: &Arc<[u8]>) -> Self {
        Self::Memory(Arc::downgrade(block))
    }

    /// Open this source into a music stream
    pub fn open_into<S: MusicStream>(&self, stream: &mut S) -> Result<(), AudioError> {
        match self {
            Self::File(path) => stream.open_from_file(path),
            Self::Memory(block) => {
                let data = block.upgrade().ok_or(AudioError::MusicMemoryReleased)?;
                stream.open_from_memory(data)
            }
        }
    }

    /// Human-readable description for logging
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory(block) => match block.upgrade() {
                Some(data) => format!("<memory: {} bytes>", data.len()),
                None => "<memory: released>".to_string(),
            },
        }
    }
}

/// Identifier-keyed asset map with per-asset base volumes
///
/// Every asset has exactly one volume entry. Registration never overwrites.
#[derive(Debug, Clone)]
pub struct AssetStore<T> {
    assets: HashMap<String, T>,
    volumes: HashMap<String, f32>,
}

impl<T> AssetStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
            volumes: HashMap::new(),
        }
    }

    /// Register an asset with the default base volume
    ///
    /// # Errors
    /// `DuplicateId` if the identifier is taken; the existing entry is untouched.
    pub fn insert(&mut self, id: impl Into<String>, asset: T) -> Result<(), AudioError> {
        let id = id.into();
        if self.assets.contains_key(&id) {
            return Err(AudioError::DuplicateId(id));
        }
        self.volumes.insert(id.clone(), DEFAULT_ASSET_VOLUME);
        self.assets.insert(id, asset);
        Ok(())
    }

    /// Look up an asset
    pub fn get(&self, id: &str) -> Option<&T> {
        self.assets.get(id)
    }

    /// Look up an asset together with its base volume
    pub fn entry(&self, id: &str) -> Option<(&T, f32)> {
        let asset = self.assets.get(id)?;
        let volume = self.volumes.get(id).copied().unwrap_or(DEFAULT_ASSET_VOLUME);
        Some((asset, volume))
    }

    /// Base volume of an asset
    pub fn volume(&self, id: &str) -> Option<f32> {
        self.volumes.get(id).copied()
    }

    /// Replace the base volume of a registered asset
    ///
    /// # Errors
    /// `UnknownId` if nothing is registered under `id`.
    pub fn assign_volume(&mut self, id: &str, volume: f32) -> Result<(), AudioError> {
        match self.volumes.get_mut(id) {
            Some(slot) => {
                *slot = volume;
                Ok(())
            }
            None => Err(AudioError::UnknownId(id.to_string())),
        }
    }

    /// Check if an identifier is registered
    pub fn contains(&self, id: &str) -> bool {
        self.assets.contains_key(id)
    }

    /// Number of registered assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Iterate over registered identifiers
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}

impl<T> Default for AssetStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioFormat::detect(b"RIFF....WAVE"), AudioFormat::Wav);
        assert_eq!(AudioFormat::detect(b"OggS...."), AudioFormat::Ogg);
        assert_eq!(AudioFormat::detect(b"fLaC...."), AudioFormat::Flac);
        assert_eq!(AudioFormat::detect(b"ID3\x04"), AudioFormat::Mp3);
        assert_eq!(AudioFormat::detect(&[0xFF, 0xFB, 0x90, 0x00]), AudioFormat::Mp3);
        assert_eq!(AudioFormat::detect(b"ABCD"), AudioFormat::Unknown);
        assert_eq!(AudioFormat::detect(b"RI"), AudioFormat::Unknown);
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let mut store = AssetStore::new();
        store.insert("theme", 1u32).unwrap();
        store.assign_volume("theme", 0.25).unwrap();

        let result = store.insert("theme", 2u32);
        assert!(matches!(result, Err(AudioError::DuplicateId(ref id)) if id == "theme"));
        assert_eq!(store.get("theme"), Some(&1));
        assert_eq!(store.volume("theme"), Some(0.25));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_assign_volume_unknown_id() {
        let mut store: AssetStore<u32> = AssetStore::new();
        assert!(matches!(store.assign_volume("nope", 0.5), Err(AudioError::UnknownId(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_entry_default_volume() {
        let mut store = AssetStore::new();
        store.insert("blip", "buffer").unwrap();
        assert_eq!(store.entry("blip"), Some((&"buffer", DEFAULT_ASSET_VOLUME)));
        assert!(store.entry("other").is_none());
    }

    #[test]
    fn test_volumes_are_per_identifier() {
        let mut store = AssetStore::new();
        store.insert("a", ()).unwrap();
        store.insert("b", ()).unwrap();
        store.assign_volume("a", 0.1).unwrap();
        assert_eq!(store.volume("a"), Some(0.1));
        assert_eq!(store.volume("b"), Some(DEFAULT_ASSET_VOLUME));
    }

    #[test]
    fn test_linked_memory_released() {
        let block: Arc<[u8]> = Arc::from(&b"OggS0000"[..]);
        let source = MusicSource::linked(&block);
        assert_eq!(source.describe(), "<memory: 8 bytes>");
        drop(block);
        assert_eq!(source.describe(), "<memory: released>");
    }
}
