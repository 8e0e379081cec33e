//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the audio engine:
//! - Math types for sound positions
//! - Elapsed-time sources for fades
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
