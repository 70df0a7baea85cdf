//! # Soundbox Common Library
//!
//! Shared code for the Soundbox server:
//! - Record models (sounds, shortcuts, settings)
//! - Common error type
//! - Data directory / configuration resolution

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{NowPlayingEntry, Settings, Shortcut, ShortcutAction, Sound, SourceType};
