//! # Soundbox Server Library
//!
//! Soundboard backend: trigger short audio clips by id with
//! play/stop/toggle/restart semantics while clients poll for what is
//! currently playing.
//!
//! **Architecture:** each actively-playing sound is one external player
//! process (mpv). The playback orchestrator owns process lifecycle, the
//! registry is the single source of truth for "now playing", and a reaper
//! task per process reconciles natural exits. SQLite holds the sound,
//! shortcut and settings records; axum exposes the HTTP control surface.

pub mod api;
pub mod db;
pub mod error;
pub mod playback;

pub use error::{ApiError, ApiResult};
