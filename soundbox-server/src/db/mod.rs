//! SQLite persistence
//!
//! Sound and shortcut records plus the key-value settings table. The
//! playback subsystem never touches this layer directly; handlers load
//! read-only snapshots and pass them in.

pub mod init;
pub mod settings;
pub mod shortcuts;
pub mod sounds;
