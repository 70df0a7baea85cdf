//! Playback orchestration
//!
//! Owns the lifecycle of one external audio-player process per
//! actively-playing sound, serializes concurrent requests against that
//! lifecycle, and maintains a consistent, pollable view of play state.

pub mod backend;
pub mod orchestrator;
pub mod policy;
pub mod registry;
pub mod reaper;

pub use backend::{MpvBackend, PlayerBackend, PlayerChild};
pub use orchestrator::{Orchestrator, PlayOutcome, ToggleOutcome};
pub use policy::EffectiveParams;
pub use registry::{PlaybackEntry, PlaybackRegistry, Toggled};
