//! Cadence - beat-synchronized speech game engine
//!
//! This library provides the core of a rhythm/speech game: prompt images
//! advance on a fixed musical tempo and the player must say the matching
//! word before the beat moves on. The crate owns:
//! - The beat clock and the game state machine it drives
//! - Round deck sampling
//! - Live transcript matching against the active prompt
//! - The resource gate (permission + degraded-mode preloading)
//!
//! Rendering, permission UX, and the actual speech/audio engines live in
//! the host and plug in through the [`platform`] traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Host / UI                         │
//! │   rendering  │  permission UX  │  asset bundling    │
//! └────────────────────┬────────────────────────────────┘
//!                      │ snapshots / beat flash
//! ┌────────────────────▼────────────────────────────────┐
//! │                  GameRunner                          │
//! │   BeatClock  │  GameSession  │  Matcher  │  Gate    │
//! └────────────────────┬────────────────────────────────┘
//!                      │ platform traits
//! ┌────────────────────▼────────────────────────────────┐
//! │     Permissions │ Recognition │ Playback │ Images   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod clock;
pub mod config;
pub mod deck;
pub mod error;
pub mod gate;
pub mod matcher;
pub mod platform;
pub mod runner;
pub mod session;

pub use catalog::{Prompt, PromptCatalog};
pub use clock::BeatClock;
pub use config::{
    DEFAULT_BPM, DEFAULT_SLOT_COUNT, DEFAULT_TOTAL_ROUNDS, GameConfig, INTERMISSION_COUNTDOWN,
    PRE_GAME_COUNTDOWN,
};
pub use deck::RoundDeck;
pub use error::{Error, Result};
pub use gate::{ResourceGate, ResourceStatus, SPEECH_SELF_TEST_TIMEOUT};
pub use platform::{
    ImagePrefetcher, PermissionState, Permissions, Playback, PlatformServices, TranscriptSource,
};
pub use runner::{GameRunner, KEEP_ALIVE_INTERVAL};
pub use session::{Directive, GamePhase, GameSession, GameSnapshot, SlotFeedback, SlotView};
