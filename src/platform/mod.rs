//! Platform service adapters
//!
//! The black-box collaborators the host environment implements: microphone
//! permissions, the speech-recognition stream, music playback, and image
//! prefetching. The engine only ever talks to these traits; trait methods
//! return `anyhow::Result` because external failure detail is opaque here
//! and is mapped into the crate taxonomy at the gate.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::catalog::PromptCatalog;

/// Platform permission decision for microphone access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Access granted
    Granted,
    /// Access denied
    Denied,
    /// Not yet decided; a request will prompt the user
    Prompt,
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
            Self::Prompt => write!(f, "prompt"),
        }
    }
}

/// Microphone permission service
#[async_trait]
pub trait Permissions: Send + Sync {
    /// Query the current permission state without prompting
    async fn query(&self) -> PermissionState;

    /// Request permission, prompting the user if needed
    async fn request(&self) -> PermissionState;

    /// Subscribe to platform permission changes
    ///
    /// The engine watches this while denied so an external grant can unblock
    /// the gate without a reload.
    fn changes(&self) -> watch::Receiver<PermissionState>;
}

/// Live speech-recognition stream
///
/// Publishes a cumulative transcript that grows with every (possibly
/// partial) recognition result. Browser recognition engines terminate
/// unpredictably; the engine supervises [`is_active`](Self::is_active) and
/// re-requests [`start`](Self::start) rather than trusting a single
/// subscription.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Start (or restart) recognition
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be started; the supervisor retries
    async fn start(&self) -> anyhow::Result<()>;

    /// Stop recognition
    async fn stop(&self);

    /// Whether the engine currently reports itself listening
    fn is_active(&self) -> bool;

    /// Subscribe to cumulative transcript updates
    fn transcripts(&self) -> watch::Receiver<String>;

    /// Clear the cumulative transcript buffer
    async fn reset(&self);
}

/// Music playback service
#[async_trait]
pub trait Playback: Send + Sync {
    /// Decode and prepare the backing track
    ///
    /// # Errors
    ///
    /// Returns error if the track cannot be prepared; gameplay degrades
    async fn prepare(&self) -> anyhow::Result<()>;

    /// Start playback
    ///
    /// # Errors
    ///
    /// Returns error if playback cannot start; gameplay degrades
    async fn play(&self) -> anyhow::Result<()>;

    /// Stop playback
    async fn stop(&self);
}

/// Prompt image prefetcher
#[async_trait]
pub trait ImagePrefetcher: Send + Sync {
    /// Prefetch the catalog's display assets
    ///
    /// # Errors
    ///
    /// Returns error if prefetching fails outright; partial failures are the
    /// implementation's concern and are tolerated
    async fn prefetch(&self, catalog: &PromptCatalog) -> anyhow::Result<()>;
}

/// The full set of platform services the engine binds to
#[derive(Clone)]
pub struct PlatformServices {
    /// Microphone permission service
    pub permissions: Arc<dyn Permissions>,
    /// Speech-recognition stream
    pub transcript: Arc<dyn TranscriptSource>,
    /// Music playback service
    pub playback: Arc<dyn Playback>,
    /// Prompt image prefetcher
    pub images: Arc<dyn ImagePrefetcher>,
}
