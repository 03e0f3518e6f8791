//! Resource gate
//!
//! Admits gameplay: acquires the microphone permission, then prepares the
//! three gameplay resources (backing track, recognition engine, prompt
//! images) concurrently. Preparation never hard-fails the gate: each
//! resource reports into [`ResourceStatus`] and any failure degrades the
//! session with a warning instead of blocking play. Permission denial is the
//! one terminal outcome, lifted only by an external platform change.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::PromptCatalog;
use crate::platform::{PermissionState, PlatformServices};
use crate::{Error, Result};

/// Bounded wait for the recognition self-test
///
/// On expiry the engine is assumed available anyway; some recognition
/// engines never acknowledge a cold start.
pub const SPEECH_SELF_TEST_TIMEOUT: Duration = Duration::from_millis(1500);

/// Readiness of each gameplay resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStatus {
    /// Backing track decoded and ready to play
    pub audio_ready: bool,
    /// Recognition engine passed (or outlasted) its self-test
    pub speech_ready: bool,
    /// Prompt images prefetched
    pub images_ready: bool,
}

impl ResourceStatus {
    /// Whether every resource is ready
    #[must_use]
    pub const fn all_ready(self) -> bool {
        self.audio_ready && self.speech_ready && self.images_ready
    }

    /// Whether any resource failed to prepare (warning state, not an error)
    #[must_use]
    pub const fn degraded(self) -> bool {
        !self.all_ready()
    }
}

/// Orchestrates permission acquisition and resource preparation
pub struct ResourceGate {
    platform: PlatformServices,
    catalog: Arc<PromptCatalog>,
}

impl ResourceGate {
    /// Create a gate over the given platform services and catalog
    #[must_use]
    pub const fn new(platform: PlatformServices, catalog: Arc<PromptCatalog>) -> Self {
        Self { platform, catalog }
    }

    /// Acquire the microphone permission, prompting if undecided
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] if the platform refuses; the
    /// caller keeps watching [`Permissions::changes`] for an external grant
    ///
    /// [`Permissions::changes`]: crate::platform::Permissions::changes
    pub async fn acquire_permission(&self) -> Result<()> {
        match self.platform.permissions.query().await {
            PermissionState::Granted => Ok(()),
            state => {
                tracing::debug!(%state, "requesting microphone permission");
                match self.platform.permissions.request().await {
                    PermissionState::Granted => Ok(()),
                    refused => {
                        tracing::warn!(state = %refused, "microphone permission refused");
                        Err(Error::PermissionDenied)
                    }
                }
            }
        }
    }

    /// Prepare all gameplay resources concurrently
    ///
    /// Never fails: each resource settles independently and failures degrade.
    pub async fn prepare_resources(&self) -> ResourceStatus {
        let (audio_ready, speech_ready, images_ready) = tokio::join!(
            self.prepare_audio(),
            self.speech_self_test(),
            self.prefetch_images(),
        );

        let status = ResourceStatus {
            audio_ready,
            speech_ready,
            images_ready,
        };
        tracing::info!(?status, "resource preparation settled");
        status
    }

    async fn prepare_audio(&self) -> bool {
        match self.platform.playback.prepare().await {
            Ok(()) => true,
            Err(e) => {
                let err = Error::Resource(format!("backing track: {e}"));
                tracing::warn!(error = %err, "degrading");
                false
            }
        }
    }

    /// Cold-start the recognition engine once and stop it again
    ///
    /// Treated as successful if it outlasts [`SPEECH_SELF_TEST_TIMEOUT`].
    async fn speech_self_test(&self) -> bool {
        let test = async {
            self.platform.transcript.start().await?;
            self.platform.transcript.stop().await;
            anyhow::Ok(())
        };

        match tokio::time::timeout(SPEECH_SELF_TEST_TIMEOUT, test).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                let err = Error::Stream(e.to_string());
                tracing::warn!(error = %err, "recognition self-test failed, degrading");
                false
            }
            Err(_) => {
                tracing::warn!("recognition self-test timed out, assuming available");
                true
            }
        }
    }

    async fn prefetch_images(&self) -> bool {
        match self.platform.images.prefetch(&self.catalog).await {
            Ok(()) => true,
            Err(e) => {
                let err = Error::Resource(format!("image prefetch: {e}"));
                tracing::warn!(error = %err, "degrading");
                false
            }
        }
    }
}
