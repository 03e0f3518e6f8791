//! Shared test utilities: mock platform services and catalogs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use cadence::{
    ImagePrefetcher, PermissionState, Permissions, Playback, PlatformServices, Prompt,
    PromptCatalog, TranscriptSource,
};

/// Build a small animal catalog
pub fn catalog() -> PromptCatalog {
    let prompts = ["dog", "cat", "bird", "fish", "cow"]
        .iter()
        .map(|w| Prompt {
            id: (*w).to_string(),
            display_asset: format!("images/{w}.png"),
            word: (*w).to_string(),
        })
        .collect();
    PromptCatalog::new(prompts).expect("valid catalog")
}

/// Build a catalog with a single prompt so the active word is always known
pub fn solo_catalog(word: &str) -> PromptCatalog {
    PromptCatalog::new(vec![Prompt {
        id: word.to_string(),
        display_asset: format!("images/{word}.png"),
        word: word.to_string(),
    }])
    .expect("valid catalog")
}

/// Mock permission service with scripted responses
pub struct MockPermissions {
    on_query: PermissionState,
    on_request: PermissionState,
    tx: watch::Sender<PermissionState>,
}

impl MockPermissions {
    pub fn new(on_query: PermissionState, on_request: PermissionState) -> Self {
        let (tx, _) = watch::channel(on_query);
        Self {
            on_query,
            on_request,
            tx,
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted, PermissionState::Granted)
    }

    pub fn denied() -> Self {
        Self::new(PermissionState::Denied, PermissionState::Denied)
    }

    /// Simulate an external platform permission change
    pub fn set_state(&self, state: PermissionState) {
        self.tx.send_replace(state);
    }
}

#[async_trait]
impl Permissions for MockPermissions {
    async fn query(&self) -> PermissionState {
        self.on_query
    }

    async fn request(&self) -> PermissionState {
        self.on_request
    }

    fn changes(&self) -> watch::Receiver<PermissionState> {
        self.tx.subscribe()
    }
}

/// Mock recognition stream with a pushable cumulative transcript
pub struct MockTranscript {
    active: AtomicBool,
    fail_start: AtomicBool,
    hang_start: AtomicBool,
    start_count: AtomicUsize,
    reset_count: AtomicUsize,
    tx: watch::Sender<String>,
}

impl MockTranscript {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(String::new());
        Self {
            active: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
            hang_start: AtomicBool::new(false),
            start_count: AtomicUsize::new(0),
            reset_count: AtomicUsize::new(0),
            tx,
        }
    }

    /// Push a cumulative transcript update
    pub fn push(&self, text: &str) {
        self.tx.send_replace(text.to_string());
    }

    /// Simulate the engine dying without notice
    pub fn drop_stream(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Make subsequent `start` calls fail
    pub fn fail_next_starts(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `start` calls hang forever
    pub fn hang_next_starts(&self, hang: bool) {
        self.hang_start.store(hang, Ordering::SeqCst);
    }

    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::SeqCst)
    }

    pub fn reset_count(&self) -> usize {
        self.reset_count.load(Ordering::SeqCst)
    }
}

impl Default for MockTranscript {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for MockTranscript {
    async fn start(&self) -> anyhow::Result<()> {
        if self.hang_start.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_start.load(Ordering::SeqCst) {
            anyhow::bail!("engine refused to start");
        }
        self.start_count.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn transcripts(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    async fn reset(&self) {
        self.reset_count.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(String::new());
    }
}

/// Mock playback service
pub struct MockPlayback {
    fail_prepare: AtomicBool,
    playing: AtomicBool,
    play_count: AtomicUsize,
}

impl MockPlayback {
    pub fn new() -> Self {
        Self {
            fail_prepare: AtomicBool::new(false),
            playing: AtomicBool::new(false),
            play_count: AtomicUsize::new(0),
        }
    }

    pub fn fail_prepare(&self, fail: bool) {
        self.fail_prepare.store(fail, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn play_count(&self) -> usize {
        self.play_count.load(Ordering::SeqCst)
    }
}

impl Default for MockPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Playback for MockPlayback {
    async fn prepare(&self) -> anyhow::Result<()> {
        if self.fail_prepare.load(Ordering::SeqCst) {
            anyhow::bail!("decode failed");
        }
        Ok(())
    }

    async fn play(&self) -> anyhow::Result<()> {
        self.play_count.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }
}

/// Mock image prefetcher
pub struct MockImages {
    fail: AtomicBool,
    prefetch_count: AtomicUsize,
}

impl MockImages {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            prefetch_count: AtomicUsize::new(0),
        }
    }

    pub fn fail_prefetch(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn prefetch_count(&self) -> usize {
        self.prefetch_count.load(Ordering::SeqCst)
    }
}

impl Default for MockImages {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImagePrefetcher for MockImages {
    async fn prefetch(&self, _catalog: &PromptCatalog) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("prefetch failed");
        }
        self.prefetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A full set of mock services plus handles to drive them
pub struct TestPlatform {
    pub permissions: Arc<MockPermissions>,
    pub transcript: Arc<MockTranscript>,
    pub playback: Arc<MockPlayback>,
    pub images: Arc<MockImages>,
}

impl TestPlatform {
    pub fn granted() -> Self {
        Self::with_permissions(MockPermissions::granted())
    }

    pub fn denied() -> Self {
        Self::with_permissions(MockPermissions::denied())
    }

    pub fn with_permissions(permissions: MockPermissions) -> Self {
        Self {
            permissions: Arc::new(permissions),
            transcript: Arc::new(MockTranscript::new()),
            playback: Arc::new(MockPlayback::new()),
            images: Arc::new(MockImages::new()),
        }
    }

    pub fn services(&self) -> PlatformServices {
        let permissions: Arc<dyn Permissions> = self.permissions.clone();
        let transcript: Arc<dyn TranscriptSource> = self.transcript.clone();
        let playback: Arc<dyn Playback> = self.playback.clone();
        let images: Arc<dyn ImagePrefetcher> = self.images.clone();
        PlatformServices {
            permissions,
            transcript,
            playback,
            images,
        }
    }
}
