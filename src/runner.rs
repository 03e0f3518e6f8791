//! Game runner
//!
//! Binds the pure [`GameSession`] machine to the platform services and the
//! beat clock. Three asynchronous sources feed the session — beat ticks,
//! transcript updates, and permission/resource notifications — and every one
//! of them serializes through the session mutex, so at most one handler
//! mutates state at a time.
//!
//! Cancellation uses an epoch counter: `stop()` bumps the epoch and aborts
//! the game tasks, and any already-queued tick or transcript update that
//! still lands re-checks its captured epoch under the lock and is discarded
//! before touching state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;

use crate::Result;
use crate::catalog::PromptCatalog;
use crate::clock::BeatClock;
use crate::config::GameConfig;
use crate::gate::ResourceGate;
use crate::platform::{PermissionState, PlatformServices};
use crate::session::{Directive, GamePhase, GameSession, GameSnapshot};

/// How often the keep-alive supervisor polls the recognition stream
///
/// Under two beat periods at the default tempo, so a dropped engine costs at
/// most a prompt or two of listening.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_millis(500);

/// State shared between the runner handle and its spawned tasks
struct Shared {
    session: Mutex<GameSession>,
    platform: PlatformServices,
    gate: ResourceGate,
    epoch: AtomicU64,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    snapshot_tx: watch::Sender<GameSnapshot>,
    flash_tx: watch::Sender<bool>,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the current session state to snapshot subscribers
    fn publish(&self) {
        let snapshot = self.session().snapshot();
        self.snapshot_tx.send_replace(snapshot);
    }

    /// Perform the side effects a session transition asked for
    async fn apply(&self, directives: &[Directive]) {
        for directive in directives {
            match directive {
                Directive::StartStream => {
                    if let Err(e) = self.platform.transcript.start().await {
                        tracing::warn!(error = %e, "recognition start failed, keep-alive will retry");
                    }
                }
                Directive::StopStream => self.platform.transcript.stop().await,
                Directive::ResetStream => self.platform.transcript.reset().await,
                Directive::StartPlayback => {
                    if let Err(e) = self.platform.playback.play().await {
                        tracing::warn!(error = %e, "playback failed, continuing without music");
                    }
                }
                Directive::StopPlayback => self.platform.playback.stop().await,
                // The beat loop owns its clock and handles this itself
                Directive::StopClock => {}
            }
        }
    }
}

/// Async orchestrator for one game session
///
/// Construct with the host's platform services, then `init()` to pass the
/// resource gate and `start()`/`stop()` to control play. The UI observes
/// state through [`snapshots`](Self::snapshots) and the cosmetic
/// [`beat_flash`](Self::beat_flash) toggle.
pub struct GameRunner {
    shared: Arc<Shared>,
    permission_watch: AtomicBool,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl GameRunner {
    /// Create a runner in `PermissionPending`
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation
    pub fn new(
        config: GameConfig,
        catalog: PromptCatalog,
        platform: PlatformServices,
    ) -> Result<Self> {
        let catalog = Arc::new(catalog);
        let session = GameSession::new(config, Arc::clone(&catalog))?;
        Ok(Self::from_session(session, catalog, platform))
    }

    /// Create a runner with a seeded deck RNG, for deterministic tests
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation
    pub fn with_seed(
        config: GameConfig,
        catalog: PromptCatalog,
        platform: PlatformServices,
        seed: u64,
    ) -> Result<Self> {
        let catalog = Arc::new(catalog);
        let session = GameSession::with_seed(config, Arc::clone(&catalog), seed)?;
        Ok(Self::from_session(session, catalog, platform))
    }

    fn from_session(
        session: GameSession,
        catalog: Arc<PromptCatalog>,
        platform: PlatformServices,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(session.snapshot());
        let (flash_tx, _) = watch::channel(false);
        let gate = ResourceGate::new(platform.clone(), catalog);
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                platform,
                gate,
                epoch: AtomicU64::new(0),
                tasks: Mutex::new(Vec::new()),
                snapshot_tx,
                flash_tx,
            }),
            permission_watch: AtomicBool::new(false),
            watcher: Mutex::new(None),
        }
    }

    /// Subscribe to session snapshots, published after every mutation
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<GameSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Subscribe to the cosmetic beat-flash toggle, flipped once per beat
    #[must_use]
    pub fn beat_flash(&self) -> watch::Receiver<bool> {
        self.shared.flash_tx.subscribe()
    }

    /// The current session state
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.session().snapshot()
    }

    /// Pass the resource gate: acquire permission and prepare resources
    ///
    /// On success the session reaches `Ready`, possibly in degraded mode.
    /// On denial the session parks in `PermissionDenied` and a watcher keeps
    /// observing platform permission changes, reopening the gate on an
    /// external grant.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PermissionDenied`] if the platform refuses
    pub async fn init(&self) -> Result<()> {
        self.spawn_permission_watcher();

        match self.shared.gate.acquire_permission().await {
            Ok(()) => {
                self.shared.session().permission_granted();
                self.shared.publish();

                let status = self.shared.gate.prepare_resources().await;
                self.shared.session().resources_settled(status);
                self.shared.publish();
                Ok(())
            }
            Err(e) => {
                self.shared.session().permission_denied();
                self.shared.publish();
                Err(e)
            }
        }
    }

    /// Start a game from `Ready` or `Finished`
    ///
    /// Ignored in any other phase. Spawns the beat loop, the transcript
    /// matcher, and the recognition keep-alive supervisor.
    pub async fn start(&self) {
        let directives = self.shared.session().start();
        if directives.is_empty() {
            return;
        }

        self.halt_game_tasks();
        self.shared.publish();
        self.shared.apply(&directives).await;

        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        let mut tasks = self.shared.tasks();
        tasks.push(spawn_beat_loop(Arc::clone(&self.shared), epoch));
        tasks.push(spawn_transcript_loop(Arc::clone(&self.shared), epoch));
        tasks.push(spawn_keep_alive(Arc::clone(&self.shared), epoch));
    }

    /// Stop the game immediately and return to `Ready`
    ///
    /// Effective at once: no beat tick or transcript update arriving after
    /// this call mutates state.
    pub async fn stop(&self) {
        let directives = self.shared.session().stop();
        self.halt_game_tasks();
        self.shared.publish();
        self.shared.apply(&directives).await;
    }

    /// Invalidate in-flight callbacks and abort the game tasks
    fn halt_game_tasks(&self) {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        for task in self.shared.tasks().drain(..) {
            task.abort();
        }
    }

    /// Watch platform permission changes while denied (spawned once)
    fn spawn_permission_watcher(&self) {
        if self.permission_watch.swap(true, Ordering::SeqCst) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let mut changes = shared.platform.permissions.changes();
            while changes.changed().await.is_ok() {
                let state = *changes.borrow_and_update();
                if state != PermissionState::Granted {
                    continue;
                }
                if shared.session().phase() != GamePhase::PermissionDenied {
                    continue;
                }

                tracing::info!("permission granted externally, reopening the gate");
                shared.session().permission_granted();
                shared.publish();

                let status = shared.gate.prepare_resources().await;
                shared.session().resources_settled(status);
                shared.publish();
            }
        });
        *self.watcher.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
    }
}

impl Drop for GameRunner {
    fn drop(&mut self) {
        self.halt_game_tasks();
        if let Some(task) = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

/// Drive the session with beat ticks until the game ends or the epoch moves
fn spawn_beat_loop(shared: Arc<Shared>, epoch: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = shared.session().config().beat_interval();
        let mut clock = BeatClock::new(period);
        let mut beats = clock.start();

        while beats.recv().await.is_some() {
            let directives = {
                let mut session = shared.session();
                if shared.epoch.load(Ordering::SeqCst) != epoch {
                    break;
                }
                shared.flash_tx.send_modify(|flash| *flash = !*flash);
                session.on_beat()
            };
            shared.publish();

            let game_over = directives.contains(&Directive::StopClock);
            shared.apply(&directives).await;
            if game_over {
                clock.stop();
                break;
            }
        }
    })
}

/// Feed transcript updates to the session until the epoch moves
fn spawn_transcript_loop(shared: Arc<Shared>, epoch: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut updates = WatchStream::from_changes(shared.platform.transcript.transcripts());

        while let Some(text) = updates.next().await {
            let directives = {
                let mut session = shared.session();
                if shared.epoch.load(Ordering::SeqCst) != epoch {
                    break;
                }
                session.handle_transcript(&text)
            };
            if directives.is_empty() {
                continue;
            }
            shared.publish();
            shared.apply(&directives).await;
        }
    })
}

/// Restart the recognition stream whenever it drops during an active phase
///
/// Recognition engines stop unpredictably; this supervisor is the one piece
/// of retry logic in the engine and it retries unconditionally.
fn spawn_keep_alive(shared: Arc<Shared>, epoch: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(KEEP_ALIVE_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            interval.tick().await;
            let wants_recognition = {
                let session = shared.session();
                if shared.epoch.load(Ordering::SeqCst) != epoch {
                    break;
                }
                session.phase().wants_recognition()
            };
            if wants_recognition && !shared.platform.transcript.is_active() {
                tracing::warn!("recognition stream stopped unexpectedly, restarting");
                if let Err(e) = shared.platform.transcript.start().await {
                    tracing::warn!(error = %e, "recognition restart failed, will retry");
                }
            }
        }
    })
}
