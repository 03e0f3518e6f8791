//! Game session state machine
//!
//! [`GameSession`] owns the phase, round counters, deck, and per-slot
//! feedback, and is the only place state transitions happen. It is a pure
//! (non-async) machine: callers feed it beats, transcripts, and gate
//! outcomes, and it returns [`Directive`]s naming the side effects the
//! caller must perform on the platform services. The async orchestration
//! around it lives in [`crate::runner`].
//!
//! Beat-timeout marking and transcript matching can race on the same slot
//! when a late recognition result lands near a tick. Both paths guard on the
//! slot's current feedback, so whichever caller acquires the session first
//! wins and the loser becomes a silent no-op.

mod phase;

pub use phase::{GamePhase, SlotFeedback};

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::Result;
use crate::catalog::{Prompt, PromptCatalog};
use crate::config::GameConfig;
use crate::deck::RoundDeck;
use crate::gate::ResourceStatus;
use crate::matcher;

/// Side effect the caller must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Start the recognition stream
    StartStream,
    /// Stop the recognition stream
    StopStream,
    /// Clear the cumulative transcript buffer
    ResetStream,
    /// Start music playback
    StartPlayback,
    /// Stop music playback
    StopPlayback,
    /// Stop the beat clock
    StopClock,
}

/// One slot of the current round as the UI renders it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    /// The prompt assigned to this slot
    pub prompt: Prompt,
    /// Feedback recorded for this slot
    pub feedback: SlotFeedback,
}

/// Immutable view of the whole session, published after every mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Current phase
    pub phase: GamePhase,
    /// Current round, starting at 1
    pub current_round: u32,
    /// Total rounds in a game
    pub total_rounds: u32,
    /// Index of the slot awaiting an answer; `None` outside `Running`
    pub active_slot: Option<usize>,
    /// Beats remaining in the current countdown or intermission
    pub countdown_remaining: u32,
    /// Correct answers this game
    pub score: u32,
    /// Deck and feedback for the current round
    pub slots: Vec<SlotView>,
    /// Resource readiness; any `false` renders as a degraded-mode warning
    pub resources: ResourceStatus,
}

/// The beat-synchronized game state machine
pub struct GameSession {
    config: GameConfig,
    catalog: Arc<PromptCatalog>,
    rng: StdRng,
    run_id: Uuid,
    phase: GamePhase,
    deck: RoundDeck,
    feedback: Vec<SlotFeedback>,
    current_round: u32,
    active_slot: Option<usize>,
    countdown_remaining: u32,
    score: u32,
    resources: ResourceStatus,
}

impl GameSession {
    /// Create a session in `PermissionPending`
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation
    pub fn new(config: GameConfig, catalog: Arc<PromptCatalog>) -> Result<Self> {
        Self::with_rng(config, catalog, StdRng::from_entropy())
    }

    /// Create a session with a seeded deck RNG, for deterministic tests
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation
    pub fn with_seed(config: GameConfig, catalog: Arc<PromptCatalog>, seed: u64) -> Result<Self> {
        Self::with_rng(config, catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, catalog: Arc<PromptCatalog>, mut rng: StdRng) -> Result<Self> {
        config.validate()?;
        let deck = RoundDeck::draw(&catalog, config.slot_count, &mut rng);
        let feedback = vec![SlotFeedback::Pending; config.slot_count];
        Ok(Self {
            config,
            catalog,
            rng,
            run_id: Uuid::new_v4(),
            phase: GamePhase::PermissionPending,
            deck,
            feedback,
            current_round: 1,
            active_slot: None,
            countdown_remaining: 0,
            score: 0,
            resources: ResourceStatus::default(),
        })
    }

    // --- Gate transitions ---

    /// Permission granted: `PermissionPending`/`PermissionDenied` → `Loading`
    ///
    /// Returns whether a transition happened.
    pub fn permission_granted(&mut self) -> bool {
        match self.phase {
            GamePhase::PermissionPending | GamePhase::PermissionDenied => {
                self.phase = GamePhase::Loading;
                tracing::info!("permission granted, loading resources");
                true
            }
            _ => false,
        }
    }

    /// Permission denied: `PermissionPending`/`Loading` → `PermissionDenied`
    ///
    /// Returns whether a transition happened.
    pub fn permission_denied(&mut self) -> bool {
        match self.phase {
            GamePhase::PermissionPending | GamePhase::Loading => {
                self.phase = GamePhase::PermissionDenied;
                tracing::warn!("microphone permission denied");
                true
            }
            _ => false,
        }
    }

    /// Resource preparation settled: `Loading` → `Ready`
    ///
    /// The gate never blocks on individual resource failures; `status` may
    /// carry `false` flags, which surface as warnings in the snapshot.
    /// Returns whether a transition happened.
    pub fn resources_settled(&mut self, status: ResourceStatus) -> bool {
        if self.phase != GamePhase::Loading {
            return false;
        }
        self.resources = status;
        self.phase = GamePhase::Ready;
        if status.degraded() {
            tracing::warn!(?status, "ready in degraded mode");
        } else {
            tracing::info!("all resources ready");
        }
        true
    }

    // --- Game transitions ---

    /// Start a game: `Ready`/`Finished` → `Countdown`
    ///
    /// Resets score, round, deck, and feedback. Returns the side effects to
    /// perform, or an empty list if the call was ignored (wrong phase).
    pub fn start(&mut self) -> Vec<Directive> {
        if !matches!(self.phase, GamePhase::Ready | GamePhase::Finished) {
            tracing::debug!(phase = %self.phase, "start ignored");
            return Vec::new();
        }
        self.run_id = Uuid::new_v4();
        self.score = 0;
        self.current_round = 1;
        self.deck = RoundDeck::draw(&self.catalog, self.config.slot_count, &mut self.rng);
        self.feedback = vec![SlotFeedback::Pending; self.config.slot_count];
        self.active_slot = None;
        self.countdown_remaining = self.config.pre_game_countdown;
        self.phase = GamePhase::Countdown;
        tracing::info!(
            run = %self.run_id,
            countdown = self.countdown_remaining,
            rounds = self.config.total_rounds,
            "game starting"
        );
        vec![Directive::StartStream, Directive::StartPlayback]
    }

    /// Stop the game: any beat-driven phase (or `Finished`) → `Ready`
    ///
    /// Returns the side effects to perform; empty if already idle.
    pub fn stop(&mut self) -> Vec<Directive> {
        match self.phase {
            GamePhase::Countdown | GamePhase::Running | GamePhase::Intermission => {
                self.phase = GamePhase::Ready;
                self.active_slot = None;
                self.countdown_remaining = 0;
                tracing::info!(run = %self.run_id, score = self.score, "game stopped");
                vec![
                    Directive::StopClock,
                    Directive::StopStream,
                    Directive::StopPlayback,
                ]
            }
            GamePhase::Finished => {
                self.phase = GamePhase::Ready;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Advance the machine by one beat
    ///
    /// The sole driver of countdown, slot advancement, round boundaries, and
    /// game completion. Beats arriving outside beat-driven phases are
    /// discarded.
    pub fn on_beat(&mut self) -> Vec<Directive> {
        match self.phase {
            GamePhase::Countdown => {
                self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
                if self.countdown_remaining == 0 {
                    self.enter_running();
                }
                Vec::new()
            }
            GamePhase::Running => self.advance_slot(),
            GamePhase::Intermission => {
                self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
                if self.countdown_remaining == 0 {
                    self.current_round += 1;
                    self.enter_running();
                }
                Vec::new()
            }
            _ => {
                tracing::trace!(phase = %self.phase, "beat outside active phase discarded");
                Vec::new()
            }
        }
    }

    fn enter_running(&mut self) {
        self.phase = GamePhase::Running;
        self.active_slot = Some(0);
        tracing::info!(run = %self.run_id, round = self.current_round, "round running");
    }

    /// One `Running` beat: time out the vacated slot and advance
    fn advance_slot(&mut self) -> Vec<Directive> {
        let Some(index) = self.active_slot else {
            return Vec::new();
        };
        if self.feedback[index] == SlotFeedback::Pending {
            self.feedback[index] = SlotFeedback::Incorrect;
            tracing::debug!(run = %self.run_id, slot = index, "slot timed out");
        }

        let next = (index + 1) % self.config.slot_count;
        if next != 0 {
            self.active_slot = Some(next);
            return Vec::new();
        }

        if self.current_round >= self.config.total_rounds {
            self.phase = GamePhase::Finished;
            self.active_slot = None;
            tracing::info!(run = %self.run_id, score = self.score, "game finished");
            return vec![
                Directive::StopClock,
                Directive::StopStream,
                Directive::StopPlayback,
            ];
        }

        // Round boundary: fresh deck and feedback for the next round
        self.deck = RoundDeck::draw(&self.catalog, self.config.slot_count, &mut self.rng);
        self.feedback = vec![SlotFeedback::Pending; self.config.slot_count];
        self.active_slot = None;
        self.countdown_remaining = self.config.intermission_countdown;
        self.phase = GamePhase::Intermission;
        tracing::info!(run = %self.run_id, round = self.current_round, "round complete");
        Vec::new()
    }

    /// Mark the active slot correct and score it
    ///
    /// No-op unless the phase is `Running`, `index` is the active slot, and
    /// the slot is not already `Correct`. Stale calls (a late match landing
    /// after the beat advanced) are silently ignored; this idempotence guard
    /// is what resolves the matcher/beat race.
    pub fn mark_slot_correct(&mut self, index: usize) -> bool {
        if self.phase != GamePhase::Running || self.active_slot != Some(index) {
            tracing::trace!(slot = index, phase = %self.phase, "stale mark discarded");
            return false;
        }
        if self.feedback[index] == SlotFeedback::Correct {
            return false;
        }
        self.feedback[index] = SlotFeedback::Correct;
        self.score += 1;
        tracing::info!(run = %self.run_id, slot = index, score = self.score, "correct answer");
        true
    }

    /// Feed a cumulative transcript update
    ///
    /// Matches only during `Running` against the active slot's word; on a
    /// match the slot is scored and a [`Directive::ResetStream`] asks the
    /// recognition engine to clear its buffer so the word cannot double-count.
    pub fn handle_transcript(&mut self, transcript: &str) -> Vec<Directive> {
        if self.phase != GamePhase::Running {
            return Vec::new();
        }
        let Some(index) = self.active_slot else {
            return Vec::new();
        };
        if self.feedback[index] == SlotFeedback::Correct {
            return Vec::new();
        }
        let Some(word) = self.deck.slot(index).map(|p| p.word.clone()) else {
            return Vec::new();
        };
        if matcher::contains_word(transcript, &word) && self.mark_slot_correct(index) {
            return vec![Directive::ResetStream];
        }
        Vec::new()
    }

    // --- Accessors ---

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Correct answers this game
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Current round, starting at 1
    #[must_use]
    pub const fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Index of the slot awaiting an answer; `None` outside `Running`
    #[must_use]
    pub const fn active_slot(&self) -> Option<usize> {
        self.active_slot
    }

    /// Beats remaining in the current countdown or intermission
    #[must_use]
    pub const fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    /// The current round's deck
    #[must_use]
    pub const fn deck(&self) -> &RoundDeck {
        &self.deck
    }

    /// Feedback for the current round's slots
    #[must_use]
    pub fn feedback(&self) -> &[SlotFeedback] {
        &self.feedback
    }

    /// Resource readiness reported by the gate
    #[must_use]
    pub const fn resources(&self) -> ResourceStatus {
        self.resources
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Immutable view of the session for rendering
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let slots = self
            .deck
            .slots()
            .iter()
            .zip(&self.feedback)
            .map(|(prompt, feedback)| SlotView {
                prompt: prompt.clone(),
                feedback: *feedback,
            })
            .collect();
        GameSnapshot {
            phase: self.phase,
            current_round: self.current_round,
            total_rounds: self.config.total_rounds,
            active_slot: self.active_slot,
            countdown_remaining: self.countdown_remaining,
            score: self.score,
            slots,
            resources: self.resources,
        }
    }
}
