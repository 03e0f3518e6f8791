//! Game phases and per-slot feedback

/// Phase of the game session
///
/// Exactly one phase is active at a time; all transitions are owned by
/// [`GameSession`](super::GameSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the microphone permission decision
    PermissionPending,
    /// Permission denied; terminal until the platform reports a change
    PermissionDenied,
    /// Permission granted; resources being prepared
    Loading,
    /// Resources settled; a game can start
    Ready,
    /// Pre-game countdown, one decrement per beat
    Countdown,
    /// A round in progress; one slot advance per beat
    Running,
    /// Between rounds, one decrement per beat
    Intermission,
    /// All rounds complete; a replay can start
    Finished,
}

impl GamePhase {
    /// Whether this phase is driven by beat ticks
    #[must_use]
    pub const fn is_beat_driven(self) -> bool {
        matches!(self, Self::Countdown | Self::Running | Self::Intermission)
    }

    /// Whether the recognition stream should be alive in this phase
    ///
    /// Same set as [`Self::is_beat_driven`]: the stream is supervised for the
    /// whole countdown-to-finish span so recognition is warm when the first
    /// slot appears.
    #[must_use]
    pub const fn wants_recognition(self) -> bool {
        self.is_beat_driven()
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionPending => write!(f, "permission-pending"),
            Self::PermissionDenied => write!(f, "permission-denied"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Countdown => write!(f, "countdown"),
            Self::Running => write!(f, "running"),
            Self::Intermission => write!(f, "intermission"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Outcome recorded for one slot of the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotFeedback {
    /// Not yet answered
    #[default]
    Pending,
    /// The player said the word while the slot was active
    Correct,
    /// The slot was vacated without a correct answer
    Incorrect,
}
