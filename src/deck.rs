//! Round deck
//!
//! The ordered set of prompts assigned to slots for one round. Drawn with
//! replacement from the catalog, so duplicates within a round are permitted.
//! A deck is never mutated once drawn; round boundaries draw a fresh one.

use rand::Rng;

use crate::catalog::{Prompt, PromptCatalog};

/// The prompts assigned to the slots of the current round
#[derive(Debug, Clone)]
pub struct RoundDeck {
    slots: Vec<Prompt>,
}

impl RoundDeck {
    /// Draw `n` prompts independently and uniformly, with replacement
    ///
    /// Deterministic given a seeded `rng`.
    #[must_use]
    pub fn draw<R: Rng + ?Sized>(catalog: &PromptCatalog, n: usize, rng: &mut R) -> Self {
        let slots = (0..n)
            .map(|_| catalog.prompts()[rng.gen_range(0..catalog.len())].clone())
            .collect();
        Self { slots }
    }

    /// The prompt at `index`, if in range
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Prompt> {
        self.slots.get(index)
    }

    /// All slots in order
    #[must_use]
    pub fn slots(&self) -> &[Prompt] {
        &self.slots
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the deck has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
