//! Prompt catalog
//!
//! The read-only set of prompts a game draws from. Loaded once from the
//! host's asset manifest (JSON) and shared across rounds.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single prompt: an image the player sees and the word they must say
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Stable identifier
    pub id: String,

    /// Asset reference for the displayed image (path or URL, host-defined)
    pub display_asset: String,

    /// The word the player must say while this prompt is active
    pub word: String,
}

/// Immutable, shared collection of prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptCatalog {
    prompts: Vec<Prompt>,
}

impl PromptCatalog {
    /// Create a catalog from a list of prompts
    ///
    /// # Errors
    ///
    /// Returns error if the list is empty, an `id` is duplicated, or a word
    /// is empty after trimming
    pub fn new(prompts: Vec<Prompt>) -> Result<Self> {
        if prompts.is_empty() {
            return Err(Error::Catalog("catalog must not be empty".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for prompt in &prompts {
            if !seen.insert(prompt.id.as_str()) {
                return Err(Error::Catalog(format!("duplicate prompt id: {}", prompt.id)));
            }
            if prompt.word.trim().is_empty() {
                return Err(Error::Catalog(format!(
                    "prompt {} has an empty word",
                    prompt.id
                )));
            }
        }

        tracing::debug!(prompts = prompts.len(), "prompt catalog loaded");
        Ok(Self { prompts })
    }

    /// Load a catalog from a JSON array of prompts
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the catalog fails validation
    pub fn from_json(json: &str) -> Result<Self> {
        let prompts: Vec<Prompt> = serde_json::from_str(json)?;
        Self::new(prompts)
    }

    /// Get a prompt by position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Prompt> {
        self.prompts.get(index)
    }

    /// All prompts in the catalog
    #[must_use]
    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Number of prompts
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether the catalog is empty (never true for a validated catalog)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
