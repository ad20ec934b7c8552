/// Shared minigame plumbing — results and how they reach the host.

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::host::PresentationHost;

#[derive(Debug, Error)]
pub enum MinigameError {
    #[error("minigame config needs at least one category")]
    NoCategories,
    #[error("minigame quota must be at least 1")]
    ZeroQuota,
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// What a finished (or abandoned) minigame hands back to the game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinigameOutcome {
    pub currency: u32,
    pub items: Vec<String>,
    pub clearance: Option<u8>,
    pub message: String,
}

impl MinigameOutcome {
    /// An outcome that only shows a line of text.
    pub fn message(text: &str) -> Self {
        Self {
            message: text.to_string(),
            ..Self::default()
        }
    }
}

/// Apply an outcome through the host: pay out, grant items, update
/// clearance, then show the flavor line with no choices.
pub fn settle(outcome: &MinigameOutcome, host: &mut dyn PresentationHost) {
    if outcome.currency > 0 {
        info!("Minigame awarded {} credits", outcome.currency);
        host.add_currency(outcome.currency);
    }
    for item in &outcome.items {
        host.grant_item(item);
    }
    if let Some(level) = outcome.clearance {
        host.set_clearance(level);
    }
    if !outcome.message.is_empty() {
        host.show_message(&outcome.message, Vec::new());
    }
}
