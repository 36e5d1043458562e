use crate::agent::AgentInst;
use crate::battle::state::EncounterKind;
use crate::roster::ItemStack;
use schema::{ItemData, ItemId, ItemKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum CatchError {
    /// Trainer-owned agents cannot be captured.
    #[error("Can't capture a trainer's agent")]
    TrainerBattle,
    #[error("{0} is not a capture item")]
    NotACaptureItem(ItemId),
    #[error("No {0} left in the bag")]
    ItemNotInBag(ItemId),
    /// Target agent is already out of context window.
    #[error("{0} has already fainted")]
    TargetFainted(String),
}

/// Check if capture attempts are allowed in this kind of encounter.
pub fn is_catch_allowed(kind: &EncounterKind) -> bool {
    matches!(kind, EncounterKind::Wild)
}

/// Validates a capture attempt and returns the item's capture modifier.
pub fn can_attempt_catch(
    kind: &EncounterKind,
    target: &AgentInst,
    item_id: &ItemId,
    item: &ItemData,
    bag: &[ItemStack],
) -> Result<f64, CatchError> {
    if !is_catch_allowed(kind) {
        return Err(CatchError::TrainerBattle);
    }

    let ItemKind::Capture { modifier } = item.kind else {
        return Err(CatchError::NotACaptureItem(item_id.clone()));
    };

    let in_bag = bag
        .iter()
        .any(|stack| &stack.item_id == item_id && stack.quantity > 0);
    if !in_bag {
        return Err(CatchError::ItemNotInBag(item_id.clone()));
    }

    if target.is_fainted() {
        return Err(CatchError::TargetFainted(target.nickname.clone()));
    }

    Ok(modifier)
}
