//! Drop orchestration
//!
//! Turns a "put this card in this slot at this column" request into a new
//! slot layout. Admission control runs first; accepted drops always go
//! through the compression engine, which degrades to a plain left-pack when
//! nothing needs to shrink.

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use super::card::TaskCard;
use super::columns::{MAX_CARDS_PER_SLOT, SLOT_COLUMNS};
use super::compress::smart_compress_and_position;

/// Why a drop or placement was refused
///
/// Expected infeasibility, not a failure: it travels inside the outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DropRejection {
    #[error("Slot is full (4 tasks maximum)")]
    SlotFull,

    #[error("Cannot fit {0} tasks in 4 columns")]
    TooManyTasks(usize),

    #[error("No capacity left: every task is already at 1 hour")]
    NoCapacity,
}

impl Serialize for DropRejection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Result of a drop request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropOutcome {
    pub can_drop: bool,

    /// Final layout in packing order; empty when rejected
    pub new_arrangement: Vec<TaskCard>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DropRejection>,
}

impl DropOutcome {
    fn accepted(new_arrangement: Vec<TaskCard>) -> Self {
        Self {
            can_drop: true,
            new_arrangement,
            reason: None,
        }
    }

    fn rejected(reason: DropRejection) -> Self {
        debug!(%reason, "drop rejected");
        Self {
            can_drop: false,
            new_arrangement: Vec::new(),
            reason: Some(reason),
        }
    }

    /// Cards whose hours or column differ from the pre-drop slot
    ///
    /// The dropped card is always included when it is new to the slot.
    pub fn changed_cards(&self, existing: &[TaskCard]) -> Vec<TaskCard> {
        self.new_arrangement
            .iter()
            .filter(|card| {
                existing
                    .iter()
                    .find(|e| e.id == card.id)
                    .map_or(true, |e| e.placement_differs(card))
            })
            .cloned()
            .collect()
    }
}

/// Computes the slot layout after `dropped` lands on `target_column`
///
/// `existing` is the slot's current content (it may already hold the dropped
/// card, for moves within the slot). `dropped.hours` of 0 counts as unset
/// and becomes 1.
pub fn calculate_column_based_rearrangement(
    existing: &[TaskCard],
    dropped: &TaskCard,
    target_column: u8,
) -> DropOutcome {
    if existing.len() >= MAX_CARDS_PER_SLOT {
        return DropOutcome::rejected(DropRejection::SlotFull);
    }

    let others: Vec<TaskCard> = existing
        .iter()
        .filter(|c| c.id != dropped.id)
        .cloned()
        .collect();

    let total_task_count = others.len() + 1;
    if total_task_count > MAX_CARDS_PER_SLOT {
        return DropOutcome::rejected(DropRejection::TooManyTasks(total_task_count));
    }

    let target_column = target_column.min(SLOT_COLUMNS - 1);
    let hours = dropped.normalized_hours();
    debug!(
        card = %dropped.id,
        hours,
        target_column,
        moved_within_slot = others.len() < existing.len(),
        "dropping card"
    );

    let mut candidates = others;
    candidates.push(dropped.with_placement(hours, target_column));

    DropOutcome::accepted(smart_compress_and_position(
        &candidates,
        &dropped.id,
        target_column,
    ))
}
