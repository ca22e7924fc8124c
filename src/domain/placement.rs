//! Form-driven placement of a new card
//!
//! When a card is created from a form instead of a drag gesture there is no
//! pointer column. The new card tries to keep its requested hours, then
//! shrinks itself to the free hours, and only as a last resort squeezes the
//! existing cards (largest first) to make room for a one-hour card.

use serde::Serialize;
use tracing::debug;

use super::card::TaskCard;
use super::columns::{
    available_hours, leftmost_free_run, total_hours, validate_layout, MAX_CARDS_PER_SLOT,
    SLOT_COLUMNS,
};
use super::compress::{compress_largest_first, left_pack_only};
use super::drop::DropRejection;

/// Which fallback settled the new card's hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Requested hours fit in the free space
    Preferred,
    /// New card shrunk to the free hours
    ShrunkNew,
    /// Existing cards shrunk to free one hour
    ShrunkExisting,
}

/// Result of placing a new card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementOutcome {
    /// Full slot layout sorted by column; empty when rejected
    pub final_layout: Vec<TaskCard>,

    /// Hours the new card ended up with (0 when rejected)
    pub new_task_hours: u8,

    pub can_place: bool,

    /// Existing cards whose hours or column changed and must be persisted
    pub tasks_to_update: Vec<TaskCard>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<PlacementStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DropRejection>,
}

impl PlacementOutcome {
    fn rejected(reason: DropRejection) -> Self {
        debug!(%reason, "placement rejected");
        Self {
            final_layout: Vec::new(),
            new_task_hours: 0,
            can_place: false,
            tasks_to_update: Vec::new(),
            strategy: None,
            reason: Some(reason),
        }
    }
}

/// Places `new_task` in a slot, preferring `preferred_hours`
///
/// Inputs are never mutated; an infeasible request returns a rejected
/// outcome and leaves the caller's cards as they were.
pub fn calculate_optimal_layout_with_new_task(
    existing: &[TaskCard],
    new_task: &TaskCard,
    preferred_hours: u8,
) -> PlacementOutcome {
    let mut others: Vec<TaskCard> = existing
        .iter()
        .filter(|c| c.id != new_task.id)
        .map(|c| c.with_placement(c.normalized_hours(), c.column_start))
        .collect();

    if others.len() >= MAX_CARDS_PER_SLOT {
        return PlacementOutcome::rejected(DropRejection::SlotFull);
    }
    others.sort_by_key(|c| c.column_start);

    let preferred = preferred_hours.clamp(1, SLOT_COLUMNS);
    let available = available_hours(&others);

    let (hours, strategy) = if preferred <= available {
        (preferred, PlacementStrategy::Preferred)
    } else if available >= 1 {
        (available, PlacementStrategy::ShrunkNew)
    } else {
        let excess = total_hours(&others) + 1 - u32::from(SLOT_COLUMNS);
        if compress_largest_first(&mut others, excess) > 0 {
            return PlacementOutcome::rejected(DropRejection::NoCapacity);
        }
        (1, PlacementStrategy::ShrunkExisting)
    };

    debug!(card = %new_task.id, preferred, available, hours, ?strategy, "placing new card");

    // Keep existing columns when they are sound and leave a wide enough gap
    let in_place = if strategy != PlacementStrategy::ShrunkExisting && validate_layout(&others).is_ok() {
        leftmost_free_run(&others, hours).map(|col| (others.clone(), col))
    } else {
        None
    };

    let (mut layout, column) = match in_place {
        Some(found) => found,
        None => {
            let packed = left_pack_only(&others);
            match leftmost_free_run(&packed, hours) {
                Some(col) => (packed, col),
                None => return PlacementOutcome::rejected(DropRejection::NoCapacity),
            }
        }
    };

    let tasks_to_update: Vec<TaskCard> = layout
        .iter()
        .filter(|card| {
            existing
                .iter()
                .find(|e| e.id == card.id)
                .map_or(false, |e| e.placement_differs(card))
        })
        .cloned()
        .collect();

    layout.push(new_task.with_placement(hours, column));
    layout.sort_by_key(|c| c.column_start);

    PlacementOutcome {
        final_layout: layout,
        new_task_hours: hours,
        can_place: true,
        tasks_to_update,
        strategy: Some(strategy),
        reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::CardId;

    fn card(id: u32, hours: u8, column_start: u8) -> TaskCard {
        TaskCard::new(CardId::from(id), hours, column_start)
    }

    fn placements(cards: &[TaskCard]) -> Vec<(String, u8, u8)> {
        cards
            .iter()
            .map(|c| (c.id.to_string(), c.hours, c.column_start))
            .collect()
    }

    #[test]
    fn preferred_hours_fit_in_gap() {
        let existing = vec![card(1, 1, 0), card(2, 1, 3)];
        let outcome = calculate_optimal_layout_with_new_task(&existing, &card(9, 1, 0), 2);

        assert!(outcome.can_place);
        assert_eq!(outcome.new_task_hours, 2);
        assert_eq!(outcome.strategy, Some(PlacementStrategy::Preferred));
        assert!(outcome.tasks_to_update.is_empty());
        assert_eq!(
            placements(&outcome.final_layout),
            vec![("1".into(), 1, 0), ("9".into(), 2, 1), ("2".into(), 1, 3)]
        );
    }

    #[test]
    fn fragmented_slot_is_repacked() {
        let existing = vec![card(1, 1, 1), card(2, 1, 3)];
        let outcome = calculate_optimal_layout_with_new_task(&existing, &card(9, 1, 0), 2);

        assert!(outcome.can_place);
        assert_eq!(
            placements(&outcome.final_layout),
            vec![("1".into(), 1, 0), ("2".into(), 1, 1), ("9".into(), 2, 2)]
        );
        assert_eq!(
            placements(&outcome.tasks_to_update),
            vec![("1".into(), 1, 0), ("2".into(), 1, 1)]
        );
    }

    #[test]
    fn new_card_shrinks_to_free_hours() {
        let existing = vec![card(1, 3, 0)];
        let outcome = calculate_optimal_layout_with_new_task(&existing, &card(9, 1, 0), 4);

        assert!(outcome.can_place);
        assert_eq!(outcome.new_task_hours, 1);
        assert_eq!(outcome.strategy, Some(PlacementStrategy::ShrunkNew));
        assert_eq!(
            placements(&outcome.final_layout),
            vec![("1".into(), 3, 0), ("9".into(), 1, 3)]
        );
    }

    #[test]
    fn existing_cards_shrink_as_last_resort() {
        let existing = vec![card(1, 2, 0), card(2, 2, 2)];
        let outcome = calculate_optimal_layout_with_new_task(&existing, &card(9, 1, 0), 3);

        assert!(outcome.can_place);
        assert_eq!(outcome.new_task_hours, 1);
        assert_eq!(outcome.strategy, Some(PlacementStrategy::ShrunkExisting));
        assert_eq!(
            placements(&outcome.final_layout),
            vec![("1".into(), 1, 0), ("2".into(), 2, 1), ("9".into(), 1, 3)]
        );
        assert_eq!(
            placements(&outcome.tasks_to_update),
            vec![("1".into(), 1, 0), ("2".into(), 2, 1)]
        );
    }

    #[test]
    fn full_slot_is_rejected_without_touching_input() {
        let existing: Vec<_> = (1..=4).map(|i| card(i, 1, (i - 1) as u8)).collect();
        let before = existing.clone();
        let outcome = calculate_optimal_layout_with_new_task(&existing, &card(9, 1, 0), 1);

        assert!(!outcome.can_place);
        assert_eq!(outcome.reason, Some(DropRejection::SlotFull));
        assert!(outcome.final_layout.is_empty());
        assert_eq!(existing, before);
    }

    #[test]
    fn duplicate_id_is_replaced_not_added() {
        let existing = vec![card(1, 2, 0), card(9, 2, 2)];
        let outcome = calculate_optimal_layout_with_new_task(&existing, &card(9, 1, 0), 2);

        assert!(outcome.can_place);
        assert_eq!(outcome.final_layout.len(), 2);
        assert_eq!(
            placements(&outcome.final_layout),
            vec![("1".into(), 2, 0), ("9".into(), 2, 2)]
        );
    }

    #[test]
    fn preferred_hours_are_clamped() {
        let outcome = calculate_optimal_layout_with_new_task(&[], &card(9, 1, 0), 0);
        assert_eq!(outcome.new_task_hours, 1);

        let outcome = calculate_optimal_layout_with_new_task(&[], &card(9, 1, 0), 12);
        assert_eq!(outcome.new_task_hours, 4);
        assert_eq!(placements(&outcome.final_layout), vec![("9".into(), 4, 0)]);
    }

    #[test]
    fn new_card_keeps_payload() {
        let new_task = card(9, 1, 0).titled("Fee proposal");
        let outcome = calculate_optimal_layout_with_new_task(&[], &new_task, 2);
        assert_eq!(outcome.final_layout[0].title, "Fee proposal");
    }
}
