//! Compression and repositioning engine
//!
//! Takes an arbitrary, possibly over-budget list of cards and produces a
//! non-overlapping, left-packed layout:
//!
//! 1. fix a packing order (dropped card inserted by target column)
//! 2. if hours exceed the slot, shrink the largest cards first (never below 1h)
//! 3. place each card at the first column that does not collide with any
//!    card already placed in this pass
//!
//! Step 3 re-validates against everything placed so far, so stale or
//! inconsistent `column_start` values in the input are healed rather than
//! trusted.

use serde::Serialize;
use tracing::{debug, warn};

use super::card::TaskCard;
use super::columns::{total_hours, SLOT_COLUMNS};
use super::id::CardId;

/// Result of a packing pass, with diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackReport {
    /// Cards in packing order with their final placement
    pub cards: Vec<TaskCard>,

    /// Cards that found no free column and were put at column 0.
    /// Zero whenever the input respects the 4-card ceiling.
    pub fallbacks: usize,

    /// Hours of excess compression could not remove (every card at 1h)
    pub unresolved_excess: u32,
}

impl PackReport {
    /// Returns true if the layout is guaranteed overlap-free
    pub fn is_clean(&self) -> bool {
        self.fallbacks == 0 && self.unresolved_excess == 0
    }
}

/// Orders cards for packing with the dropped card inserted by target column
///
/// Other cards are stably sorted by `column_start`. A target of column 0 puts
/// the dropped card first; otherwise it goes right after the last card whose
/// `column_start` is left of the target. Every entry carrying `dropped_id`
/// is collapsed into one.
pub fn insertion_order(cards: &[TaskCard], dropped_id: &CardId, target_column: u8) -> Vec<TaskCard> {
    let mut ordered: Vec<TaskCard> = cards
        .iter()
        .filter(|c| &c.id != dropped_id)
        .cloned()
        .collect();
    ordered.sort_by_key(|c| c.column_start);

    let Some(dropped) = cards.iter().find(|c| &c.id == dropped_id) else {
        return ordered;
    };

    let position = if target_column == 0 {
        0
    } else {
        ordered
            .iter()
            .rposition(|c| c.column_start < target_column)
            .map_or(0, |i| i + 1)
    };

    ordered.insert(position, dropped.clone());
    ordered
}

/// Shrinks cards largest-first until `excess` hours are removed
///
/// Ties go to the earliest card in the slice. No card drops below one hour.
/// Returns the excess that could not be removed.
pub fn compress_largest_first(cards: &mut [TaskCard], excess: u32) -> u32 {
    let mut remaining = excess;

    while remaining > 0 {
        let Some(idx) = largest_shrinkable(cards) else {
            break;
        };

        let card = &mut cards[idx];
        let shrink = u8::try_from(remaining)
            .unwrap_or(u8::MAX)
            .min(card.hours - 1);

        debug!(card = %card.id, from = card.hours, by = shrink, "compressing card");
        card.hours -= shrink;
        remaining -= u32::from(shrink);
    }

    remaining
}

fn largest_shrinkable(cards: &[TaskCard]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, card) in cards.iter().enumerate() {
        if card.hours <= 1 {
            continue;
        }
        if best.map_or(true, |b| card.hours > cards[b].hours) {
            best = Some(i);
        }
    }
    best
}

/// Places cards in the given order at the first non-colliding column
fn pack_in_order(ordered: Vec<TaskCard>) -> (Vec<TaskCard>, usize) {
    let mut placed: Vec<TaskCard> = Vec::with_capacity(ordered.len());
    let mut fallbacks = 0;

    for card in ordered {
        let hours = card.hours;
        let column = (0..=SLOT_COLUMNS - hours).find(|&start| {
            let candidate = card.with_placement(hours, start);
            placed.iter().all(|p| !candidate.overlaps(p))
        });

        let column = match column {
            Some(column) => column,
            None => {
                warn!(card = %card.id, hours, "no free column left, placing at column 0");
                fallbacks += 1;
                0
            }
        };

        placed.push(card.with_placement(hours, column));
    }

    (placed, fallbacks)
}

/// Compresses (if needed) and packs cards that are already in packing order
fn compress_and_pack(mut ordered: Vec<TaskCard>) -> PackReport {
    for card in &mut ordered {
        card.hours = card.normalized_hours();
    }

    let total = total_hours(&ordered);
    let budget = u32::from(SLOT_COLUMNS);
    let unresolved_excess = if total > budget {
        debug!(total, excess = total - budget, "slot over budget");
        let left = compress_largest_first(&mut ordered, total - budget);
        if left > 0 {
            warn!(unresolved = left, "cards cannot shrink further");
        }
        left
    } else {
        0
    };

    let (cards, fallbacks) = pack_in_order(ordered);
    PackReport {
        cards,
        fallbacks,
        unresolved_excess,
    }
}

/// Repositions a slot after `dropped_id` lands on `target_column`
///
/// See [`smart_compress_and_position`] for the plain card list.
pub fn smart_compress_report(cards: &[TaskCard], dropped_id: &CardId, target_column: u8) -> PackReport {
    compress_and_pack(insertion_order(cards, dropped_id, target_column))
}

/// Repositions a slot after `dropped_id` lands on `target_column`
///
/// Returns cards in packing order with updated `hours`/`column_start`.
/// If no card carries `dropped_id` the list is simply left-packed.
pub fn smart_compress_and_position(
    cards: &[TaskCard],
    dropped_id: &CardId,
    target_column: u8,
) -> Vec<TaskCard> {
    smart_compress_report(cards, dropped_id, target_column).cards
}

/// Left-packs a slot in visual order, compressing only if over budget
pub fn left_pack_report(cards: &[TaskCard]) -> PackReport {
    let mut ordered = cards.to_vec();
    ordered.sort_by_key(|c| c.column_start);
    compress_and_pack(ordered)
}

/// Left-packs a slot whose columns may be stale or overlapping
///
/// Already-packed input is a fixed point.
pub fn left_pack_only(cards: &[TaskCard]) -> Vec<TaskCard> {
    left_pack_report(cards).cards
}
