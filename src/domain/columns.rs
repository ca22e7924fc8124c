//! Column arithmetic for a four-column slot
//!
//! A slot is four hours wide and drawn as four equal columns. These helpers
//! are stateless: they map pixels to columns, build occupancy bitmaps, find
//! free runs and check placements.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::card::TaskCard;
use super::id::CardId;

/// Number of columns (hours) in a slot
pub const SLOT_COLUMNS: u8 = 4;

/// Hard ceiling on cards that may share a slot
pub const MAX_CARDS_PER_SLOT: usize = 4;

/// Horizontal bounding box of a slot, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotBounds {
    pub left: f64,
    pub width: f64,
}

impl SlotBounds {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }
}

/// Maps a horizontal pointer position to the column under it
///
/// The slot width is split into four equal bands; the offset from the
/// slot's left edge is floored into a band and clamped to `0..=3`.
pub fn calculate_drop_column(drop_x: f64, bounds: SlotBounds) -> u8 {
    if !drop_x.is_finite() || !bounds.left.is_finite() || !bounds.width.is_finite() {
        return 0;
    }
    if bounds.width <= 0.0 {
        return 0;
    }

    let band = bounds.width / f64::from(SLOT_COLUMNS);
    let column = ((drop_x - bounds.left) / band).floor();
    column.clamp(0.0, f64::from(SLOT_COLUMNS - 1)) as u8
}

/// Marks every column covered by a card
pub fn occupancy_bitmap(cards: &[TaskCard]) -> [bool; SLOT_COLUMNS as usize] {
    let mut occupied = [false; SLOT_COLUMNS as usize];
    for card in cards {
        for col in card.range() {
            if let Some(slot) = occupied.get_mut(usize::from(col)) {
                *slot = true;
            }
        }
    }
    occupied
}

/// First start column whose `needed_hours`-wide window is free
pub fn leftmost_free_run(cards: &[TaskCard], needed_hours: u8) -> Option<u8> {
    if !(1..=SLOT_COLUMNS).contains(&needed_hours) {
        return None;
    }

    let occupied = occupancy_bitmap(cards);
    (0..=SLOT_COLUMNS - needed_hours).find(|&start| {
        (start..start + needed_hours).all(|col| !occupied[usize::from(col)])
    })
}

/// Card width as a percentage of the slot
pub fn width_percentage(hours: u8) -> f64 {
    f64::from(hours) / f64::from(SLOT_COLUMNS) * 100.0
}

/// Card left offset as a percentage of the slot
pub fn left_percentage(column_start: u8) -> f64 {
    f64::from(column_start) / f64::from(SLOT_COLUMNS) * 100.0
}

/// Returns true if a card of `hours` starting at `column_start` fits the slot
pub fn is_valid_placement(hours: u8, column_start: u8) -> bool {
    (1..=SLOT_COLUMNS).contains(&hours)
        && column_start < SLOT_COLUMNS
        && u16::from(column_start) + u16::from(hours) <= u16::from(SLOT_COLUMNS)
}

/// Sum of hours across cards
pub fn total_hours(cards: &[TaskCard]) -> u32 {
    cards.iter().map(|c| u32::from(c.hours)).sum()
}

/// Hours left in the slot (zero when already over budget)
pub fn available_hours(cards: &[TaskCard]) -> u8 {
    let used = total_hours(cards);
    u8::try_from(u32::from(SLOT_COLUMNS).saturating_sub(used)).unwrap_or(0)
}

/// Render position of a card, as CSS-style percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardStyle {
    pub left: f64,
    pub width: f64,
}

impl CardStyle {
    pub fn for_card(card: &TaskCard) -> Self {
        Self {
            left: left_percentage(card.column_start),
            width: width_percentage(card.hours),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("Slot holds {0} cards (4 maximum)")]
    TooManyCards(usize),

    #[error("Card {id} has invalid placement: {hours}h at column {column_start}")]
    InvalidPlacement {
        id: CardId,
        hours: u8,
        column_start: u8,
    },

    #[error("Cards {0} and {1} overlap")]
    Overlap(CardId, CardId),

    #[error("Slot uses {0} hours (4 maximum)")]
    OverBudget(u32),

    #[error("Card {0} appears more than once")]
    DuplicateId(CardId),
}

/// Checks a slot against every layout invariant, reporting the first violation
///
/// Order does not matter here; callers that care about visual order sort by
/// `column_start` first.
pub fn validate_layout(cards: &[TaskCard]) -> Result<(), LayoutError> {
    if cards.len() > MAX_CARDS_PER_SLOT {
        return Err(LayoutError::TooManyCards(cards.len()));
    }

    for (i, card) in cards.iter().enumerate() {
        if cards[..i].iter().any(|c| c.id == card.id) {
            return Err(LayoutError::DuplicateId(card.id.clone()));
        }
        if !card.is_valid() {
            return Err(LayoutError::InvalidPlacement {
                id: card.id.clone(),
                hours: card.hours,
                column_start: card.column_start,
            });
        }
    }

    let total = total_hours(cards);
    if total > u32::from(SLOT_COLUMNS) {
        return Err(LayoutError::OverBudget(total));
    }

    for (i, a) in cards.iter().enumerate() {
        if let Some(b) = cards[i + 1..].iter().find(|b| a.overlaps(b)) {
            return Err(LayoutError::Overlap(a.id.clone(), b.id.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u32, hours: u8, column_start: u8) -> TaskCard {
        TaskCard::new(CardId::from(id), hours, column_start)
    }

    #[test]
    fn drop_column_bands() {
        let bounds = SlotBounds::new(100.0, 200.0);
        assert_eq!(calculate_drop_column(100.0, bounds), 0);
        assert_eq!(calculate_drop_column(149.9, bounds), 0);
        assert_eq!(calculate_drop_column(150.0, bounds), 1);
        assert_eq!(calculate_drop_column(210.0, bounds), 2);
        assert_eq!(calculate_drop_column(299.0, bounds), 3);
    }

    #[test]
    fn drop_column_clamps_outside_slot() {
        let bounds = SlotBounds::new(100.0, 200.0);
        assert_eq!(calculate_drop_column(20.0, bounds), 0);
        assert_eq!(calculate_drop_column(300.0, bounds), 3);
        assert_eq!(calculate_drop_column(5000.0, bounds), 3);
    }

    #[test]
    fn drop_column_degenerate_bounds() {
        assert_eq!(calculate_drop_column(50.0, SlotBounds::new(0.0, 0.0)), 0);
        assert_eq!(calculate_drop_column(50.0, SlotBounds::new(0.0, -10.0)), 0);
        assert_eq!(calculate_drop_column(f64::NAN, SlotBounds::new(0.0, 100.0)), 0);
    }

    #[test]
    fn bitmap_marks_ranges() {
        let cards = vec![card(1, 1, 0), card(2, 2, 2)];
        assert_eq!(occupancy_bitmap(&cards), [true, false, true, true]);
        assert_eq!(occupancy_bitmap(&[]), [false; 4]);
    }

    #[test]
    fn bitmap_ignores_columns_past_the_slot() {
        let cards = vec![card(1, 3, 2)];
        assert_eq!(occupancy_bitmap(&cards), [false, false, true, true]);
    }

    #[test]
    fn free_run_scan() {
        let cards = vec![card(1, 1, 0), card(2, 1, 2)];
        assert_eq!(leftmost_free_run(&cards, 1), Some(1));
        assert_eq!(leftmost_free_run(&cards, 2), None);

        let cards = vec![card(1, 2, 0)];
        assert_eq!(leftmost_free_run(&cards, 2), Some(2));
        assert_eq!(leftmost_free_run(&cards, 3), None);
        assert_eq!(leftmost_free_run(&[], 4), Some(0));
    }

    #[test]
    fn free_run_rejects_out_of_range_widths() {
        assert_eq!(leftmost_free_run(&[], 0), None);
        assert_eq!(leftmost_free_run(&[], 5), None);
    }

    #[test]
    fn percentages() {
        assert_eq!(width_percentage(1), 25.0);
        assert_eq!(width_percentage(4), 100.0);
        assert_eq!(left_percentage(0), 0.0);
        assert_eq!(left_percentage(3), 75.0);

        let style = CardStyle::for_card(&card(1, 2, 1));
        assert_eq!(style, CardStyle { left: 25.0, width: 50.0 });
    }

    #[test]
    fn placement_bounds() {
        assert!(is_valid_placement(1, 0));
        assert!(is_valid_placement(4, 0));
        assert!(is_valid_placement(1, 3));
        assert!(!is_valid_placement(0, 0));
        assert!(!is_valid_placement(2, 3));
        assert!(!is_valid_placement(1, 4));
        assert!(!is_valid_placement(255, 255));
    }

    #[test]
    fn hours_budget() {
        let cards = vec![card(1, 2, 0), card(2, 1, 2)];
        assert_eq!(total_hours(&cards), 3);
        assert_eq!(available_hours(&cards), 1);

        let over = vec![card(1, 4, 0), card(2, 2, 0)];
        assert_eq!(available_hours(&over), 0);
    }

    #[test]
    fn validate_accepts_packed_slot() {
        let cards = vec![card(1, 2, 0), card(2, 1, 2), card(3, 1, 3)];
        assert_eq!(validate_layout(&cards), Ok(()));
        assert_eq!(validate_layout(&[]), Ok(()));
    }

    #[test]
    fn validate_reports_violations() {
        let five: Vec<_> = (1..=5).map(|i| card(i, 1, 0)).collect();
        assert_eq!(validate_layout(&five), Err(LayoutError::TooManyCards(5)));

        assert!(matches!(
            validate_layout(&[card(1, 2, 3)]),
            Err(LayoutError::InvalidPlacement { .. })
        ));

        assert_eq!(
            validate_layout(&[card(1, 2, 0), card(2, 2, 1)]),
            Err(LayoutError::Overlap(CardId::from(1u32), CardId::from(2u32)))
        );

        assert_eq!(
            validate_layout(&[card(1, 1, 0), card(1, 1, 1)]),
            Err(LayoutError::DuplicateId(CardId::from(1u32)))
        );
    }

    #[test]
    fn validate_reports_budget_before_overlap() {
        let cards = vec![card(1, 3, 0), card(2, 2, 2)];
        assert_eq!(validate_layout(&cards), Err(LayoutError::OverBudget(5)));
    }
}
