//! Domain models for slot packing
//!
//! Contains the layout logic without any I/O concerns. Every operation is a
//! pure function of its arguments; nothing is cached between calls.

mod id;
mod card;
mod columns;
mod compress;
mod drop;
mod placement;

pub use id::{CardId, IdError};
pub use card::{Period, TaskCard};
pub use columns::{
    available_hours, calculate_drop_column, is_valid_placement, left_percentage,
    leftmost_free_run, occupancy_bitmap, total_hours, validate_layout, width_percentage,
    CardStyle, LayoutError, SlotBounds, MAX_CARDS_PER_SLOT, SLOT_COLUMNS,
};
pub use compress::{
    compress_largest_first, insertion_order, left_pack_only, left_pack_report,
    smart_compress_and_position, smart_compress_report, PackReport,
};
pub use drop::{calculate_column_based_rearrangement, DropOutcome, DropRejection};
pub use placement::{calculate_optimal_layout_with_new_task, PlacementOutcome, PlacementStrategy};
