//! Slotpack - column packing for four-hour calendar slots
//!
//! Each half-day slot of a staff calendar is four hours wide and drawn as
//! four equal columns. Task cards occupy whole columns. This crate decides
//! where cards go when one is dropped into a slot or created from a form:
//! admission control, largest-first compression, and a gap-filling
//! left-pack that never produces overlapping cards.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{
    calculate_column_based_rearrangement, calculate_drop_column,
    calculate_optimal_layout_with_new_task, left_pack_only, smart_compress_and_position, CardId,
    DropOutcome, PlacementOutcome, SlotBounds, TaskCard,
};
