//! Task card model
//!
//! A task card is one calendar assignment drawn inside a four-hour slot.
//! The packing code only reads and writes `hours` and `column_start`;
//! everything else is payload that passes through untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use super::columns::{is_valid_placement, SLOT_COLUMNS};
use super::id::CardId;

fn default_hours() -> u8 {
    1
}

/// Half-day period a slot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Am,
    Pm,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Am => write!(f, "AM"),
            Period::Pm => write!(f, "PM"),
        }
    }
}

/// A task card inside a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCard {
    /// Identifier, unique within the slot
    pub id: CardId,

    /// Duration in whole hours, one column per hour
    #[serde(default = "default_hours")]
    pub hours: u8,

    /// Leftmost column the card occupies
    #[serde(default, alias = "columnStart")]
    pub column_start: u8,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Any other fields, preserved as-is
    #[serde(flatten)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl TaskCard {
    /// Creates a card with the given placement and no payload
    pub fn new(id: CardId, hours: u8, column_start: u8) -> Self {
        Self {
            id,
            hours,
            column_start,
            title: String::new(),
            employee: None,
            date: None,
            period: None,
            meta: BTreeMap::new(),
        }
    }

    /// Sets the title (builder style)
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Exclusive end column
    pub fn column_end(&self) -> u8 {
        self.column_start.saturating_add(self.hours)
    }

    /// Occupied columns as a half-open range
    pub fn range(&self) -> Range<u8> {
        self.column_start..self.column_end()
    }

    /// Returns true if the two cards share at least one column
    pub fn overlaps(&self, other: &TaskCard) -> bool {
        self.column_start < other.column_end() && other.column_start < self.column_end()
    }

    /// Returns true if the card fits inside the slot on its own
    pub fn is_valid(&self) -> bool {
        is_valid_placement(self.hours, self.column_start)
    }

    /// Returns a copy with new hours and column, payload unchanged
    pub fn with_placement(&self, hours: u8, column_start: u8) -> Self {
        Self {
            hours,
            column_start,
            ..self.clone()
        }
    }

    /// Returns true if hours or column differ from `other`
    pub fn placement_differs(&self, other: &TaskCard) -> bool {
        self.hours != other.hours || self.column_start != other.column_start
    }

    /// Hours normalized the way incoming drops are: 0 means unset (1),
    /// anything wider than the slot is clamped
    pub fn normalized_hours(&self) -> u8 {
        match self.hours {
            0 => 1,
            h => h.min(SLOT_COLUMNS),
        }
    }
}
