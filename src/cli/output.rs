//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::{occupancy_bitmap, CardStyle, TaskCard, SLOT_COLUMNS};
pub use crate::storage::OutputFormat;

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Callers normally render text themselves; pretty JSON is the fallback
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a slot as a table plus a column bar (text only)
    pub fn slot(&self, cards: &[TaskCard]) {
        if self.is_json() {
            return;
        }

        if cards.is_empty() {
            println!("(empty slot)");
            return;
        }

        println!("{}", render_bar(cards));
        println!();
        println!(
            "{:<12} {:>5} {:>4} {:>7} {:>7}  TITLE",
            "ID", "HOURS", "COL", "LEFT", "WIDTH"
        );
        println!("{}", "-".repeat(60));

        let mut sorted: Vec<_> = cards.iter().collect();
        sorted.sort_by_key(|c| c.column_start);
        for card in sorted {
            let style = CardStyle::for_card(card);
            println!(
                "{:<12} {:>5} {:>4} {:>6.1}% {:>6.1}%  {}",
                card.id, card.hours, card.column_start, style.left, style.width, card.title
            );
        }
    }
}

/// One cell per column: the covering card's id, or `.` when free
pub fn render_bar(cards: &[TaskCard]) -> String {
    let occupied = occupancy_bitmap(cards);
    let cells: Vec<String> = (0..SLOT_COLUMNS)
        .map(|col| {
            let label = if occupied[usize::from(col)] {
                cards
                    .iter()
                    .find(|c| c.range().contains(&col))
                    .map(|c| truncate(c.id.as_str(), 6))
                    .unwrap_or_default()
            } else {
                ".".to_string()
            };
            format!("{:^8}", label)
        })
        .collect();
    format!("|{}|", cells.join("|"))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
