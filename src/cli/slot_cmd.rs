//! Slot commands (column, drop, place, pack, check, show)

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::debug;

use super::output::Output;
use crate::domain::{
    calculate_column_based_rearrangement, calculate_drop_column,
    calculate_optimal_layout_with_new_task, left_pack_report, total_hours, validate_layout,
    CardId, CardStyle, TaskCard, SLOT_COLUMNS,
};
use crate::storage::{CardFile, Config};

/// Where a dropped card should land
pub enum Target {
    Column(u8),
    Pointer {
        x: f64,
        left: Option<f64>,
        width: Option<f64>,
    },
}

impl Target {
    fn resolve(&self, config: &Config) -> u8 {
        match *self {
            Target::Column(column) => column,
            Target::Pointer { x, left, width } => {
                calculate_drop_column(x, config.project.layout.bounds(left, width))
            }
        }
    }
}

pub struct DropRequest<'a> {
    pub id: &'a str,
    pub hours: Option<u8>,
    pub title: Option<&'a str>,
    pub target: Target,
    pub write: bool,
}

/// Print the column under a pointer position
pub fn column(
    output: &Output,
    config: &Config,
    x: f64,
    left: Option<f64>,
    width: Option<f64>,
) -> Result<()> {
    let bounds = config.project.layout.bounds(left, width);
    let column = calculate_drop_column(x, bounds);

    if output.is_json() {
        output.data(&serde_json::json!({
            "x": x,
            "bounds": bounds,
            "column": column,
        }));
    } else {
        println!("{}", column);
    }

    Ok(())
}

/// Drop a card into the slot held in `path`
pub fn drop_card(output: &Output, config: &Config, path: &Path, request: DropRequest<'_>) -> Result<()> {
    let file = CardFile::new(path);
    let existing = file.read_all()?;
    let id: CardId = request.id.parse()?;

    let dropped = match existing.iter().find(|c| c.id == id) {
        Some(card) => {
            debug!(card = %id, "card already in slot, moving it");
            let mut card = card.clone();
            if let Some(hours) = request.hours {
                card.hours = hours;
            }
            if let Some(title) = request.title {
                card.title = title.to_string();
            }
            card
        }
        None => TaskCard::new(
            id.clone(),
            request.hours.unwrap_or(config.project.layout.default_hours),
            0,
        )
        .titled(request.title.unwrap_or_default()),
    };

    let target_column = request.target.resolve(config);
    let outcome = calculate_column_based_rearrangement(&existing, &dropped, target_column);
    let changed = outcome.changed_cards(&existing);

    if outcome.can_drop && request.write {
        file.write_all(&outcome.new_arrangement)?;
        debug!(path = %file.path().display(), "wrote new layout");
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "target_column": target_column,
            "can_drop": outcome.can_drop,
            "new_arrangement": outcome.new_arrangement,
            "reason": outcome.reason,
            "changed": changed,
            "written": outcome.can_drop && request.write,
        }));
        return Ok(());
    }

    match &outcome.reason {
        Some(reason) => println!("Cannot drop {}: {}", id, reason),
        None => {
            println!("Dropped {} at column {}", id, target_column);
            if !changed.is_empty() {
                let ids: Vec<_> = changed.iter().map(|c| c.id.to_string()).collect();
                println!("Changed: {}", ids.join(", "));
            }
            println!();
            output.slot(&outcome.new_arrangement);
        }
    }

    Ok(())
}

/// Place a new card without a pointer position
pub fn place_card(
    output: &Output,
    config: &Config,
    path: &Path,
    title: &str,
    id: Option<&str>,
    hours: Option<u8>,
    write: bool,
) -> Result<()> {
    let file = CardFile::new(path);
    let existing = file.read_all()?;

    let id = match id {
        Some(id) => id.parse()?,
        None => CardId::generate(title, Utc::now()),
    };
    let preferred = hours.unwrap_or(config.project.layout.default_hours);
    let new_task = TaskCard::new(id.clone(), preferred, 0).titled(title);

    let outcome = calculate_optimal_layout_with_new_task(&existing, &new_task, preferred);

    if outcome.can_place && write {
        file.write_all(&outcome.final_layout)?;
        debug!(path = %file.path().display(), "wrote new layout");
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "outcome": outcome,
            "written": outcome.can_place && write,
        }));
        return Ok(());
    }

    match &outcome.reason {
        Some(reason) => println!("Cannot place {}: {}", id, reason),
        None => {
            println!(
                "Placed {} with {}h (requested {}h)",
                id, outcome.new_task_hours, preferred
            );
            if !outcome.tasks_to_update.is_empty() {
                let ids: Vec<_> = outcome
                    .tasks_to_update
                    .iter()
                    .map(|c| c.id.to_string())
                    .collect();
                println!("Changed: {}", ids.join(", "));
            }
            println!();
            output.slot(&outcome.final_layout);
        }
    }

    Ok(())
}

/// Left-pack a slot
pub fn pack(output: &Output, path: &Path, write: bool) -> Result<()> {
    let file = CardFile::new(path);
    let existing = file.read_all()?;
    let report = left_pack_report(&existing);

    if !report.is_clean() {
        anyhow::bail!(
            "Slot cannot be packed: {} cards do not fit in {} columns",
            existing.len(),
            SLOT_COLUMNS
        );
    }

    if write {
        file.write_all(&report.cards)?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "cards": report.cards,
            "written": write,
        }));
    } else {
        output.slot(&report.cards);
    }

    Ok(())
}

/// Validate a slot's layout
pub fn check(output: &Output, path: &Path) -> Result<()> {
    let file = CardFile::new(path);
    let cards = file.read_all()?;

    match validate_layout(&cards) {
        Ok(()) => {
            let hours = total_hours(&cards);
            if output.is_json() {
                output.data(&serde_json::json!({
                    "valid": true,
                    "cards": cards.len(),
                    "hours": hours,
                }));
            } else {
                println!(
                    "Slot OK: {} card(s), {}/{} hours",
                    cards.len(),
                    hours,
                    SLOT_COLUMNS
                );
            }
            Ok(())
        }
        Err(e) => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                }));
            }
            anyhow::bail!("Layout invalid: {}", e)
        }
    }
}

/// Show a slot
pub fn show(output: &Output, path: &Path) -> Result<()> {
    let file = CardFile::new(path);
    let mut cards = file.read_all()?;
    cards.sort_by_key(|c| c.column_start);

    if output.is_json() {
        let items: Vec<_> = cards
            .iter()
            .map(|c| {
                let style = CardStyle::for_card(c);
                serde_json::json!({
                    "id": c.id,
                    "title": c.title,
                    "hours": c.hours,
                    "column_start": c.column_start,
                    "left_percent": style.left,
                    "width_percent": style.width,
                })
            })
            .collect();
        output.data(&items);
    } else {
        output.slot(&cards);
    }

    Ok(())
}
