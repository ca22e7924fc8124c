//! # Command-Line Interface
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Write a default `.slotpack/config.toml` |
//! | `column` | Map a pointer x position to a column |
//! | `drop` | Drop (or move) a card into a slot at a column |
//! | `place` | Place a new card by preferred hours, no pointer |
//! | `pack` | Left-pack a slot, healing overlaps |
//! | `check` | Validate a slot against the layout rules |
//! | `show` | Print a slot with render percentages |
//! | `config` | Print the effective configuration |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. `--verbose` enables debug
//! output; `SLOTPACK_LOG` takes an `EnvFilter` directive and
//! `SLOTPACK_LOG_FORMAT=json` switches to JSON lines.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod slot_cmd;

pub use app::{run, Cli, Commands};
pub use output::{render_bar, Output, OutputFormat};
