//! # Storage Layer
//!
//! File formats read and written by the CLI.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Slot cards | JSONL or JSON array | any path, or `-` for stdin |
//! | Project config | TOML | `.slotpack/config.toml` |
//! | Global config | TOML | platform config dir, `slotpack/config.toml` |
//!
//! Card files are rewritten atomically (temp file + rename) under an
//! exclusive `fs2` lock; reads take a shared lock.
//!
//! ## Key Types
//!
//! - [`CardFile`] - Read/write a slot's cards
//! - [`Config`] - Project and global configuration

mod cards;
mod config;

pub use cards::{parse_cards, CardFile};
pub use config::{Config, ConfigError, GlobalConfig, LayoutConfig, OutputFormat, ProjectConfig};
