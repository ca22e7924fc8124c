//! Main CLI application structure

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::output::{Output, OutputFormat};
use super::slot_cmd;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "slotpack")]
#[command(author, version, about = "Column packing for four-hour calendar slots")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .slotpack/config.toml with default settings
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Map a pointer position to a slot column
    Column {
        /// Pointer x position in pixels
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        /// Slot left edge in pixels
        #[arg(long, allow_hyphen_values = true)]
        left: Option<f64>,

        /// Slot width in pixels
        #[arg(long)]
        width: Option<f64>,
    },

    /// Drop a card into a slot at a column
    ///
    /// Examples:
    ///   slotpack drop slot.jsonl --id 7 --hours 2 --column 1
    ///   slotpack drop slot.jsonl --id 3 --x 130 --width 200   # move within slot
    Drop {
        /// Card file for the slot (`-` for stdin)
        file: PathBuf,

        /// Id of the dropped card
        #[arg(long)]
        id: String,

        /// Hours for the dropped card
        #[arg(long)]
        hours: Option<u8>,

        /// Target column (0-3)
        #[arg(long, conflicts_with = "x")]
        column: Option<u8>,

        /// Pointer x position, converted to a column
        #[arg(long, allow_hyphen_values = true)]
        x: Option<f64>,

        /// Slot left edge in pixels (with --x)
        #[arg(long, allow_hyphen_values = true, requires = "x")]
        left: Option<f64>,

        /// Slot width in pixels (with --x)
        #[arg(long, requires = "x")]
        width: Option<f64>,

        /// Title for a card that is new to the slot
        #[arg(long)]
        title: Option<String>,

        /// Write the new layout back to the file, keeping its JSONL or array shape
        #[arg(long)]
        write: bool,
    },

    /// Place a new card created outside a drag gesture
    Place {
        /// Card file for the slot (`-` for stdin)
        file: PathBuf,

        /// Card title
        #[arg(long)]
        title: String,

        /// Card id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Preferred hours
        #[arg(long)]
        hours: Option<u8>,

        /// Write the new layout back to the file, keeping its JSONL or array shape
        #[arg(long)]
        write: bool,
    },

    /// Left-pack a slot, healing overlaps and compressing if over budget
    Pack {
        /// Card file for the slot (`-` for stdin)
        file: PathBuf,

        /// Write the packed layout back to the file, keeping its JSONL or array shape
        #[arg(long)]
        write: bool,
    },

    /// Check a slot against the layout rules
    Check {
        /// Card file for the slot (`-` for stdin)
        file: PathBuf,
    },

    /// Show a slot's cards and render positions
    Show {
        /// Card file for the slot (`-` for stdin)
        file: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SLOTPACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "slotpack_cli=debug,warn"
        } else {
            "slotpack_cli=warn"
        })
    });

    let format = env::var("SLOTPACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // A subscriber may already be installed when run() is called twice in-process
    let _ = match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // init must work even when an existing config would fail validation
    if let Commands::Init { path } = &cli.command {
        let output = Output::new(cli.format.unwrap_or_default());
        let config_path = Config::init_project(path)?;
        debug!(path = %config_path.display(), "wrote project config");
        output.success(&format!("Initialized slotpack project at {}", path.display()));
        return Ok(());
    }

    let config = Config::load()?;
    let output = Output::new(cli.format.unwrap_or_else(|| config.effective_format()));
    debug!(project_root = ?config.project_root, "configuration loaded");

    match cli.command {
        // Handled before the config is loaded
        Commands::Init { .. } => {}

        Commands::Column { x, left, width } => {
            slot_cmd::column(&output, &config, x, left, width)?
        }

        Commands::Drop {
            file,
            id,
            hours,
            column,
            x,
            left,
            width,
            title,
            write,
        } => {
            let target = match (column, x) {
                (Some(column), _) => slot_cmd::Target::Column(column),
                (None, Some(x)) => slot_cmd::Target::Pointer { x, left, width },
                (None, None) => anyhow::bail!("Either --column or --x is required"),
            };
            let request = slot_cmd::DropRequest {
                id: &id,
                hours,
                title: title.as_deref(),
                target,
                write,
            };
            slot_cmd::drop_card(&output, &config, &file, request)?
        }

        Commands::Place {
            file,
            title,
            id,
            hours,
            write,
        } => slot_cmd::place_card(&output, &config, &file, &title, id.as_deref(), hours, write)?,

        Commands::Pack { file, write } => slot_cmd::pack(&output, &file, write)?,
        Commands::Check { file } => slot_cmd::check(&output, &file)?,
        Commands::Show { file } => slot_cmd::show(&output, &file)?,

        Commands::Config => show_config(&output, &config)?,
    }

    debug!("command completed");
    Ok(())
}

fn show_config(output: &Output, config: &Config) -> Result<()> {
    if output.is_json() {
        output.data(&serde_json::json!({
            "in_project": config.is_in_project(),
            "project_root": config.project_root.as_ref().map(|p| p.display().to_string()),
            "default_format": config.effective_format(),
            "layout": config.project.layout,
        }));
        return Ok(());
    }

    match &config.project_root {
        Some(root) => println!("Project: {}", root.display()),
        None => println!("Project: (none, using defaults)"),
    }
    if let Some(dir) = Config::global_config_dir() {
        println!("Global config dir: {}", dir.display());
    }
    println!();
    let rendered =
        toml::to_string_pretty(&config.project).context("Failed to render configuration")?;
    print!("{}", rendered);

    Ok(())
}
