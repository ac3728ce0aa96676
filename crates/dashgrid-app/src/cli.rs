//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and edit a saved dashboard layout.
#[derive(Debug, Parser)]
#[command(name = "dashgrid", version, about)]
pub struct Cli {
    /// Directory holding the layout (defaults to the platform data dir).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// JSON engine configuration.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, global = true, default_value_t = 1280)]
    pub width: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current layout as JSON.
    Show,
    /// List widget types, optionally filtered.
    Catalog {
        query: Option<String>,
    },
    /// Add a widget of the given type.
    Add {
        widget_type: String,
    },
    /// Remove a widget by id.
    Remove {
        id: String,
    },
    /// Restore the default layout for the viewport.
    Reset,
    /// Apply a JSON script of pointer and viewport steps.
    Replay {
        script: PathBuf,
    },
}
