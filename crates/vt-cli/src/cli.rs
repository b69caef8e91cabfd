//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vt_core::AllocationPolicy;

/// Voice track layout.
///
/// Spreads each character's time-stamped segments over non-overlapping
/// tracks and fills the holes between them with explicit silence.
#[derive(Debug, Parser)]
#[command(name = "vt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Allocate tracks and print the gap-filled layout.
    Layout(LayoutArgs),

    /// Check segment records without allocating.
    Validate(ValidateArgs),
}

/// Arguments for `vt layout`.
#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Segment records as a JSON array or JSON Lines (`-` for stdin).
    pub input: PathBuf,

    /// Print the layout as JSON.
    #[arg(long)]
    pub json: bool,

    /// Allocation policy: `contiguous` or `earliest-finish`.
    #[arg(long)]
    pub policy: Option<AllocationPolicy>,

    /// Time the first filler on each track is measured from.
    #[arg(long)]
    pub origin: Option<f64>,

    /// Allocate owners one at a time.
    #[arg(long)]
    pub serial: bool,
}

/// Arguments for `vt validate`.
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Segment records as a JSON array or JSON Lines (`-` for stdin).
    pub input: PathBuf,
}
