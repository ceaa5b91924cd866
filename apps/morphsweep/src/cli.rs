//! Command line interface definition

use clap::{Parser, Subcommand};
use morphsweep_types::ColorChoice;
use std::path::PathBuf;

/// morphsweep - Remove residual polymorphic rows
#[derive(Parser)]
#[command(name = "morphsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Remove residual polymorphic rows from SQLite databases")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit structured debug logs on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Database to operate on (`sqlite:` URL or file path)
    #[arg(long, global = true, value_name = "URL")]
    pub database: Option<String>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Remove child rows whose polymorphic parent no longer exists
    #[command(alias = "sweep")]
    Clean {
        /// Only sweep the relations of this entity
        #[arg(long, value_name = "LABEL")]
        entity: Option<String>,

        /// Count residual rows without deleting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the morph relations an entity cascades through
    Relations {
        /// Entity label as stored in morph type columns
        label: String,
    },

    /// List declared entities
    #[command(alias = "ls")]
    Entities,

    /// Delete the polymorphic dependents of one record
    Delete {
        /// Entity label as stored in morph type columns
        label: String,

        /// Key of the record
        key: String,

        /// Also delete the record itself, in one transaction
        #[arg(long)]
        with_parent: bool,
    },
}
