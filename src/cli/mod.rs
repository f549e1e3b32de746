use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::glossary::Game;

#[derive(Parser)]
#[command(name = "tra-glossary")]
#[command(author, version, about = "Build bilingual glossaries from WeiDU TRA dialogue files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a glossary from paired source/target TRA files
    Build(BuildArgs),

    /// Parse a single TRA file and report its structure
    Check(CheckArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., general.source_dir)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show config file path
    Path,

    /// Edit config file with default editor
    Edit,
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Games to process (default: all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub games: Vec<Game>,

    /// Root directory holding <game>/<lang>/<file> TRA trees
    #[arg(short, long)]
    pub source_dir: Option<PathBuf>,

    /// Output glossary JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extract recurring terms into term_frequency
    #[arg(long, default_value_t = false)]
    pub extract_terms: bool,

    /// Include per-game statistics in metadata
    #[arg(long, default_value_t = false)]
    pub include_stats: bool,

    /// JSON indent width (0 for compact output)
    #[arg(long)]
    pub indent: Option<usize>,

    /// Pattern table TOML replacing the built-in stop words and categories
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// Also write a category-grouped noun glossary (implies --extract-terms)
    #[arg(long)]
    pub nouns_output: Option<PathBuf>,

    /// Print a translation consistency report (implies --extract-terms)
    #[arg(long, default_value_t = false)]
    pub report: bool,
}

impl BuildArgs {
    pub fn wants_terms(&self) -> bool {
        self.extract_terms || self.nouns_output.is_some() || self.report
    }
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// TRA file to parse
    #[arg(required = true)]
    pub input: PathBuf,

    /// Treat the file as a target-language file (gender pairs allowed)
    #[arg(long, default_value_t = false)]
    pub target: bool,

    /// Maximum number of anomalies to list
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}
