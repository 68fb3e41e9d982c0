//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical skill-mix taxonomies: validate, query, build and combine dimensions
#[derive(Parser, Debug)]
#[command(name = "skillmix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Dimension catalog directory (default: from config)
    #[arg(short = 'D', long, global = true, env = "SKILLMIX_DATA_DIR", value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate dimension files
    Validate {
        /// Dimension files
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },

    /// Show per-dimension statistics
    Stats {
        /// Dimension file or directory (default: data dir)
        #[arg(value_hint = ValueHint::AnyPath)]
        path: Option<PathBuf>,
    },

    /// Show a dimension as tree
    Tree {
        /// Dimension file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Deepest level to show
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Depth-aware queries over one dimension
    Query {
        /// Dimension file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(subcommand)]
        command: QueryCommands,
    },

    /// Build a dimension from a nested source description
    Build {
        /// Build request (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        request: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Enumerate combinations across the catalog
    Combine {
        /// Selection file (JSON array of selections)
        #[arg(value_hint = ValueHint::FilePath)]
        selection: PathBuf,
        /// Only print selected counts and the product size
        #[arg(long)]
        count: bool,
        /// Maximum combinations to print (default: combine.preview_limit)
        #[arg(long, conflicts_with = "all")]
        limit: Option<usize>,
        /// Print every combination
        #[arg(long)]
        all: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Items at exactly this depth
    At { depth: usize },
    /// Items at this depth or shallower
    Upto { depth: usize },
    /// Items at this depth or deeper
    From { depth: usize },
    /// Items at a depth under a parent
    Children { parent_id: String, depth: usize },
    /// All items below a parent
    Descendants { parent_id: String },
    /// Ancestors of an item, shallowest first
    Ancestors { item_id: String },
    /// Project an item onto a depth
    Expand { item_id: String, depth: usize },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a template config file
    Template,
}
