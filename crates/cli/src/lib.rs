mod clear;
mod index;
mod query;
mod shell;

use clap::{Parser, Subcommand};
use refdoc_core::config::RefdocConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "refdoc",
    version,
    about = "Browse and search the type graph of a Java API snapshot",
    long_about = "Refdoc loads a compact JSON dump of Java classes, members and type relationships, \
                  indexes the relationships between them and answers documentation queries: \
                  class details, inherited members rendered with concrete type arguments, \
                  relation lookups and a small search language."
)]
pub struct Cli {
    /// JSON config file (event base classes, cache directory, limits)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a snapshot and persist the result
    #[command(
        long_about = "Builds the relationship graph for a snapshot and stores it. \
                            By default, indices are stored in ~/.refdoc/indices/."
    )]
    Index {
        /// Path to the snapshot JSON file
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },
    /// Run a single shell command against a snapshot and exit
    #[command(
        long_about = "Accepts the same commands as the interactive shell, for example \
                            `refdoc query api.json fields java.util.ArrayList` or \
                            `refdoc query api.json search 'name=List&exact=true'`."
    )]
    Query {
        /// Path to the snapshot JSON file
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
        /// Print the raw result as JSON instead of tables
        #[arg(long)]
        json: bool,
        /// Shell command and its arguments
        #[arg(
            value_name = "COMMAND",
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        args: Vec<String>,
    },
    /// Start an interactive shell over a snapshot
    #[command(
        long_about = "Indexes the snapshot (or loads its stored index) and starts a shell \
                            where classes can be browsed and searched."
    )]
    Shell {
        /// Path to the snapshot JSON file
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },
    /// Clear stored indices
    #[command(
        long_about = "Removes stored index files. If a snapshot is provided, only that snapshot's \
                            index is removed. Otherwise, all indices are cleared."
    )]
    Clear {
        /// Path to the snapshot whose index should be removed (optional)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<RefdocConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(RefdocConfig::load(path)?),
        None => Ok(RefdocConfig::from_env()),
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let _guard = refdoc_core::logging::init_logging("cli", cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Index { snapshot } => rt.block_on(index::run(snapshot, config)),
        Commands::Query {
            snapshot,
            json,
            args,
        } => rt.block_on(query::run(snapshot, config, args, json)),
        // The shell drives the runtime itself; its line editor blocks.
        Commands::Shell { snapshot } => shell::run(&rt, snapshot, config),
        Commands::Clear { snapshot } => rt.block_on(clear::run(snapshot, config)),
    }
}
