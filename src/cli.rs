use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::DirsnapConfig;
use crate::diff::DiffAlgorithmType;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "dirsnap")]
#[command(author = "xicv")]
#[command(version)]
#[command(about = "Compare files and directory trees against stored snapshots")]
#[command(
    long_about = "dirsnap compares received output (a file or a directory tree) against a \
                  stored snapshot, prints a unified diff with word-level marks, and accepts \
                  or deletes stored snapshots."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE", help = "Configuration file to load")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare received output against a snapshot
    Diff(DiffArgs),
    /// Store received output as a snapshot
    Accept {
        /// File or directory to store
        received: PathBuf,
        /// Snapshot collection location
        location: PathBuf,
        /// Snapshot name inside the location
        name: String,
    },
    /// Delete a stored snapshot
    Delete {
        /// Stored snapshot path
        location: PathBuf,
    },
}

#[derive(clap::Args)]
pub struct DiffArgs {
    /// Received file or directory
    pub received: PathBuf,

    /// Snapshot file or directory
    pub snapshot: PathBuf,

    /// Ignore additional name patterns
    #[arg(long, value_delimiter = ',', help = "Additional name patterns to ignore")]
    pub ignore: Option<Vec<String>>,

    /// Diff context lines
    #[arg(long, help = "Number of context lines in diffs")]
    pub context: Option<usize>,

    /// Line diff algorithm
    #[arg(long, help = "Line diff algorithm")]
    pub algorithm: Option<DiffAlgorithmType>,

    /// Output format
    #[arg(long, default_value = "text", help = "Output format")]
    pub output: OutputFormat,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Unified diff lines (default)
    Text,
    /// JSON report for scripting
    Json,
}

impl Cli {
    /// Resolve configuration: file (or defaults), then environment, then flags.
    pub fn load_config(&self) -> Result<DirsnapConfig> {
        let mut config = match &self.config {
            Some(path) => DirsnapConfig::from_toml_file(path)?,
            None => DirsnapConfig::default(),
        };
        config.apply_env();

        if let Command::Diff(args) = &self.command {
            if let Some(ignore) = &args.ignore {
                config.filter.ignore.extend(ignore.iter().cloned());
            }
            if let Some(context) = args.context {
                config.diff.context_lines = context;
            }
            if let Some(algorithm) = args.algorithm {
                config.diff.algorithm = algorithm;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        match &self.command {
            Command::Diff(args) => {
                require_exists(&args.received)?;
                require_exists(&args.snapshot)
            }
            Command::Accept { received, name, .. } => {
                require_exists(received)?;
                if name.is_empty() || name.contains(['/', '\\']) {
                    return Err(format!("Invalid snapshot name: {:?}", name));
                }
                Ok(())
            }
            Command::Delete { .. } => Ok(()),
        }
    }
}

fn require_exists(path: &Path) -> std::result::Result<(), String> {
    if !path.exists() {
        return Err(format!("Path does not exist: {}", path.display()));
    }
    Ok(())
}

/// Wrap a rendered diff line in ANSI colors based on its prefix.
///
/// The line itself is never altered.
pub fn colorize(line: &str) -> String {
    let color = if line.starts_with("+++") || line.starts_with("---") {
        "\x1b[1m"
    } else if line.starts_with("@@") {
        "\x1b[36m"
    } else if line.starts_with('+') {
        "\x1b[32m"
    } else if line.starts_with('-') {
        "\x1b[31m"
    } else {
        return line.to_string();
    };
    format!("{}{}\x1b[0m", color, line)
}
