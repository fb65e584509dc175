use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use dirsnap::{
    cli::{colorize, Cli, Command, DiffArgs, OutputFormat},
    compare::{CompareOptions, Comparison},
    config::DirsnapConfig,
    store::{Snapshot, SnapshotStore},
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(2);
    }

    cli.setup_logging();

    let config = cli.load_config().context("Failed to load configuration")?;

    let different = match &cli.command {
        Command::Diff(args) => run_diff(args, &config)?,
        Command::Accept { received, location, name } => {
            run_accept(received, location, name)?;
            false
        }
        Command::Delete { location } => {
            let name = location
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            SnapshotStore::delete(location, &[name])
                .with_context(|| format!("Failed to delete {}", location.display()))?;
            false
        }
    };

    if different {
        std::process::exit(1);
    }

    Ok(())
}

fn run_diff(args: &DiffArgs, config: &DirsnapConfig) -> Result<bool> {
    tracing::debug!(
        "Comparing {} against {}",
        args.received.display(),
        args.snapshot.display()
    );

    let options = CompareOptions::from_config(config)?;
    let comparison = Comparison::new(&args.received, &args.snapshot, &options)?;
    let different = comparison.is_different()?;

    match args.output {
        OutputFormat::Text => {
            for line in comparison.diff_lines() {
                let line = line?;
                if args.no_color {
                    println!("{}", line);
                } else {
                    println!("{}", colorize(&line));
                }
            }
        }
        OutputFormat::Json => print_json(&comparison, different)?,
    }

    if let Comparison::Tree(tree) = &comparison {
        for failure in tree.failures() {
            eprintln!("Error: {}", failure);
        }
    }

    Ok(different)
}

fn print_json(comparison: &Comparison, different: bool) -> Result<()> {
    let lines = comparison
        .diff_lines()
        .collect::<dirsnap::Result<Vec<String>>>()?;

    let report = match comparison {
        Comparison::Tree(tree) => serde_json::to_value(tree.report())?,
        Comparison::File(file) => serde_json::to_value(file.report()?)?,
    };

    let output = serde_json::json!({
        "different": different,
        "report": report,
        "lines": lines,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_accept(received: &Path, location: &Path, name: &str) -> Result<()> {
    let snapshot = Snapshot::new(name, received);
    let stored = SnapshotStore::write_snapshot(location, &snapshot)
        .with_context(|| format!("Failed to store snapshot {}", name))?;
    println!("Stored {}", stored.display());
    Ok(())
}
