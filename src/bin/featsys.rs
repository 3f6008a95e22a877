//! featsys CLI
//!
//! Bootstraps a feature catalog from catalog XML and reports what was
//! created.
//!
//! Usage:
//!   cargo run --features cli --bin featsys -- import config/catalog/agreement.xml
//!   cargo run --features cli --bin featsys -- import config/catalog/agreement.xml --json
//!
//! Logging follows RUST_LOG (default: warn).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use featsys::{ConfigLoader, FeatureSystem};

#[derive(Parser, Debug)]
#[command(name = "featsys")]
#[command(about = "Feature-structure catalog tools")]
struct Args {
    /// Directory holding featsys.yaml
    #[arg(long, env = "FEATSYS_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import every value item of a catalog file
    Import {
        /// Catalog XML file
        path: PathBuf,

        /// Print the resulting catalog as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let loader = match &args.config_dir {
        Some(dir) => ConfigLoader::new(dir),
        None => ConfigLoader::from_env(),
    };
    let config = loader.load()?;

    match args.command {
        Command::Import { path, json } => {
            let mut system = FeatureSystem::new(config);
            let summary = system.import_catalog_file(&path)?;

            if json {
                println!("{}", system.catalog().to_json()?);
                return Ok(());
            }

            println!("{} {}", "Imported".green().bold(), path.display());
            println!(
                "  values:   {} imported, {} skipped",
                summary.imported.len(),
                summary.skipped.len()
            );
            println!("  created:  {} catalog objects", summary.created);
            println!(
                "  catalog:  {} types, {} features, {} symbolic values",
                system.catalog().structure_type_count(),
                system.catalog().feature_count(),
                system.catalog().symbolic_value_count()
            );
            for skipped in &summary.skipped {
                println!("  {} {}", "skipped".yellow(), skipped);
            }
        }
    }

    Ok(())
}
