mod collection;
mod commands;
mod config;
mod diagnostics;
mod document;
mod dom;
mod error;
mod field;
mod markers;
mod options;
mod project;
mod record;
mod scanner;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::BuildOptions;
use crate::types::FileLayout;

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "htmlloc=info";

/// Extract translatable fields from `loc:`-marked HTML and render one copy
/// per culture.
#[derive(Parser)]
#[command(name = "htmlloc", version, about = "Localize static HTML files from a JSON translation record")]
struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan the record's directory, update the record, and write localized files
    Build {
        /// Project record (JSON); its directory is the site root
        project: PathBuf,
        /// Update the record without writing localized files
        #[arg(long)]
        extract_only: bool,
        /// Output layout: SubDirectory (dir/fr/page.html) or Extensions (dir/page.fr.html)
        #[arg(long, default_value = "SubDirectory")]
        file_layout: String,
        /// Drop fields that no longer appear in the markup, with their translations
        #[arg(long)]
        prune: bool,
    },
    /// Show translation progress per document and culture
    Status {
        /// Project record (JSON)
        project: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            project,
            extract_only,
            file_layout,
            prune,
        } => file_layout.parse::<FileLayout>().and_then(|layout| {
            let options = BuildOptions {
                extract_only,
                layout,
                prune,
            };
            commands::build(&project, &options)
        }),
        Commands::Status { project } => commands::status(&project),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
