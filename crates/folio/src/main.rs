//! Folio CLI - Markdown documentation renderer.
//!
//! Provides commands for:
//! - `render`: Render one document to HTML, diagrams included
//! - `nav`: Print the navigation sidebar
//! - `toggle`: Expand or collapse a sidebar folder
//! - `slugs`: List every addressable document

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{NavArgs, RenderArgs, SlugsArgs, ToggleArgs};
use output::Output;

/// Folio - Markdown documentation renderer.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true, env = "FOLIO_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to HTML.
    Render(RenderArgs),
    /// Print the navigation sidebar.
    Nav(NavArgs),
    /// Expand or collapse a folder in the sidebar.
    Toggle(ToggleArgs),
    /// List every addressable slug.
    Slugs(SlugsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
        Commands::Nav(args) => args.execute(),
        Commands::Toggle(args) => args.execute(),
        Commands::Slugs(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
