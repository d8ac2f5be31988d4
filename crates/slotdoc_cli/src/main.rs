//! slotdoc CLI
//!
//! Command-line tools for slotdoc over a directory-backed slot store.
//!
//! # Commands
//!
//! - `encode` / `decode` - Raw bytes to base-91 text and back
//! - `compress` - Show compression diagnostics for a document
//! - `publish` - Publish a custom, saved or built-in document
//! - `load` - Reconstruct the published document
//! - `inspect` - Show slot records, sizes and fingerprint status
//! - `saved` - Manage documents saved on this machine

mod commands;

use clap::{Parser, Subcommand};
use slotdoc_core::TransportConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// slotdoc command-line tools.
#[derive(Parser)]
#[command(name = "slotdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the slot files and the local cache
    #[arg(global = true, short, long, default_value = ".slotdoc")]
    dir: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Per-slot byte budget
    #[arg(global = true, long, default_value_t = slotdoc_core::DEFAULT_SLOT_BUDGET)]
    budget: usize,

    /// Delay before the secondary slot write, in milliseconds
    #[arg(global = true, long, default_value = "300")]
    delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode raw bytes as base-91 text
    Encode {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Decode base-91 text to raw bytes
    Decode {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compress a document and print the record diagnostics as JSON
    Compress {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Include the encoded text in the output
        #[arg(long)]
        with_text: bool,
    },

    /// Publish a document to the slots
    Publish {
        /// Name of a custom document
        #[arg(short, long, requires = "input", conflicts_with_all = ["builtin", "saved"])]
        name: Option<String>,

        /// Custom document file ("-" for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Select a built-in document by name
        #[arg(short, long, conflicts_with = "saved")]
        builtin: Option<String>,

        /// Publish a document from the saved library
        #[arg(short, long)]
        saved: Option<String>,
    },

    /// Load and print the published document
    Load {
        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show slot records, sizes and fingerprint status
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Manage the saved document library
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum SavedAction {
    /// List saved document names
    List,

    /// Save a document under a name
    Save {
        /// Document name
        #[arg(short, long)]
        name: String,

        /// Document file ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print a saved document
    Show {
        /// Document name
        name: String,
    },

    /// Delete a saved document
    Delete {
        /// Document name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = TransportConfig::new()
        .slot_budget(cli.budget)
        .secondary_write_delay(Duration::from_millis(cli.delay_ms));

    match cli.command {
        Commands::Encode { input } => {
            commands::encode::run(input.as_deref())?;
        }
        Commands::Decode { input, output } => {
            commands::decode::run(input.as_deref(), output.as_deref())?;
        }
        Commands::Compress { input, with_text } => {
            commands::compress::run(input.as_deref(), with_text)?;
        }
        Commands::Publish {
            name,
            input,
            builtin,
            saved,
        } => {
            let source = match (name, input, builtin, saved) {
                (Some(name), Some(input), None, None) => {
                    commands::publish::Source::Custom { name, input }
                }
                (None, None, Some(name), None) => commands::publish::Source::Builtin(name),
                (None, None, None, Some(name)) => commands::publish::Source::Saved(name),
                _ => return Err("publish needs --name with --input, --builtin, or --saved".into()),
            };
            commands::publish::run(&cli.dir, config, source).await?;
        }
        Commands::Load { output, format } => {
            commands::load::run(&cli.dir, config, output.as_deref(), &format).await?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&cli.dir, config, &format)?;
        }
        Commands::Saved { action } => match action {
            SavedAction::List => commands::saved::list(&cli.dir)?,
            SavedAction::Save { name, input } => commands::saved::save(&cli.dir, &name, &input)?,
            SavedAction::Show { name } => commands::saved::show(&cli.dir, &name)?,
            SavedAction::Delete { name } => commands::saved::delete(&cli.dir, &name)?,
        },
        Commands::Version => {
            println!("slotdoc CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("slotdoc Core v{}", slotdoc_core::VERSION);
        }
    }

    Ok(())
}
