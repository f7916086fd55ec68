//! # deck
//!
//! Command-line front end for `deck-core`.
//!
//! ## Commands
//! - `layers`: Partition an SVG file and list the discovered layers
//! - `partition`: Write the partitioned document (wrapper groups included)
//! - `frames`: Create frames and print the presentation model as JSON

mod commands;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deck")]
#[command(about = "Inspect and partition layered SVG presentations")]
#[command(version)]
struct Cli {
    /// JSON configuration file (frame defaults, id prefix, seed)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed for frame id generation (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the layers discovered in an SVG file
    Layers {
        /// Input SVG file
        file: PathBuf,
    },

    /// Write the partitioned SVG document
    Partition {
        /// Input SVG file
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create frames and print the presentation model as JSON
    Frames {
        /// Input SVG file
        file: PathBuf,

        /// Number of frames to create
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Labels of layers to hide before printing
        #[arg(long)]
        hide: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn init_logging(verbose: u8, json: bool) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let config = commands::load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Commands::Layers { file } => {
            let pres = commands::load_presentation(&file, config)?;
            print!("{}", commands::layer_table(&pres));
            Ok(())
        }
        Commands::Partition { file, output } => {
            let pres = commands::load_presentation(&file, config)?;
            commands::write_document(&pres, output.as_deref())
        }
        Commands::Frames {
            file,
            count,
            hide,
            pretty,
        } => {
            let mut pres = commands::load_presentation(&file, config)?;
            let json = commands::frames_json(&mut pres, count, &hide, pretty)?;
            println!("{json}");
            Ok(())
        }
    }
}
