use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use prototext::{
    generate_to_string, parse_from_file, schema_from_json, value_to_json, ParseOptions, TextError,
    UnknownFieldPolicy,
};

#[derive(Parser)]
#[command(name = "ptext")]
#[command(about = "Check, canonicalize, or convert text-format messages", long_about = None)]
struct Cli {
    /// Schema description in JSON form
    #[arg(short, long)]
    schema: PathBuf,

    /// Root message type name
    #[arg(short, long)]
    message: String,

    /// Skip unknown fields instead of failing on them
    #[arg(long)]
    allow_unknown: bool,

    /// Increase log verbosity (-v, -vv, ...)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a text message and report the first error, if any
    Check {
        /// Input text-format file
        input: PathBuf,
    },

    /// Parse a text message and reprint it in canonical form
    Canon {
        /// Input text-format file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a text message and dump it as pretty-printed JSON
    Json {
        /// Input text-format file
        input: PathBuf,
    },
}

fn main() -> Result<(), TextError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let schema_text = fs::read_to_string(&cli.schema)?;
    let schema = schema_from_json(&schema_text)?;

    let options = ParseOptions {
        on_unknown_field: if cli.allow_unknown {
            UnknownFieldPolicy::Skip
        } else {
            UnknownFieldPolicy::Error
        },
        ..ParseOptions::default()
    };

    match &cli.command {
        Commands::Check { input } => {
            parse_from_file(&schema, &cli.message, input, &options)?;
            println!("{}: OK", input.display());
            Ok(())
        }

        Commands::Canon { input, output } => {
            let value = parse_from_file(&schema, &cli.message, input, &options)?;
            let text = generate_to_string(&schema, &value)?;
            match output {
                Some(path) => fs::write(path, text)?,
                None => print!("{}", text),
            }
            Ok(())
        }

        Commands::Json { input } => {
            let value = parse_from_file(&schema, &cli.message, input, &options)?;
            println!("{}", value_to_json(&value)?);
            Ok(())
        }
    }
}
