mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::catalog::SearchArgs;
use commands::documents::{GenerateArgs, PreviewArgs};
use commands::underwriting::{OfferArgs, ProjectArgs, UnderwriteArgs};
use commands::Settings;

/// Property underwriting and offer documents
#[derive(Parser)]
#[command(
    name = "uwx",
    version,
    about = "Property underwriting and offer documents",
    long_about = "Underwrite income properties with decimal precision, project ten years \
                  of cash flow, and generate underwriting workbooks (xlsx) and letters \
                  of intent (pdf)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Assumption set file (JSON or YAML); omitted values keep their defaults
    #[arg(long, global = true)]
    assumptions: Option<String>,

    /// Offer configuration file (JSON or YAML)
    #[arg(long, global = true)]
    offer_config: Option<String>,

    /// Log at debug level to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute income, expenses, debt service and returns for one asset
    Underwrite(UnderwriteArgs),
    /// Project annual cash flows
    Project(ProjectArgs),
    /// Build letter-of-intent terms
    Offer(OfferArgs),
    /// Show the data behind a document without rendering it
    Preview(PreviewArgs),
    /// Render a document and write it to disk
    Generate(GenerateArgs),
    /// Filter a catalog of assets
    Search(SearchArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn exit_with_error(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match Settings::load(cli.assumptions.as_deref(), cli.offer_config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => exit_with_error(e),
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Underwrite(args) => commands::underwriting::run_underwrite(args, &settings),
        Commands::Project(args) => commands::underwriting::run_project(args, &settings),
        Commands::Offer(args) => commands::underwriting::run_offer(args, &settings),
        Commands::Preview(args) => commands::documents::run_preview(args, &settings),
        Commands::Generate(args) => commands::documents::run_generate(args, &settings),
        Commands::Search(args) => commands::catalog::run_search(args),
        Commands::Version => {
            println!("uwx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => exit_with_error(e),
    }
}
