use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calyco_engine::cli::GlobalArgs;
use calyco_engine::cli::commands::{self, generate::GenerateTarget, scrape::ScrapeSource};

/// Parse a `YYYY-MM-DD` date
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

#[derive(Parser)]
#[command(name = "calyco")]
#[command(
    version,
    about = "Marketing content engine: signals, copy, images, QC, SEO and a static dashboard"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output directory (overrides output.dir)
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every step: scrape, generate, images, QC, SEO, export, dashboard
    Run,

    /// Collect market signals into raw/
    Scrape {
        #[arg(long, short, value_enum, default_value = "all")]
        source: ScrapeSource,
        #[arg(long = "profile", help = "Social profile to fetch (repeatable)")]
        profiles: Vec<String>,
    },

    /// Generate content from the collected signals
    Generate {
        #[arg(value_enum, default_value = "all")]
        target: GenerateTarget,
    },

    /// Generate one image through the provider fallback chain
    Image {
        #[arg(long, short, help = "Subject of the image")]
        prompt: String,
        #[arg(long, short, help = "File name stem under images/")]
        slug: String,
        #[arg(long, help = "Send the prompt as-is instead of the photo template")]
        raw: bool,
    },

    /// Run quality checks on a file
    Qc {
        #[arg(help = "Markdown, text or web copy JSON file")]
        file: PathBuf,
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Write JSON-LD for generated pages and refresh sitemap.xml
    Seo,

    /// Render dashboard.html over the output directory
    Dashboard,

    /// Export social posts as a dated CSV schedule
    Export {
        #[arg(long, value_parser = parse_date, help = "First post date (default: today, UTC)")]
        start: Option<NaiveDate>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Remove generated artifacts
    Clean {
        #[arg(long, help = "Also remove scraped data (the whole output directory)")]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcalyco encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    // API keys may live in a local .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = GlobalArgs {
        output: cli.output,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Run => {
            let rt = Runtime::new()?;
            rt.block_on(commands::run::run(&args))?;
        }
        Commands::Scrape { source, profiles } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::scrape::run(&args, source, profiles))?;
        }
        Commands::Generate { target } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::generate::run(&args, target))?;
        }
        Commands::Image { prompt, slug, raw } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::image::run(&args, &prompt, &slug, raw))?;
        }
        Commands::Qc { file, json } => {
            commands::qc::run(&args, &file, json)?;
        }
        Commands::Seo => {
            commands::seo::run(&args)?;
        }
        Commands::Dashboard => {
            commands::dashboard::run(&args)?;
        }
        Commands::Export { start } => {
            commands::export::run(&args, start)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
        Commands::Clean { all } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::clean::run(&args, all))?;
        }
    }

    Ok(())
}
