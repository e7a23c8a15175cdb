//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod crawl;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use gallerycrawl::config::Settings;
use gallerycrawl::scrapers::{NavigationFailurePolicy, ScrollStrategyType};
use gallerycrawl::services::parse_listing_date;

#[derive(Parser)]
#[command(name = "gallerycrawl")]
#[command(about = "Collect photo gallery posts within a date range into a spreadsheet")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "GALLERYCRAWL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the gallery listing and export posts within the date range
    Crawl {
        /// First day to include (YYYY-MM-DD or YYYY.MM.DD, default: 7 days ago)
        #[arg(short, long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD or YYYY.MM.DD, default: today)
        #[arg(short, long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
        /// Highest page index to visit
        #[arg(long)]
        max_pages: Option<u32>,
        /// Directory for the exported spreadsheet
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Show the browser window
        #[arg(long)]
        no_headless: bool,
        /// What to do when a page fails to load
        #[arg(long, value_enum)]
        on_navigation_error: Option<NavigationFailurePolicy>,
        /// How to wait for lazily loaded posts
        #[arg(long, value_enum)]
        scroll_strategy: Option<ScrollStrategyType>,
        /// Skip writing the spreadsheet
        #[arg(long)]
        no_export: bool,
        /// Print collected records as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Check how a listing date string is parsed
    ParseDate {
        /// Date strings to parse
        #[arg(required = true)]
        values: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default config file
    Init {
        /// Destination (default: user config directory)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_listing_date(value).map_err(|e| e.to_string())
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            start,
            end,
            max_pages,
            output_dir,
            no_headless,
            on_navigation_error,
            scroll_strategy,
            no_export,
            json,
        } => {
            let mut settings = Settings::load(cli.config.as_deref()).await?;
            if let Some(max_pages) = max_pages {
                settings.crawl.max_pages = max_pages;
            }
            if let Some(dir) = output_dir {
                settings.output.directory = dir;
            }
            if no_headless {
                settings.browser.headless = false;
            }
            if let Some(policy) = on_navigation_error {
                settings.crawl.on_navigation_error = policy;
            }
            if let Some(strategy) = scroll_strategy {
                settings.crawl.scroll.strategy = strategy;
            }

            crawl::cmd_crawl(
                &settings,
                crawl::CrawlOptions {
                    start,
                    end,
                    export: !no_export,
                    json,
                },
            )
            .await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(cli.config.as_deref()).await,
            ConfigCommands::Init { path, force } => {
                config_cmd::cmd_config_init(path.as_deref(), force)
            }
        },
        Commands::ParseDate { values } => config_cmd::cmd_parse_date(&values),
    }
}
