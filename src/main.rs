//! gallerycrawl - date-bounded crawler for JavaScript-rendered photo galleries.
//!
//! Paginates a gallery listing in a headless browser, keeps posts within a
//! date range, and exports them to a spreadsheet.

mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to stderr so `--json` output on stdout stays clean.
/// `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "gallerycrawl=info"
    } else {
        "gallerycrawl=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_logging(cli::is_verbose());

    cli::run().await
}
