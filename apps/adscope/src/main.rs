//! # Adscope - Campaign Analytics Dashboard
//!
//! Command-line driver for the filter-constraint engine and cascading-fetch
//! orchestrator in `adscope-core`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/adscope (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │───▶│  Dashboard  │───▶│  HTTP client     │────┼──▶ analytics
//! │  │  (clap)     │    │  (JoinSet)  │    │  (reqwest)       │    │    service
//! │  └─────────────┘    └──────┬──────┘    └──────────────────┘    │
//! │                            ▼                                    │
//! │                    ┌───────────────┐                            │
//! │                    │ adscope-core  │                            │
//! │                    │ (THE LOGIC)   │                            │
//! │                    └───────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! adscope dates last_week
//! adscope constraints --channel facebook --select publisher_platform
//! adscope report -r last_month --channel instagram -b gender=female
//! adscope replay --file session.toml
//! ```

use adscope::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ADSCOPE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ADSCOPE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "adscope=info,adscope_core=info".into());

    // Logs go to stderr; stdout carries command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Adscope startup banner.
fn print_banner() {
    println!(
        r#"
   __ _  __| |___  ___ ___  _ __   ___
  / _` |/ _` / __|/ __/ _ \| '_ \ / _ \
 | (_| | (_| \__ \ (_| (_) | |_) |  __/
  \__,_|\__,_|___/\___\___/| .__/ \___|
                           |_|
  Campaign Analytics Dashboard v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
