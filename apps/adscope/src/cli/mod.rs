//! # Adscope CLI Module
//!
//! This module implements the CLI interface for Adscope.
//!
//! ## Available Commands
//!
//! - `dates` - Resolve date range tokens to concrete bounds
//! - `constraints` - Show a channel's breakdown compatibility table
//! - `report` - Apply filters, wait for dependent data, print the metrics report
//! - `replay` - Run a scripted sequence of filter mutations

mod commands;

use crate::config::AdscopeConfig;
use adscope_core::{AdscopeError, Channel, Dimension, Mutation, Selector};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Adscope - campaign analytics dashboard
///
/// Builds a filter over advertising-campaign data and fetches the
/// collections that depend on it from the analytics service.
#[derive(Parser, Debug)]
#[command(name = "adscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file (default: ./adscope.toml, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve date range tokens (all of them when none is given)
    Dates {
        /// Range token (today, this_week, last_week, last_month, last_year, maximum)
        token: Option<String>,
    },

    /// Show which breakdown dimensions can be combined on a channel
    Constraints {
        /// Channel (facebook, instagram, google, linkedIn)
        #[arg(short = 'C', long, default_value = "facebook")]
        channel: Channel,

        /// Show the enabled set after selecting this dimension
        #[arg(short, long)]
        select: Option<Dimension>,
    },

    /// Apply filters and print the metrics report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Apply a scripted sequence of mutations
    Replay {
        /// Path to the script (TOML, one [[step]] per mutation)
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Filter fields settable from the command line.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Date range token
    #[arg(short = 'r', long)]
    pub date_range: Option<String>,

    #[arg(long)]
    pub organization: Option<String>,

    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long)]
    pub campaign_type: Option<String>,

    #[arg(long)]
    pub delivery_type: Option<String>,

    #[arg(long)]
    pub campaign: Option<String>,

    /// Channel (facebook, instagram, google, linkedIn)
    #[arg(short = 'C', long)]
    pub channel: Option<Channel>,

    /// Breakdown as DIMENSION=VALUE (repeatable)
    #[arg(short, long = "breakdown", value_parser = parse_breakdown)]
    pub breakdowns: Vec<(Dimension, String)>,
}

impl FilterArgs {
    /// The mutations these flags describe. The channel goes first since
    /// switching it resets the enabled dimensions.
    pub fn mutations(&self) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        if let Some(channel) = self.channel {
            mutations.push(Mutation::Channel { channel });
        }
        if let Some(token) = &self.date_range {
            mutations.push(Mutation::DateRange {
                token: token.clone(),
            });
        }
        let selectors = [
            (Selector::Organization, &self.organization),
            (Selector::Source, &self.source),
            (Selector::Brand, &self.brand),
            (Selector::CampaignType, &self.campaign_type),
            (Selector::DeliveryType, &self.delivery_type),
            (Selector::Campaign, &self.campaign),
        ];
        mutations.extend(selectors.into_iter().filter_map(|(selector, value)| {
            value.as_ref().map(|value| Mutation::Select {
                selector,
                value: value.clone(),
            })
        }));
        for (dimension, value) in &self.breakdowns {
            mutations.push(Mutation::Dimension {
                dimension: *dimension,
                value: value.clone(),
            });
        }
        mutations
    }
}

/// Parse `DIMENSION=VALUE`.
fn parse_breakdown(raw: &str) -> Result<(Dimension, String), AdscopeError> {
    let (dimension, value) = raw
        .split_once('=')
        .ok_or_else(|| AdscopeError::UnknownDimension(raw.to_string()))?;
    Ok((dimension.trim().parse()?, value.trim().to_string()))
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AdscopeError> {
    let config = AdscopeConfig::load(cli.config.as_deref())?.with_env_overrides();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Dates { token }) => cmd_dates(&config, json_mode, token.as_deref()),
        Some(Commands::Constraints { channel, select }) => {
            cmd_constraints(json_mode, channel, select)
        }
        Some(Commands::Report { filters }) => {
            cmd_report(&config, json_mode, cli.verbose, &filters).await
        }
        Some(Commands::Replay { file }) => cmd_replay(&config, json_mode, &file).await,
        None => {
            // No subcommand - show the date ranges by default
            cmd_dates(&config, json_mode, None)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
