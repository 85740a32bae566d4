//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::FilterArgs;
use crate::client::{ClientError, HttpAnalyticsClient};
use crate::config::AdscopeConfig;
use crate::dashboard::Dashboard;
use adscope_core::{
    AdscopeError, Channel, Clock, Collection, ConstraintGraph, DateBounds, DateRange, Dimension,
    FetchOrchestrator, FilterState, Mutation, Report, Selector, SystemClock,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;

// =============================================================================
// SHARED HELPERS
// =============================================================================

fn service_error(e: ClientError) -> AdscopeError {
    AdscopeError::ServiceError(e.to_string())
}

fn print_json(output: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(output).unwrap_or_default()
    );
}

/// Dashboard wired to the configured analytics service.
fn connect(config: &AdscopeConfig) -> Result<Dashboard<HttpAnalyticsClient>, AdscopeError> {
    let client = HttpAnalyticsClient::with_timeout(
        &config.service.base_url,
        config.service.api_key.clone(),
        config.service.timeout(),
    )
    .map_err(service_error)?;
    tracing::info!("Using analytics service at {}", client.base_url());

    let orchestrator =
        FetchOrchestrator::with_parts(ConstraintGraph::standard(), config.resolver(), SystemClock);
    Ok(Dashboard::new(orchestrator, client))
}

fn bounds_json(bounds: Option<&DateBounds>) -> Value {
    match bounds {
        Some(b) => json!({ "start_date": b.start(), "end_date": b.end() }),
        None => Value::Null,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// DATES COMMAND
// =============================================================================

/// Resolve one token, or every known token.
pub fn cmd_dates(
    config: &AdscopeConfig,
    json_mode: bool,
    token: Option<&str>,
) -> Result<(), AdscopeError> {
    let resolver = config.resolver();
    let today = SystemClock.today();
    let tokens: Vec<&str> = match token {
        Some(token) => vec![token],
        None => DateRange::ALL.iter().map(|r| r.as_str()).collect(),
    };

    if json_mode {
        let output: Vec<Value> = tokens
            .iter()
            .map(|token| {
                json!({
                    "token": token,
                    "bounds": bounds_json(resolver.resolve(token, today).as_ref()),
                })
            })
            .collect();
        print_json(&Value::Array(output));
        return Ok(());
    }

    println!("Date Ranges (today: {today})");
    println!("===========");
    for token in tokens {
        match resolver.resolve(token, today) {
            Some(bounds) => println!("{:<12} {} .. {}", token, bounds.start(), bounds.end()),
            None => println!("{:<12} absent", token),
        }
    }
    Ok(())
}

// =============================================================================
// CONSTRAINTS COMMAND
// =============================================================================

/// Print the channel's compatibility table, or the enabled set after
/// selecting one dimension.
pub fn cmd_constraints(
    json_mode: bool,
    channel: Channel,
    select: Option<Dimension>,
) -> Result<(), AdscopeError> {
    let graph = ConstraintGraph::standard();

    if let Some(dimension) = select {
        let enabled: Vec<&str> = graph
            .after_select(channel, dimension)
            .iter()
            .map(Dimension::as_str)
            .collect();
        if json_mode {
            print_json(&json!({
                "channel": channel,
                "selected": dimension,
                "enabled": enabled,
            }));
        } else if enabled.is_empty() {
            println!("{dimension} is not offered on {channel}: every dimension is disabled");
        } else {
            println!("After selecting {dimension} on {channel}: {}", enabled.join(", "));
        }
        return Ok(());
    }

    let rows: Vec<(Dimension, Vec<&str>)> = graph
        .table(channel)
        .map(|table| {
            table
                .iter()
                .map(|(key, compatible)| {
                    (*key, compatible.iter().map(|d| d.as_str()).collect())
                })
                .collect()
        })
        .unwrap_or_default();

    if json_mode {
        let table: serde_json::Map<String, Value> = rows
            .iter()
            .map(|(key, compatible)| (key.as_str().to_string(), json!(compatible)))
            .collect();
        print_json(&json!({ "channel": channel, "table": table }));
        return Ok(());
    }

    println!("Breakdown Constraints: {channel}");
    println!("======================");
    for (key, compatible) in rows {
        let compatible = if compatible.is_empty() {
            "(none)".to_string()
        } else {
            compatible.join(", ")
        };
        println!("{:<20} -> {}", key.as_str(), compatible);
        println!("{:<20}    values: {}", "", key.options().join(", "));
    }
    Ok(())
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Apply the filters one by one, letting each cascade settle, then submit.
pub async fn cmd_report(
    config: &AdscopeConfig,
    json_mode: bool,
    verbose: bool,
    filters: &FilterArgs,
) -> Result<(), AdscopeError> {
    let mut dashboard = connect(config)?;
    dashboard.start();
    dashboard.replay(filters.mutations()).await;

    dashboard.apply(Mutation::Submit);
    let failures = dashboard.settle().await;
    if let Some(failure) = failures
        .iter()
        .find(|f| f.ticket.collection == Collection::Metrics)
    {
        return Err(AdscopeError::ServiceError(failure.reason.clone()));
    }

    let orchestrator = dashboard.orchestrator();
    let report = orchestrator
        .collections()
        .metrics()
        .ok_or_else(|| AdscopeError::ServiceError("No metrics report received".to_string()))?;

    if json_mode {
        print_json(&json!({
            "filters": orchestrator.state(),
            "bounds": bounds_json(orchestrator.bounds().as_ref()),
            "report": report,
        }));
        return Ok(());
    }

    println!("Metrics Report");
    println!("==============");
    print_filters(orchestrator.state());
    if verbose {
        let collections = orchestrator.collections();
        println!(
            "Campaigns:    {}",
            collections.campaigns().map_or(0, <[String]>::len)
        );
        println!(
            "Assets:       {}",
            collections.assets().map_or(0, <[_]>::len)
        );
    }
    println!();
    print_report(report);
    Ok(())
}

fn print_filters(state: &FilterState) {
    println!("Date range:   {}", state.date_range());
    println!("Channel:      {}", state.channel());
    for selector in Selector::ALL {
        println!("{:<13} {}", format!("{selector}:"), state.selector(selector));
    }
    for (dimension, value) in state.breakdowns() {
        println!("{:<13} {}", format!("{dimension}:"), value);
    }
}

fn print_report(report: &Report) {
    match report {
        Report::Sections(sections) => {
            for (name, section) in sections {
                println!("{name}");
                match section {
                    Some(metrics) => {
                        for (metric, value) in metrics {
                            println!("  {:<28} {}", metric, display_value(value));
                        }
                    }
                    None => println!("  (no data)"),
                }
            }
        }
        Report::Items(items) => {
            for item in items {
                println!("  {:<18} {}", item.kind, item.selection_id().unwrap_or("-"));
            }
        }
    }
}

// =============================================================================
// REPLAY COMMAND
// =============================================================================

/// A replay script: `[[step]]` tables, each one mutation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplayScript {
    #[serde(rename = "step", default)]
    steps: Vec<Mutation>,
}

/// Parse a replay script.
pub fn parse_script(content: &str) -> Result<Vec<Mutation>, AdscopeError> {
    toml::from_str::<ReplayScript>(content)
        .map(|script| script.steps)
        .map_err(|e| AdscopeError::IoError(format!("Invalid replay script: {e}")))
}

/// Run the script against the analytics service and print the final state.
pub async fn cmd_replay(
    config: &AdscopeConfig,
    json_mode: bool,
    file: &Path,
) -> Result<(), AdscopeError> {
    let content = std::fs::read_to_string(file).map_err(|e| {
        AdscopeError::IoError(format!("Cannot read {}: {e}", file.display()))
    })?;
    let steps = parse_script(&content)?;
    tracing::info!("Replaying {} steps from {}", steps.len(), file.display());

    let mut dashboard = connect(config)?;
    dashboard.start();
    dashboard.replay(steps).await;

    let orchestrator = dashboard.orchestrator();
    let failures: serde_json::Map<String, Value> = Collection::ALL
        .iter()
        .filter_map(|c| {
            orchestrator
                .last_failure(*c)
                .map(|reason| (c.as_str().to_string(), json!(reason)))
        })
        .collect();

    if json_mode {
        let enabled: Vec<&str> = orchestrator.enabled().iter().map(Dimension::as_str).collect();
        print_json(&json!({
            "state": orchestrator.state(),
            "bounds": bounds_json(orchestrator.bounds().as_ref()),
            "enabled": enabled,
            "collections": orchestrator.collections(),
            "failures": failures,
        }));
        return Ok(());
    }

    println!("Replay Result");
    println!("=============");
    println!("Generation:   {}", orchestrator.state().generation().value());
    print_filters(orchestrator.state());
    let enabled: Vec<&str> = orchestrator.enabled().iter().map(Dimension::as_str).collect();
    println!("Enabled:      {}", enabled.join(", "));
    println!();
    for collection in Collection::ALL {
        let status = if orchestrator.collections().is_loaded(collection) {
            "loaded"
        } else {
            "empty"
        };
        match orchestrator.last_failure(collection) {
            Some(reason) => println!(
                "{:<14} {} (last failure: {})",
                collection.as_str(),
                status,
                reason
            ),
            None => println!("{:<14} {}", collection.as_str(), status),
        }
    }
    if let Some(report) = orchestrator.collections().metrics() {
        println!();
        print_report(report);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
