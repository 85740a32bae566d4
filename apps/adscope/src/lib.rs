//! # adscope
//!
//! The Adscope dashboard driver - THE BINARY.
//!
//! - `client` - the analytics service boundary and its HTTP implementation
//! - `config` - `adscope.toml` plus environment overrides
//! - `dashboard` - executes orchestrator requests and feeds responses back
//! - `cli` - the `adscope` command line

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;

pub use client::{AnalyticsService, ClientError, HttpAnalyticsClient};
pub use config::AdscopeConfig;
pub use dashboard::Dashboard;
