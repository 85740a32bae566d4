//! # adscope-core
//!
//! The filter-constraint resolution engine and cascading-fetch orchestrator
//! for Adscope - THE LOGIC.
//!
//! An analyst builds a multi-dimensional filter over advertising-campaign
//! data. This crate decides:
//! - which breakdown dimensions may be combined on a channel (`constraints`)
//! - which concrete dates a symbolic range covers (`calendar`)
//! - which derived data goes stale on every change, and what to fetch
//!   with which payload (`policy`, `payload`, `orchestrator`)
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never initiates I/O; every operation returns the requests to issue
//! - Single owner: the caller's event loop mutates one `FetchOrchestrator`
//! - Responses are stamped with the generation they were derived from and
//!   discarded once superseded

// =============================================================================
// MODULES
// =============================================================================

pub mod calendar;
pub mod collections;
pub mod constraints;
pub mod filter;
pub mod mutation;
pub mod orchestrator;
pub mod payload;
pub mod policy;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ALL, AdscopeError, AssetKind, AssetRef, Channel, Collection, Dimension, Generation,
    ProductsToggle, Selector,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use calendar::{
    Clock, DateBounds, DateRange, DateRangeResolver, FixedClock, SystemClock, WeekStart,
};
pub use collections::{DerivedCollections, Item, Report, Section, ServiceResponse};
pub use constraints::{ConstraintGraph, EnabledSet};
pub use filter::FilterState;
pub use mutation::Mutation;
pub use orchestrator::{
    Completion, FetchFailure, FetchOrchestrator, FetchRequest, ServiceCall, StaleResponse, Ticket,
};
pub use payload::{MetricsIntent, Payload, PayloadValue};
pub use policy::{Effect, FilterField, Refetch, effect_of};
