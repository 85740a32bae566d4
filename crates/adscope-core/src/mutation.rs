//! # Mutations
//!
//! The closed set of user actions the orchestrator reacts to.
//!
//! Mutations are plain data so that a sequence of them can be scripted,
//! replayed, and compared. Each one is processed to completion before the
//! next is accepted.

use crate::types::{AssetKind, Channel, Dimension, Selector};
use serde::{Deserialize, Serialize};

/// One user action against the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Mutation {
    /// Choose a date range token.
    DateRange { token: String },
    /// Set a top-level selector (`"all"` removes the constraint).
    Select { selector: Selector, value: String },
    /// Switch the advertising channel.
    Channel { channel: Channel },
    /// Set a breakdown dimension (empty value unsets it).
    Dimension { dimension: Dimension, value: String },
    /// Choose a creative element or product.
    SelectAsset { kind: AssetKind, id: String },
    /// Restore every default.
    Reset,
    /// Request the metrics report for the current state.
    Submit,
}

impl Mutation {
    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::DateRange { .. } => "date_range",
            Self::Select { .. } => "select",
            Self::Channel { .. } => "channel",
            Self::Dimension { .. } => "dimension",
            Self::SelectAsset { .. } => "select_asset",
            Self::Reset => "reset",
            Self::Submit => "submit",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
