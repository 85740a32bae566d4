//! # Request Payloads
//!
//! Builds the bodies sent to the analytics service from a [`FilterState`].
//!
//! Values equal to the sentinel `"all"` and empty breakdown values are
//! dropped here, at the point of building each request. Stored state may
//! still hold values for disabled dimensions; they are sent as-is.

use crate::calendar::DateBounds;
use crate::filter::FilterState;
use crate::types::{ALL, AssetRef, ProductsToggle, Selector};
use serde::Serialize;
use std::collections::BTreeMap;

/// Selectors that narrow the campaign listing.
pub const CAMPAIGN_FILTERS: [Selector; 5] = [
    Selector::Organization,
    Selector::Source,
    Selector::Brand,
    Selector::CampaignType,
    Selector::DeliveryType,
];

// =============================================================================
// PAYLOAD
// =============================================================================

/// One payload entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Text(String),
    Flag(bool),
    Asset(AssetRef),
}

impl PayloadValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A flat, ordered request payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, PayloadValue>);

impl Payload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text value unless it is the sentinel or empty.
    fn insert_filter(&mut self, key: &str, value: &str) {
        if value != ALL && !value.is_empty() {
            self.0
                .insert(key.to_string(), PayloadValue::Text(value.to_string()));
        }
    }

    fn insert(&mut self, key: &str, value: PayloadValue) {
        self.0.insert(key.to_string(), value);
    }

    fn insert_bounds(&mut self, bounds: Option<&DateBounds>) {
        if let Some(bounds) = bounds {
            self.insert("start_date", PayloadValue::Text(bounds.start()));
            self.insert("end_date", PayloadValue::Text(bounds.end()));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten into URL query pairs. Asset references have no query form and
    /// are skipped.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(k, v)| match v {
                PayloadValue::Text(s) => Some((k.clone(), s.clone())),
                PayloadValue::Flag(b) => Some((k.clone(), b.to_string())),
                PayloadValue::Asset(_) => None,
            })
            .collect()
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// What a metrics call should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsIntent {
    /// Candidate creative assets for the current demographic breakdown.
    Assets,
    /// Candidate products (only issued while products are shown).
    Products,
    /// The aggregated metrics report.
    Report,
}

/// Filters for the campaign listing.
#[must_use]
pub fn campaign_filters(state: &FilterState, bounds: Option<&DateBounds>) -> Payload {
    let mut payload = Payload::new();
    for selector in CAMPAIGN_FILTERS {
        payload.insert_filter(selector.as_str(), state.selector(selector));
    }
    payload.insert_filter("channel", state.channel().as_str());
    payload.insert_bounds(bounds);
    payload
}

/// Full metrics payload for the given intent.
#[must_use]
pub fn metrics_payload(
    state: &FilterState,
    bounds: Option<&DateBounds>,
    intent: MetricsIntent,
) -> Payload {
    let mut payload = Payload::new();
    payload.insert_filter("date_range", state.date_range());
    for selector in Selector::ALL {
        payload.insert_filter(selector.as_str(), state.selector(selector));
    }
    payload.insert_filter("channel", state.channel().as_str());
    for (dimension, value) in state.breakdowns() {
        payload.insert_filter(dimension.as_str(), value);
    }
    if let Some(asset) = state.asset() {
        payload.insert("asset", PayloadValue::Asset(asset.clone()));
    }

    let show_products = match intent {
        MetricsIntent::Assets => {
            payload.insert("fetch_assets", PayloadValue::Flag(true));
            ProductsToggle::Hide
        }
        MetricsIntent::Products => state.show_products(),
        MetricsIntent::Report => ProductsToggle::Hide,
    };
    payload.insert(
        "show_products",
        PayloadValue::Text(show_products.as_str().to_string()),
    );

    payload.insert_bounds(bounds);
    payload
}

// =============================================================================
// TESTS
// =============================================================================
