//! # Derived Collections
//!
//! Data fetched from the analytics service for the current filter state.
//!
//! Every collection starts absent (`None`), is populated by a response,
//! and is set back to absent whenever an upstream field changes.

use crate::AdscopeError;
use crate::types::Collection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// RESPONSE SHAPES
// =============================================================================

/// A creative asset or product candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
    /// Remaining attributes (`_id`, product name, price, image_url, url, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Identifier to use when selecting this item: the creative's own id
    /// when the value carries one, otherwise the item or row id.
    #[must_use]
    pub fn selection_id(&self) -> Option<&str> {
        self.value
            .get("id")
            .and_then(Value::as_str)
            .or(self.id.as_deref())
            .or_else(|| self.extra.get("_id").and_then(Value::as_str))
    }
}

/// Metric values of one report section. `None` means "no data".
pub type Section = Option<BTreeMap<String, Value>>;

/// Result of a metrics call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    /// Asset or product candidates.
    Items(Vec<Item>),
    /// Aggregated metrics keyed by section name.
    Sections(BTreeMap<String, Section>),
}

/// A decoded response from the analytics service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResponse {
    /// Organization or campaign identifiers.
    Listing(Vec<String>),
    /// Body of a metrics call.
    Report(Report),
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// All derived collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedCollections {
    organizations: Option<Vec<String>>,
    campaigns: Option<Vec<String>>,
    assets: Option<Vec<Item>>,
    products: Option<Vec<Item>>,
    metrics: Option<Report>,
}

impl DerivedCollections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn organizations(&self) -> Option<&[String]> {
        self.organizations.as_deref()
    }

    #[must_use]
    pub fn campaigns(&self) -> Option<&[String]> {
        self.campaigns.as_deref()
    }

    #[must_use]
    pub fn assets(&self) -> Option<&[Item]> {
        self.assets.as_deref()
    }

    #[must_use]
    pub fn products(&self) -> Option<&[Item]> {
        self.products.as_deref()
    }

    #[must_use]
    pub fn metrics(&self) -> Option<&Report> {
        self.metrics.as_ref()
    }

    /// Whether the collection currently holds data.
    #[must_use]
    pub fn is_loaded(&self, collection: Collection) -> bool {
        match collection {
            Collection::Organizations => self.organizations.is_some(),
            Collection::Campaigns => self.campaigns.is_some(),
            Collection::Assets => self.assets.is_some(),
            Collection::Products => self.products.is_some(),
            Collection::Metrics => self.metrics.is_some(),
        }
    }

    /// Invalidate a collection.
    pub fn clear(&mut self, collection: Collection) {
        match collection {
            Collection::Organizations => self.organizations = None,
            Collection::Campaigns => self.campaigns = None,
            Collection::Assets => self.assets = None,
            Collection::Products => self.products = None,
            Collection::Metrics => self.metrics = None,
        }
    }

    /// Store a response into a collection.
    ///
    /// A response whose shape does not fit the collection is rejected and
    /// the collection is left untouched.
    pub fn store(
        &mut self,
        collection: Collection,
        response: ServiceResponse,
    ) -> Result<(), AdscopeError> {
        match (collection, response) {
            (Collection::Organizations, ServiceResponse::Listing(list)) => {
                self.organizations = Some(list);
            }
            (Collection::Campaigns, ServiceResponse::Listing(list)) => {
                self.campaigns = Some(list);
            }
            (Collection::Assets, ServiceResponse::Report(Report::Items(items))) => {
                self.assets = Some(items);
            }
            (Collection::Products, ServiceResponse::Report(Report::Items(items))) => {
                self.products = Some(items);
            }
            (Collection::Metrics, ServiceResponse::Report(report)) => {
                self.metrics = Some(report);
            }
            (collection, _) => {
                return Err(AdscopeError::UnexpectedResponse {
                    collection,
                    expected: match collection {
                        Collection::Organizations | Collection::Campaigns => "a list of names",
                        Collection::Assets | Collection::Products => "a list of items",
                        Collection::Metrics => "a report",
                    },
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_array_decodes_as_items() {
        let report: Report = serde_json::from_value(json!([
            {"_id": "row-1", "type": "image_asset", "value": {"id": "img-7", "url": "https://cdn/x.png"}},
            {"_id": "p-3", "name": "Burger", "price": 12, "image_url": "https://cdn/b.png"}
        ]))
        .expect("decode");

        let Report::Items(items) = report else {
            unreachable!("array must decode as items")
        };
        assert_eq!(items[0].kind, "image_asset");
        assert_eq!(items[0].selection_id(), Some("img-7"));
        assert_eq!(items[1].selection_id(), Some("p-3"));
        assert_eq!(items[1].extra.get("name"), Some(&json!("Burger")));
    }

    #[test]
    fn report_object_decodes_as_sections() {
        let report: Report = serde_json::from_value(json!({
            "performance": {"impressions": 1200, "ctr": "1.2%"},
            "conversions": null
        }))
        .expect("decode");

        let Report::Sections(sections) = report else {
            unreachable!("object must decode as sections")
        };
        assert_eq!(sections.len(), 2);
        assert!(sections["conversions"].is_none());
        let performance = sections["performance"].as_ref().expect("section");
        assert_eq!(performance["impressions"], json!(1200));
    }

    #[test]
    fn store_rejects_mismatched_shape() {
        let mut collections = DerivedCollections::new();
        let result = collections.store(
            Collection::Assets,
            ServiceResponse::Report(Report::Sections(BTreeMap::new())),
        );
        assert!(matches!(
            result,
            Err(AdscopeError::UnexpectedResponse {
                collection: Collection::Assets,
                ..
            })
        ));
        assert!(!collections.is_loaded(Collection::Assets));
    }

    #[test]
    fn store_and_clear() {
        let mut collections = DerivedCollections::new();
        collections
            .store(
                Collection::Campaigns,
                ServiceResponse::Listing(vec!["c-1".into()]),
            )
            .expect("store");
        assert_eq!(collections.campaigns(), Some(&["c-1".to_string()][..]));

        collections.clear(Collection::Campaigns);
        assert!(collections.campaigns().is_none());
    }
}
