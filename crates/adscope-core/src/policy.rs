//! # Invalidation Policy
//!
//! Explicit dependency table: changed field → collections made stale and
//! the fetch to issue. Evaluated synchronously after each mutation.
//!
//! | changed field                                    | invalidates                          | refetch |
//! |--------------------------------------------------|--------------------------------------|---------|
//! | date_range, source, brand, campaign_type, delivery_type | campaigns, assets, products, metrics | campaigns |
//! | organization                                     | campaigns, metrics                   | campaigns |
//! | campaign                                         | metrics                              | none |
//! | channel                                          | campaigns, assets, products, metrics | campaigns |
//! | gender, age                                      | assets, metrics                      | assets, if gender or age is set |
//! | show_products                                    | products, metrics                    | products, if shown |
//! | any other breakdown                              | metrics                              | none |
//!
//! Every row also clears the asset selection. Organizations are loaded once
//! and depend on nothing.

use crate::types::{Collection, Dimension, Selector};

/// A filter field as seen by the dependency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    DateRange,
    Selector(Selector),
    Channel,
    Dimension(Dimension),
}

/// The fetch a field change may trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refetch {
    /// Always refetch the campaign listing.
    Campaigns,
    /// Refetch asset candidates if gender or age holds a value.
    AssetsIfDemographic,
    /// Refetch product candidates if products are shown.
    ProductsIfShown,
}

impl Refetch {
    /// The collection this refetch fills.
    #[must_use]
    pub const fn collection(self) -> Collection {
        match self {
            Self::Campaigns => Collection::Campaigns,
            Self::AssetsIfDemographic => Collection::Assets,
            Self::ProductsIfShown => Collection::Products,
        }
    }
}

/// Consequences of changing one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub invalidates: &'static [Collection],
    pub refetch: Option<Refetch>,
}

const FILTER_WIDE: &[Collection] = &[
    Collection::Campaigns,
    Collection::Assets,
    Collection::Products,
    Collection::Metrics,
];

/// Look up the effect of changing `field`.
#[must_use]
pub const fn effect_of(field: FilterField) -> Effect {
    match field {
        FilterField::DateRange
        | FilterField::Channel
        | FilterField::Selector(
            Selector::Source | Selector::Brand | Selector::CampaignType | Selector::DeliveryType,
        ) => Effect {
            invalidates: FILTER_WIDE,
            refetch: Some(Refetch::Campaigns),
        },
        FilterField::Selector(Selector::Organization) => Effect {
            invalidates: &[Collection::Campaigns, Collection::Metrics],
            refetch: Some(Refetch::Campaigns),
        },
        FilterField::Selector(Selector::Campaign) => Effect {
            invalidates: &[Collection::Metrics],
            refetch: None,
        },
        FilterField::Dimension(Dimension::Gender | Dimension::Age) => Effect {
            invalidates: &[Collection::Assets, Collection::Metrics],
            refetch: Some(Refetch::AssetsIfDemographic),
        },
        FilterField::Dimension(Dimension::ShowProducts) => Effect {
            invalidates: &[Collection::Products, Collection::Metrics],
            refetch: Some(Refetch::ProductsIfShown),
        },
        FilterField::Dimension(_) => Effect {
            invalidates: &[Collection::Metrics],
            refetch: None,
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_invalidates_metrics() {
        let fields = [FilterField::DateRange, FilterField::Channel]
            .into_iter()
            .chain(Selector::ALL.into_iter().map(FilterField::Selector))
            .chain(Dimension::ALL.into_iter().map(FilterField::Dimension));

        for field in fields {
            assert!(
                effect_of(field).invalidates.contains(&Collection::Metrics),
                "{field:?} must invalidate metrics"
            );
        }
    }

    #[test]
    fn campaign_listing_dependencies() {
        for selector in Selector::ALL {
            let refetch = effect_of(FilterField::Selector(selector)).refetch;
            if selector == Selector::Campaign {
                assert_eq!(refetch, None);
            } else {
                assert_eq!(refetch, Some(Refetch::Campaigns));
            }
        }
        assert_eq!(
            effect_of(FilterField::DateRange).refetch,
            Some(Refetch::Campaigns)
        );
    }

    #[test]
    fn organization_keeps_assets_and_products() {
        let effect = effect_of(FilterField::Selector(Selector::Organization));
        assert!(!effect.invalidates.contains(&Collection::Assets));
        assert!(!effect.invalidates.contains(&Collection::Products));
    }

    #[test]
    fn placement_dimensions_only_clear_metrics() {
        let effect = effect_of(FilterField::Dimension(Dimension::PlatformPosition));
        assert_eq!(effect.invalidates, &[Collection::Metrics]);
        assert_eq!(effect.refetch, None);
    }

    #[test]
    fn nothing_invalidates_organizations() {
        for field in Dimension::ALL.into_iter().map(FilterField::Dimension) {
            assert!(!effect_of(field).invalidates.contains(&Collection::Organizations));
        }
        assert!(!effect_of(FilterField::Channel)
            .invalidates
            .contains(&Collection::Organizations));
    }
}
