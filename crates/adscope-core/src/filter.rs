//! # Filter State
//!
//! The single owned record of every selected filter value.
//!
//! FilterState owns no external resources and performs no validation beyond
//! the types it stores. Setters report whether the stored value actually
//! changed so the orchestrator can treat same-value writes as no-ops.

use crate::calendar::DateRange;
use crate::types::{ALL, AssetRef, Channel, Dimension, Generation, ProductsToggle, Selector};
use serde::Serialize;
use std::collections::BTreeMap;

/// Every selected filter value plus the generation stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    date_range: String,
    organization: String,
    source: String,
    brand: String,
    campaign_type: String,
    delivery_type: String,
    campaign: String,
    channel: Channel,
    show_products: ProductsToggle,
    /// Breakdown values keyed by dimension. Unset dimensions are absent.
    /// Never holds `Dimension::ShowProducts`.
    breakdowns: BTreeMap<Dimension, String>,
    asset: Option<AssetRef>,
    generation: Generation,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            date_range: DateRange::default().as_str().to_string(),
            organization: ALL.to_string(),
            source: ALL.to_string(),
            brand: ALL.to_string(),
            campaign_type: ALL.to_string(),
            delivery_type: ALL.to_string(),
            campaign: ALL.to_string(),
            channel: Channel::default(),
            show_products: ProductsToggle::default(),
            breakdowns: BTreeMap::new(),
            asset: None,
            generation: Generation::default(),
        }
    }
}

/// Replace `slot` with `value`, reporting whether anything changed.
fn replace(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    value.clone_into(slot);
    true
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    /// Raw date range token (possibly outside the known enumeration).
    #[must_use]
    pub fn date_range(&self) -> &str {
        &self.date_range
    }

    #[must_use]
    pub fn selector(&self, selector: Selector) -> &str {
        match selector {
            Selector::Organization => &self.organization,
            Selector::Source => &self.source,
            Selector::Brand => &self.brand,
            Selector::CampaignType => &self.campaign_type,
            Selector::DeliveryType => &self.delivery_type,
            Selector::Campaign => &self.campaign,
        }
    }

    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    #[must_use]
    pub fn show_products(&self) -> ProductsToggle {
        self.show_products
    }

    /// Stored value of a dimension; empty when unset.
    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::ShowProducts => self.show_products.as_str(),
            other => self.breakdowns.get(&other).map_or("", String::as_str),
        }
    }

    /// Set breakdown values in dimension order.
    pub fn breakdowns(&self) -> impl Iterator<Item = (Dimension, &str)> {
        self.breakdowns.iter().map(|(d, v)| (*d, v.as_str()))
    }

    /// Whether at least one of gender/age holds a value.
    #[must_use]
    pub fn has_demographic(&self) -> bool {
        self.breakdowns
            .iter()
            .any(|(d, v)| d.is_demographic() && !v.is_empty())
    }

    #[must_use]
    pub fn asset(&self) -> Option<&AssetRef> {
        self.asset.as_ref()
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    pub fn set_date_range(&mut self, token: &str) -> bool {
        replace(&mut self.date_range, token)
    }

    pub fn set_selector(&mut self, selector: Selector, value: &str) -> bool {
        let slot = match selector {
            Selector::Organization => &mut self.organization,
            Selector::Source => &mut self.source,
            Selector::Brand => &mut self.brand,
            Selector::CampaignType => &mut self.campaign_type,
            Selector::DeliveryType => &mut self.delivery_type,
            Selector::Campaign => &mut self.campaign,
        };
        replace(slot, value)
    }

    pub fn set_channel(&mut self, channel: Channel) -> bool {
        if self.channel == channel {
            return false;
        }
        self.channel = channel;
        true
    }

    /// Set a dimension value. An empty value unsets a breakdown dimension;
    /// `show_products` interprets the value with [`ProductsToggle::from_value`].
    pub fn set_dimension(&mut self, dimension: Dimension, value: &str) -> bool {
        if dimension == Dimension::ShowProducts {
            let toggle = ProductsToggle::from_value(value);
            if self.show_products == toggle {
                return false;
            }
            self.show_products = toggle;
            return true;
        }

        if value.is_empty() {
            return self.breakdowns.remove(&dimension).is_some();
        }
        match self.breakdowns.get_mut(&dimension) {
            Some(slot) => replace(slot, value),
            None => {
                self.breakdowns.insert(dimension, value.to_string());
                true
            }
        }
    }

    /// Replace the asset selection, returning the previous one.
    pub fn select_asset(&mut self, asset: AssetRef) -> Option<AssetRef> {
        self.asset.replace(asset)
    }

    /// Drop the asset selection, returning it.
    pub fn clear_asset(&mut self) -> Option<AssetRef> {
        self.asset.take()
    }

    /// Advance the generation stamp.
    pub(crate) fn advance(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    /// Restore every field to its default. The generation keeps counting.
    pub(crate) fn reset(&mut self) {
        let generation = self.generation;
        *self = Self {
            generation,
            ..Self::default()
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetKind;

    #[test]
    fn defaults_match_unconstrained_form() {
        let state = FilterState::new();
        assert_eq!(state.date_range(), "maximum");
        for selector in Selector::ALL {
            assert_eq!(state.selector(selector), ALL);
        }
        assert_eq!(state.channel(), Channel::Facebook);
        assert_eq!(state.show_products(), ProductsToggle::Hide);
        assert_eq!(state.breakdowns().count(), 0);
        assert!(state.asset().is_none());
    }

    #[test]
    fn same_value_is_not_a_change() {
        let mut state = FilterState::new();
        assert!(!state.set_date_range("maximum"));
        assert!(!state.set_selector(Selector::Brand, ALL));
        assert!(!state.set_channel(Channel::Facebook));
        assert!(!state.set_dimension(Dimension::Gender, ""));
        assert!(!state.set_dimension(Dimension::ShowProducts, "hide"));
    }

    #[test]
    fn breakdown_set_and_unset() {
        let mut state = FilterState::new();
        assert!(state.set_dimension(Dimension::Gender, "female"));
        assert_eq!(state.dimension(Dimension::Gender), "female");
        assert!(state.has_demographic());

        assert!(state.set_dimension(Dimension::Gender, ""));
        assert_eq!(state.dimension(Dimension::Gender), "");
        assert!(!state.has_demographic());
    }

    #[test]
    fn show_products_is_stored_as_toggle() {
        let mut state = FilterState::new();
        assert!(state.set_dimension(Dimension::ShowProducts, "show"));
        assert_eq!(state.show_products(), ProductsToggle::Show);
        assert_eq!(state.dimension(Dimension::ShowProducts), "show");
        assert_eq!(state.breakdowns().count(), 0);
    }

    #[test]
    fn reset_keeps_generation() {
        let mut state = FilterState::new();
        state.set_selector(Selector::Source, "ADXL");
        state.select_asset(AssetRef::new(AssetKind::ImageAsset, "img-1"));
        let generation = state.advance();

        state.reset();

        assert_eq!(state.selector(Selector::Source), ALL);
        assert!(state.asset().is_none());
        assert_eq!(state.generation(), generation);
    }
}
