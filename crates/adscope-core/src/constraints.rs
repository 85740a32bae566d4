//! # Constraint Graph
//!
//! Per-channel table of which breakdown dimensions may be combined.
//!
//! The table is authored per key and is NOT symmetric: `publisher_platform`
//! allows `platform_position`, but `impression_device` does not.
//!
//! ## Resolution Rules
//!
//! - Switching channel: the enabled set becomes every key of the new
//!   channel's table.
//! - Selecting dimension `d` known to the channel: the enabled set becomes
//!   exactly `compatible_with(d) ∪ {d}`.
//! - Selecting a dimension unknown to the channel: the enabled set becomes
//!   empty.
//!
//! Narrowing is one level deep. It never clears stored values of the
//! dimensions it disables.

use crate::types::{Channel, Dimension};
use std::collections::{BTreeMap, BTreeSet};

/// Compatibility table for one channel: dimension → dimensions that stay
/// selectable once it is chosen.
pub type ChannelTable = BTreeMap<Dimension, BTreeSet<Dimension>>;

// =============================================================================
// ENABLED SET
// =============================================================================

/// The breakdown dimensions currently selectable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnabledSet(BTreeSet<Dimension>);

impl EnabledSet {
    /// No dimension is selectable.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every dimension is selectable, regardless of channel.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self(Dimension::ALL.into_iter().collect())
    }

    #[must_use]
    pub fn contains(&self, dimension: Dimension) -> bool {
        self.0.contains(&dimension)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Enabled dimensions in display order.
    pub fn iter(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Dimension> for EnabledSet {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// CONSTRAINT GRAPH
// =============================================================================

/// Per-channel dimension compatibility.
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    tables: BTreeMap<Channel, ChannelTable>,
}

impl Default for ConstraintGraph {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConstraintGraph {
    /// The compatibility rules used by every supported channel.
    #[must_use]
    pub fn standard() -> Self {
        use Dimension::{
            Age, Behavior, DevicePlatform, Gender, ImpressionDevice, PlatformPosition,
            PublisherPlatform, Relationship, ShowProducts,
        };

        let placement: [(Dimension, &[Dimension]); 6] = [
            (Gender, &[Age]),
            (Age, &[Gender]),
            (ImpressionDevice, &[DevicePlatform, PublisherPlatform]),
            (DevicePlatform, &[ImpressionDevice, PublisherPlatform]),
            (
                PublisherPlatform,
                &[ImpressionDevice, DevicePlatform, PlatformPosition],
            ),
            (PlatformPosition, &[PublisherPlatform, ImpressionDevice]),
        ];

        let mut tables = BTreeMap::new();
        for channel in Channel::ALL {
            let exclusive = match channel {
                Channel::Facebook | Channel::Instagram => ShowProducts,
                Channel::Google => Relationship,
                Channel::LinkedIn => Behavior,
            };
            let mut table: ChannelTable = placement
                .iter()
                .map(|(dim, compatible)| (*dim, compatible.iter().copied().collect()))
                .collect();
            table.insert(exclusive, BTreeSet::new());
            tables.insert(channel, table);
        }

        Self { tables }
    }

    /// Build a graph from explicit tables.
    #[must_use]
    pub fn from_tables(tables: BTreeMap<Channel, ChannelTable>) -> Self {
        Self { tables }
    }

    /// The raw table for a channel (empty if none was authored).
    #[must_use]
    pub fn table(&self, channel: Channel) -> Option<&ChannelTable> {
        self.tables.get(&channel)
    }

    /// Whether `dimension` is a key of the channel's table.
    #[must_use]
    pub fn supports(&self, channel: Channel, dimension: Dimension) -> bool {
        self.table(channel)
            .is_some_and(|table| table.contains_key(&dimension))
    }

    /// Dimensions that remain selectable alongside `dimension`.
    #[must_use]
    pub fn compatible_with(
        &self,
        channel: Channel,
        dimension: Dimension,
    ) -> Option<&BTreeSet<Dimension>> {
        self.table(channel)?.get(&dimension)
    }

    /// Enabled set right after switching to `channel`: all of its keys.
    #[must_use]
    pub fn after_channel(&self, channel: Channel) -> EnabledSet {
        self.table(channel)
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Enabled set right after choosing `dimension` on `channel`.
    #[must_use]
    pub fn after_select(&self, channel: Channel, dimension: Dimension) -> EnabledSet {
        match self.compatible_with(channel, dimension) {
            Some(compatible) => compatible
                .iter()
                .copied()
                .chain(std::iter::once(dimension))
                .collect(),
            None => EnabledSet::empty(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
