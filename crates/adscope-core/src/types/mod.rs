//! # Core Type Definitions
//!
//! This module contains the vocabulary shared by every part of the engine:
//! - Advertising context (`Channel`, `Dimension`, `ProductsToggle`, `Selector`)
//! - Derived data identifiers (`Collection`, `Generation`)
//! - Creative selection (`AssetKind`, `AssetRef`)
//! - Error types (`AdscopeError`)
//!
//! ## Determinism Guarantees
//!
//! All enums in this module:
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Round-trip through their wire names via `as_str` / `FromStr`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Filter value meaning "no constraint". Never sent to the analytics service.
pub const ALL: &str = "all";

// =============================================================================
// CHANNEL
// =============================================================================

/// The advertising platform a filter is scoped to.
///
/// Exactly one channel is active at any time; it decides which breakdown
/// dimensions exist and how they constrain each other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Channel {
    #[default]
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "instagram")]
    Instagram,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "linkedIn")]
    LinkedIn,
}

impl Channel {
    /// Every channel, in display order.
    pub const ALL: [Channel; 4] = [
        Channel::Facebook,
        Channel::Instagram,
        Channel::Google,
        Channel::LinkedIn,
    ];

    /// Wire name of the channel.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Google => "google",
            Self::LinkedIn => "linkedIn",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = AdscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AdscopeError::UnknownChannel(s.to_string()))
    }
}

// =============================================================================
// BREAKDOWN DIMENSIONS
// =============================================================================

/// A breakdown dimension that can appear as a key in a channel's
/// constraint table.
///
/// `ShowProducts` is a constraint key like the others even though its
/// value lives in [`ProductsToggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ShowProducts,
    Gender,
    Age,
    DevicePlatform,
    PublisherPlatform,
    PlatformPosition,
    ImpressionDevice,
    Relationship,
    Behavior,
}

impl Dimension {
    /// The unconstrained dimension list, in display order.
    pub const ALL: [Dimension; 9] = [
        Dimension::ShowProducts,
        Dimension::Gender,
        Dimension::Age,
        Dimension::DevicePlatform,
        Dimension::PublisherPlatform,
        Dimension::PlatformPosition,
        Dimension::ImpressionDevice,
        Dimension::Relationship,
        Dimension::Behavior,
    ];

    /// Wire name of the dimension (also its payload key).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowProducts => "show_products",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::DevicePlatform => "device_platform",
            Self::PublisherPlatform => "publisher_platform",
            Self::PlatformPosition => "platform_position",
            Self::ImpressionDevice => "impression_device",
            Self::Relationship => "relationship",
            Self::Behavior => "behavior",
        }
    }

    /// Known values for the dimension. Used for display only; stored
    /// values are not validated against this list.
    #[must_use]
    pub const fn options(self) -> &'static [&'static str] {
        match self {
            Self::ShowProducts => &["hide", "show"],
            Self::Gender => &["male", "female", "other"],
            Self::Age => &["18-24", "25-34", "35-44", "45-54", "55-64", "65+"],
            Self::DevicePlatform => &["desktop", "mobile_app", "mobile_web", "unknown"],
            Self::PublisherPlatform => &[
                "audience_network",
                "facebook",
                "instagram",
                "messenger",
                "unknown",
            ],
            Self::PlatformPosition => &[
                "an_classic",
                "rewarded_video",
                "facebook_reels",
                "facebook_stories",
                "feed",
                "instant_article",
                "instream_video",
                "marketplace",
                "right_hand_column",
                "video_feeds",
                "instagram_explore",
                "instagram_reels",
                "instagram_stories",
                "messenger_inbox",
                "unknown",
            ],
            Self::ImpressionDevice => &[
                "android_smartphone",
                "android_tablet",
                "desktop",
                "ipad",
                "iphone",
                "ipod",
                "other",
            ],
            Self::Relationship | Self::Behavior => &["single", "married"],
        }
    }

    /// Whether a change to this dimension drives the asset-candidate fetch.
    #[must_use]
    pub const fn is_demographic(self) -> bool {
        matches!(self, Self::Gender | Self::Age)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = AdscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| AdscopeError::UnknownDimension(s.to_string()))
    }
}

/// Whether product candidates are requested.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductsToggle {
    #[default]
    Hide,
    Show,
}

impl ProductsToggle {
    /// Interpret a raw control value. Anything other than `"show"` hides.
    #[must_use]
    pub fn from_value(value: &str) -> Self {
        if value == "show" { Self::Show } else { Self::Hide }
    }

    /// Wire name of the toggle.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Show => "show",
        }
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

/// A top-level string filter whose sentinel value [`ALL`] means
/// "no constraint".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    Organization,
    Source,
    Brand,
    CampaignType,
    DeliveryType,
    Campaign,
}

impl Selector {
    pub const ALL: [Selector; 6] = [
        Selector::Organization,
        Selector::Source,
        Selector::Brand,
        Selector::CampaignType,
        Selector::DeliveryType,
        Selector::Campaign,
    ];

    /// Wire name of the selector (also its payload key).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Source => "source",
            Self::Brand => "brand",
            Self::CampaignType => "campaign_type",
            Self::DeliveryType => "delivery_type",
            Self::Campaign => "campaign",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Selector {
    type Err = AdscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sel| sel.as_str() == s)
            .ok_or_else(|| AdscopeError::UnknownSelector(s.to_string()))
    }
}

// =============================================================================
// DERIVED COLLECTIONS & GENERATIONS
// =============================================================================

/// A collection of data derived from the analytics service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Organizations,
    Campaigns,
    Assets,
    Products,
    Metrics,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Organizations,
        Collection::Campaigns,
        Collection::Assets,
        Collection::Products,
        Collection::Metrics,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Campaigns => "campaigns",
            Self::Assets => "assets",
            Self::Products => "products",
            Self::Metrics => "metrics",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version stamp of the filter state.
/// Incremented on every effective mutation with saturating arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Get the raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// ASSET SELECTION
// =============================================================================

/// Kind of creative element (or product) that can be chosen for a
/// metrics query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    ImageAsset,
    VideoAsset,
    BodyAsset,
    TitleAsset,
    DescriptionAsset,
    ProductId,
}

impl AssetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImageAsset => "image_asset",
            Self::VideoAsset => "video_asset",
            Self::BodyAsset => "body_asset",
            Self::TitleAsset => "title_asset",
            Self::DescriptionAsset => "description_asset",
            Self::ProductId => "product_id",
        }
    }
}

/// Reference to the single chosen creative element or product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub id: String,
}

impl AssetRef {
    #[must_use]
    pub fn new(kind: AssetKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Adscope.
///
/// `MalformedToken` and unknown-dimension selections are absorbed by the
/// orchestrator; they only surface from the parsing entry points.
#[derive(Debug, Error)]
pub enum AdscopeError {
    /// A date-range token outside the known enumeration.
    #[error("Malformed date range token: {0}")]
    MalformedToken(String),

    /// A channel name that is not one of the supported platforms.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// A breakdown dimension name that is not recognised.
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    /// A selector name that is not recognised.
    #[error("Unknown selector: {0}")]
    UnknownSelector(String),

    /// A service response whose shape does not fit the target collection.
    #[error("Unexpected response for {collection}: expected {expected}")]
    UnexpectedResponse {
        collection: Collection,
        expected: &'static str,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The analytics service could not complete a call.
    #[error("Service error: {0}")]
    ServiceError(String),
}

// =============================================================================
// TESTS
// =============================================================================
