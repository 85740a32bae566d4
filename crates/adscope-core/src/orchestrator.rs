//! # Fetch Orchestrator
//!
//! Owns the [`FilterState`] and decides, on every state change, which
//! derived collections are stale and which requests to issue.
//!
//! The orchestrator never performs I/O. Each operation returns the
//! [`FetchRequest`]s the caller must send; responses come back through
//! [`FetchOrchestrator::complete`] and [`FetchOrchestrator::fail`].
//!
//! ## Generations
//!
//! Every request carries a [`Ticket`] naming its collection and the
//! filter generation it was derived from. A collection accepts only the
//! response for its latest outstanding ticket; anything older is discarded
//! so a slow, superseded response can never overwrite a newer one.

use crate::calendar::{Clock, DateBounds, DateRangeResolver, SystemClock};
use crate::collections::{DerivedCollections, ServiceResponse};
use crate::constraints::{ConstraintGraph, EnabledSet};
use crate::filter::FilterState;
use crate::mutation::Mutation;
use crate::payload::{MetricsIntent, Payload, campaign_filters, metrics_payload};
use crate::policy::{FilterField, Refetch, effect_of};
use crate::types::{AssetRef, Channel, Collection, Dimension, Generation, ProductsToggle, Selector};
use std::collections::BTreeMap;

// =============================================================================
// REQUESTS & OUTCOMES
// =============================================================================

/// Identity of an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    pub collection: Collection,
    pub generation: Generation,
}

/// A call to the analytics service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    /// List every organization. No parameters.
    Organizations,
    /// List campaigns matching the filters.
    Campaigns(Payload),
    /// Compute assets, products, or the metrics report.
    Metrics {
        payload: Payload,
        intent: MetricsIntent,
    },
}

/// A request the caller must send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub call: ServiceCall,
}

/// A response that arrived for a superseded ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleResponse {
    pub ticket: Ticket,
    pub current: Generation,
}

/// A collection that failed to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub ticket: Ticket,
    pub reason: String,
}

/// What happened to a response or failure handed back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The collection now holds the response.
    Applied(Collection),
    /// The collection could not be refreshed; it keeps its prior state.
    Failed(FetchFailure),
    /// The ticket was superseded; nothing changed.
    Discarded(StaleResponse),
}

/// Request bookkeeping for one collection.
#[derive(Debug, Clone, Default)]
struct Slot {
    pending: Option<Generation>,
    failure: Option<String>,
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

/// The filter state machine.
#[derive(Debug)]
pub struct FetchOrchestrator<C: Clock = SystemClock> {
    state: FilterState,
    enabled: EnabledSet,
    collections: DerivedCollections,
    slots: BTreeMap<Collection, Slot>,
    graph: ConstraintGraph,
    resolver: DateRangeResolver,
    clock: C,
}

impl Default for FetchOrchestrator<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> FetchOrchestrator<C> {
    /// Create an orchestrator with the standard constraint table and a
    /// Monday week start.
    pub fn new(clock: C) -> Self {
        Self::with_parts(ConstraintGraph::standard(), DateRangeResolver::default(), clock)
    }

    pub fn with_parts(graph: ConstraintGraph, resolver: DateRangeResolver, clock: C) -> Self {
        Self {
            state: FilterState::new(),
            enabled: EnabledSet::unconstrained(),
            collections: DerivedCollections::new(),
            slots: BTreeMap::new(),
            graph,
            resolver,
            clock,
        }
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn enabled(&self) -> &EnabledSet {
        &self.enabled
    }

    pub fn collections(&self) -> &DerivedCollections {
        &self.collections
    }

    pub fn graph(&self) -> &ConstraintGraph {
        &self.graph
    }

    /// Generation of the outstanding request for a collection, if any.
    pub fn pending(&self, collection: Collection) -> Option<Generation> {
        self.slots.get(&collection).and_then(|slot| slot.pending)
    }

    /// Reason the last refresh of a collection failed, until it is
    /// invalidated or refetched.
    pub fn last_failure(&self, collection: Collection) -> Option<&str> {
        self.slots
            .get(&collection)
            .and_then(|slot| slot.failure.as_deref())
    }

    /// Date bounds for the current range token; `None` for unknown tokens.
    pub fn bounds(&self) -> Option<DateBounds> {
        self.resolver
            .resolve(self.state.date_range(), self.clock.today())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Initial load: the organization list (once) and the campaign list for
    /// the default state. Enables the active channel's dimensions.
    pub fn start(&mut self) -> Vec<FetchRequest> {
        self.enabled = self.graph.after_channel(self.state.channel());
        vec![
            self.issue(Collection::Organizations, ServiceCall::Organizations),
            self.issue_campaigns(),
        ]
    }

    /// Apply one mutation.
    pub fn apply(&mut self, mutation: Mutation) -> Vec<FetchRequest> {
        match mutation {
            Mutation::DateRange { token } => self.set_date_range(&token),
            Mutation::Select { selector, value } => self.set_selector(selector, &value),
            Mutation::Channel { channel } => self.set_channel(channel),
            Mutation::Dimension { dimension, value } => self.set_dimension(dimension, &value),
            Mutation::SelectAsset { kind, id } => {
                self.select_asset(AssetRef::new(kind, id));
                Vec::new()
            }
            Mutation::Reset => self.reset(),
            Mutation::Submit => vec![self.submit()],
        }
    }

    pub fn set_date_range(&mut self, token: &str) -> Vec<FetchRequest> {
        if !self.state.set_date_range(token) {
            return Vec::new();
        }
        self.after_change(FilterField::DateRange)
    }

    pub fn set_selector(&mut self, selector: Selector, value: &str) -> Vec<FetchRequest> {
        if !self.state.set_selector(selector, value) {
            return Vec::new();
        }
        self.after_change(FilterField::Selector(selector))
    }

    /// Switch channel: full reset of the enabled set to the new channel's
    /// dimensions, then the channel row of the dependency table.
    pub fn set_channel(&mut self, channel: Channel) -> Vec<FetchRequest> {
        if !self.state.set_channel(channel) {
            return Vec::new();
        }
        self.enabled = self.graph.after_channel(channel);
        self.after_change(FilterField::Channel)
    }

    /// Set a breakdown dimension and narrow the enabled set around it.
    ///
    /// Values held by dimensions that become disabled are kept.
    pub fn set_dimension(&mut self, dimension: Dimension, value: &str) -> Vec<FetchRequest> {
        if !self.state.set_dimension(dimension, value) {
            return Vec::new();
        }
        self.enabled = self.graph.after_select(self.state.channel(), dimension);
        self.after_change(FilterField::Dimension(dimension))
    }

    /// Convenience for `set_dimension(ShowProducts, ..)`.
    pub fn set_show_products(&mut self, toggle: ProductsToggle) -> Vec<FetchRequest> {
        self.set_dimension(Dimension::ShowProducts, toggle.as_str())
    }

    /// Choose the creative element or product for the next report.
    /// Returns the previous selection.
    ///
    /// A different selection changes the report payload, so it starts a new
    /// generation and an outstanding report request is dropped.
    pub fn select_asset(&mut self, asset: AssetRef) -> Option<AssetRef> {
        if self.state.asset() == Some(&asset) {
            return Some(asset);
        }
        let previous = self.state.select_asset(asset);
        self.state.advance();
        if let Some(slot) = self.slots.get_mut(&Collection::Metrics) {
            slot.pending = None;
        }
        previous
    }

    /// Restore defaults, the unconstrained enabled set, and empty derived
    /// collections. Organizations are kept; the campaign list for the
    /// default state is requested again.
    pub fn reset(&mut self) -> Vec<FetchRequest> {
        self.state.reset();
        self.state.advance();
        self.enabled = EnabledSet::unconstrained();
        for collection in [
            Collection::Campaigns,
            Collection::Assets,
            Collection::Products,
            Collection::Metrics,
        ] {
            self.invalidate(collection);
        }
        vec![self.issue_campaigns()]
    }

    /// Request the metrics report for the whole current state with product
    /// mode forced off.
    pub fn submit(&mut self) -> FetchRequest {
        let bounds = self.bounds();
        let payload = metrics_payload(&self.state, bounds.as_ref(), MetricsIntent::Report);
        self.issue(
            Collection::Metrics,
            ServiceCall::Metrics {
                payload,
                intent: MetricsIntent::Report,
            },
        )
    }

    // =========================================================================
    // RESPONSES
    // =========================================================================

    /// Hand back a response. Applied only if its ticket is still the
    /// collection's outstanding one.
    pub fn complete(&mut self, ticket: Ticket, response: ServiceResponse) -> Completion {
        if let Some(stale) = self.take_pending(ticket) {
            return Completion::Discarded(stale);
        }
        match self.collections.store(ticket.collection, response) {
            Ok(()) => Completion::Applied(ticket.collection),
            Err(e) => self.record_failure(ticket, e.to_string()),
        }
    }

    /// Report that a request failed. The collection keeps its prior state;
    /// no retry is attempted.
    pub fn fail(&mut self, ticket: Ticket, reason: impl Into<String>) -> Completion {
        if let Some(stale) = self.take_pending(ticket) {
            return Completion::Discarded(stale);
        }
        self.record_failure(ticket, reason.into())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Common tail of every field change: new generation, asset selection
    /// dropped, dependency-table invalidation and refetch.
    fn after_change(&mut self, field: FilterField) -> Vec<FetchRequest> {
        self.state.advance();
        self.state.clear_asset();

        let effect = effect_of(field);
        for collection in effect.invalidates {
            self.invalidate(*collection);
        }
        effect
            .refetch
            .and_then(|refetch| self.refetch(refetch))
            .into_iter()
            .collect()
    }

    fn refetch(&mut self, refetch: Refetch) -> Option<FetchRequest> {
        let intent = match refetch {
            Refetch::Campaigns => return Some(self.issue_campaigns()),
            Refetch::AssetsIfDemographic if self.state.has_demographic() => MetricsIntent::Assets,
            Refetch::ProductsIfShown if self.state.show_products() == ProductsToggle::Show => {
                MetricsIntent::Products
            }
            Refetch::AssetsIfDemographic | Refetch::ProductsIfShown => return None,
        };
        let bounds = self.bounds();
        let payload = metrics_payload(&self.state, bounds.as_ref(), intent);
        Some(self.issue(
            refetch.collection(),
            ServiceCall::Metrics { payload, intent },
        ))
    }

    fn issue_campaigns(&mut self) -> FetchRequest {
        let bounds = self.bounds();
        let filters = campaign_filters(&self.state, bounds.as_ref());
        self.issue(Collection::Campaigns, ServiceCall::Campaigns(filters))
    }

    fn issue(&mut self, collection: Collection, call: ServiceCall) -> FetchRequest {
        let ticket = Ticket {
            collection,
            generation: self.state.generation(),
        };
        let slot = self.slots.entry(collection).or_default();
        slot.pending = Some(ticket.generation);
        slot.failure = None;
        FetchRequest { ticket, call }
    }

    fn invalidate(&mut self, collection: Collection) {
        self.collections.clear(collection);
        self.slots.insert(collection, Slot::default());
    }

    /// Consume the outstanding ticket, or describe why `ticket` is stale.
    fn take_pending(&mut self, ticket: Ticket) -> Option<StaleResponse> {
        let slot = self.slots.entry(ticket.collection).or_default();
        if slot.pending != Some(ticket.generation) {
            return Some(StaleResponse {
                ticket,
                current: self.state.generation(),
            });
        }
        slot.pending = None;
        None
    }

    fn record_failure(&mut self, ticket: Ticket, reason: String) -> Completion {
        self.slots.entry(ticket.collection).or_default().failure = Some(reason.clone());
        Completion::Failed(FetchFailure { ticket, reason })
    }
}

// =============================================================================
// TESTS
// =============================================================================
