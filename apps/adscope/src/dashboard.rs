//! # Dashboard Driver
//!
//! The event loop around a [`FetchOrchestrator`].
//!
//! Mutations are applied one at a time; the requests each one produces are
//! sent concurrently on a [`JoinSet`]. Responses are handed back to the
//! orchestrator in arrival order, which discards anything superseded in the
//! meantime.

use crate::client::{AnalyticsService, ClientError};
use adscope_core::{
    Clock, Completion, FetchFailure, FetchOrchestrator, FetchRequest, Mutation, ServiceResponse,
    SystemClock, Ticket,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

type Outcome = Result<ServiceResponse, ClientError>;

/// Owns the orchestrator and the in-flight requests.
pub struct Dashboard<S: AnalyticsService, C: Clock = SystemClock> {
    orchestrator: FetchOrchestrator<C>,
    service: Arc<S>,
    in_flight: JoinSet<Outcome>,
    /// Ticket of every spawned request, so a task that dies still reports.
    tickets: HashMap<Id, Ticket>,
}

impl<S: AnalyticsService, C: Clock> Dashboard<S, C> {
    pub fn new(orchestrator: FetchOrchestrator<C>, service: S) -> Self {
        Self {
            orchestrator,
            service: Arc::new(service),
            in_flight: JoinSet::new(),
            tickets: HashMap::new(),
        }
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator<C> {
        &self.orchestrator
    }

    /// Number of requests not yet handed back.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Issue the initial organization and campaign listings.
    pub fn start(&mut self) {
        let requests = self.orchestrator.start();
        self.dispatch(requests);
    }

    /// Apply one mutation and send whatever it requests.
    pub fn apply(&mut self, mutation: Mutation) {
        debug!(action = mutation.label(), "applying mutation");
        let requests = self.orchestrator.apply(mutation);
        self.dispatch(requests);
    }

    /// Wait for the next response and hand it to the orchestrator.
    ///
    /// Returns `None` once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        loop {
            let (id, result) = match self.in_flight.join_next_with_id().await? {
                Ok((id, outcome)) => (id, outcome.map_err(|e| e.to_string())),
                Err(e) => {
                    warn!(error = %e, "request task did not finish");
                    (e.id(), Err(format!("request task did not finish: {e}")))
                }
            };
            let Some(ticket) = self.tickets.remove(&id) else {
                continue;
            };

            let completion = match result {
                Ok(response) => self.orchestrator.complete(ticket, response),
                Err(reason) => self.orchestrator.fail(ticket, reason),
            };
            log_completion(&completion);
            return Some(completion);
        }
    }

    /// Wait for every in-flight request. Returns the failures that were
    /// recorded against the current state.
    pub async fn settle(&mut self) -> Vec<FetchFailure> {
        let mut failures = Vec::new();
        while let Some(completion) = self.next_completion().await {
            if let Completion::Failed(failure) = completion {
                failures.push(failure);
            }
        }
        failures
    }

    /// Apply each mutation in turn, letting its requests settle before the
    /// next one. Returns every failure recorded along the way.
    pub async fn replay(
        &mut self,
        mutations: impl IntoIterator<Item = Mutation>,
    ) -> Vec<FetchFailure> {
        let mut failures = self.settle().await;
        for mutation in mutations {
            self.apply(mutation);
            failures.extend(self.settle().await);
        }
        failures
    }

    fn dispatch(&mut self, requests: Vec<FetchRequest>) {
        for FetchRequest { ticket, call } in requests {
            debug!(
                collection = %ticket.collection,
                generation = ticket.generation.value(),
                "dispatching request"
            );
            let service = Arc::clone(&self.service);
            let handle = self
                .in_flight
                .spawn(async move { service.call(call).await });
            self.tickets.insert(handle.id(), ticket);
        }
    }
}

fn log_completion(completion: &Completion) {
    match completion {
        Completion::Applied(collection) => {
            debug!(collection = %collection, "collection refreshed");
        }
        Completion::Discarded(stale) => {
            debug!(
                collection = %stale.ticket.collection,
                generation = stale.ticket.generation.value(),
                current = stale.current.value(),
                "stale response discarded"
            );
        }
        Completion::Failed(failure) => {
            warn!(
                collection = %failure.ticket.collection,
                generation = failure.ticket.generation.value(),
                reason = %failure.reason,
                "collection refresh failed"
            );
        }
    }
}
