//! Last-request-wins gate for interactive dashboards.
//!
//! The HTTP router and CLI answer each request independently and do not use this.
//! An embedder that issues overlapping refreshes for one dashboard (a UI event
//! loop, a websocket handler) owns one `InsightsSession` per dashboard and routes
//! every refresh through [`InsightsSession::begin`] and [`InsightsSession::run`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::report::InsightsReport;
use super::service::{InsightFilters, InsightsError, InsightsService};
use crate::reference::ReferenceDataProvider;

/// A refresh request tagged with the filters and generation it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    filters: InsightFilters,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filters(&self) -> &InsightFilters {
        &self.filters
    }
}

#[derive(Debug)]
pub enum SessionOutcome {
    Current(InsightsReport),
    /// A newer request was issued while this one was in flight; its result was dropped.
    Superseded { generation: u64, latest: u64 },
}

/// One dashboard's filter session. The most recently issued request wins;
/// results for older tickets are discarded once their fetch resolves.
pub struct InsightsSession<P> {
    service: Arc<InsightsService<P>>,
    generation: AtomicU64,
}

impl<P> InsightsSession<P>
where
    P: ReferenceDataProvider + 'static,
{
    pub fn new(service: Arc<InsightsService<P>>) -> Self {
        Self {
            service,
            generation: AtomicU64::new(0),
        }
    }

    /// Register a new filter selection, superseding every earlier ticket.
    pub fn begin(&self, filters: InsightFilters) -> RequestTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        RequestTicket {
            generation,
            filters,
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.generation
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Fetch and recompute for `ticket`, keeping the result only if it is still current.
    pub async fn run(&self, ticket: &RequestTicket) -> Result<SessionOutcome, InsightsError> {
        let report = self.service.query(&ticket.filters).await?;

        let latest = self.latest_generation();
        if latest != ticket.generation {
            debug!(
                generation = ticket.generation,
                latest, "discarding stale insights result"
            );
            return Ok(SessionOutcome::Superseded {
                generation: ticket.generation,
                latest,
            });
        }

        Ok(SessionOutcome::Current(report))
    }
}
