// ── Fleet filtering ──
//
// Client-side search and route filtering for the dashboard and
// `buses list`. The registry itself never filters.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::model::Bus;

/// Search query plus optional exact route filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusFilter {
    /// Case-insensitive substring over number, route and stop names.
    pub query: String,
    /// Exact route name; `None` means all routes.
    pub route: Option<String>,
}

impl BusFilter {
    pub fn new(query: impl Into<String>, route: Option<String>) -> Self {
        Self {
            query: query.into(),
            route,
        }
    }

    pub fn matches(&self, bus: &Bus) -> bool {
        self.route.as_ref().is_none_or(|r| *r == bus.route) && bus.matches(&self.query)
    }

    /// Matching buses, in input order.
    pub fn apply(&self, buses: &[Arc<Bus>]) -> Vec<Arc<Bus>> {
        buses.iter().filter(|b| self.matches(b)).cloned().collect()
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.route.is_some()
    }
}

/// Unique route names in first-seen order.
pub fn distinct_routes(buses: &[Arc<Bus>]) -> Vec<String> {
    let mut seen = HashSet::new();
    buses
        .iter()
        .filter(|b| seen.insert(b.route.as_str()))
        .map(|b| b.route.clone())
        .collect()
}

/// Headline counts shown above the bus list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub routes: usize,
    pub matching: usize,
}

impl FleetSummary {
    pub fn compute(buses: &[Arc<Bus>], filter: &BusFilter) -> Self {
        Self {
            total: buses.len(),
            routes: distinct_routes(buses).len(),
            matching: buses.iter().filter(|b| filter.matches(b)).count(),
        }
    }
}
