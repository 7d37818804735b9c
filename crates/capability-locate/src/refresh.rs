//! Immutable discovery snapshots with single-flight refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tracing::debug;

use crate::discovery::{Discovery, DiscoveryOptions, McpDiscoveryOptions};
use crate::types::{AgentProfile, McpServerEntry, Skill};

/// Result of one full discovery pass.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub skills: Vec<Skill>,
    pub mcp_servers: Vec<McpServerEntry>,
    pub agents: Vec<AgentProfile>,
    pub taken_at: SystemTime,
}

impl Snapshot {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            skills: Vec::new(),
            mcp_servers: Vec::new(),
            agents: Vec::new(),
            taken_at: SystemTime::UNIX_EPOCH,
        }
    }
}

/// Clears the in-flight flag when a refresh ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keeps the latest [`Snapshot`] and refreshes it on request.
///
/// A refresh requested while another one is running is dropped; the
/// running one is never cancelled.
#[derive(Debug)]
pub struct Refresher {
    discovery: Discovery,
    options: DiscoveryOptions,
    mcp_options: McpDiscoveryOptions,
    in_flight: AtomicBool,
    latest: RwLock<Arc<Snapshot>>,
}

impl Refresher {
    #[must_use]
    pub fn new(
        discovery: Discovery,
        options: DiscoveryOptions,
        mcp_options: McpDiscoveryOptions,
    ) -> Self {
        Self {
            discovery,
            options,
            mcp_options,
            in_flight: AtomicBool::new(false),
            latest: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// The most recent snapshot; empty before the first refresh.
    #[must_use]
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.latest.read().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs a discovery pass and publishes it.
    ///
    /// Returns `None` without doing anything if a refresh is already running.
    pub async fn refresh(&self) -> Option<Arc<Snapshot>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight, dropping request");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        let (skills, mcp_servers, agents) = tokio::join!(
            self.discovery.discover_skills(&self.options),
            self.discovery.discover_mcp_servers(&self.mcp_options),
            self.discovery.discover_agents(&self.options),
        );
        let snapshot = Arc::new(Snapshot {
            skills,
            mcp_servers,
            agents,
            taken_at: SystemTime::now(),
        });
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        Some(snapshot)
    }
}
