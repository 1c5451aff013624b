//! Location resolver: one best-effort IP lookup per mount.
//!
//! Flow: GET endpoint → status check → JSON body → `loc` → coordinate.
//! Any failure becomes `Unresolved(reason)`; nothing propagates.

use std::sync::Arc;

use super::providers::{self, Transport, UreqTransport};
use super::types::{LocationInfo, LookupError, ResolutionOutcome, UnresolvedReason};
use crate::config::MapConfig;

/// Logged, together with the underlying error, when the transport fails.
pub const FETCH_ERROR_PREFIX: &str = "Error fetching IP info:";

/// Resolves the caller's approximate location through ipinfo.io.
pub struct LocationResolver {
    transport: Box<dyn Transport>,
    url: String,
}

impl LocationResolver {
    /// Resolver using the real HTTP transport.
    pub fn new(config: &MapConfig) -> Self {
        Self::with_transport(config, UreqTransport)
    }

    /// Resolver with a specific transport (for testing).
    pub fn with_transport(config: &MapConfig, transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            url: config.lookup_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform the lookup. Blocks on the transport.
    pub fn resolve(&self) -> ResolutionOutcome {
        match self.try_resolve() {
            Ok(info) => {
                tracing::debug!(lat = info.coordinate.lat, lng = info.coordinate.lng, "IP location resolved");
                ResolutionOutcome::Resolved(info)
            }
            Err(LookupError::Network(e)) => {
                tracing::error!(error = %e, "{}", FETCH_ERROR_PREFIX);
                ResolutionOutcome::Unresolved(UnresolvedReason::NetworkError)
            }
            Err(e) => {
                let reason = e.reason();
                tracing::debug!(%reason, "IP location unresolved: {}", e);
                ResolutionOutcome::Unresolved(reason)
            }
        }
    }

    /// Run [`resolve`](Self::resolve) on tokio's blocking pool.
    pub async fn resolve_async(self: Arc<Self>) -> ResolutionOutcome {
        match tokio::task::spawn_blocking(move || self.resolve()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "{}", FETCH_ERROR_PREFIX);
                ResolutionOutcome::Unresolved(UnresolvedReason::NetworkError)
            }
        }
    }

    fn try_resolve(&self) -> Result<LocationInfo, LookupError> {
        let response = self.transport.get(&self.url)?;
        if !response.ok() {
            return Err(LookupError::Status(response.status));
        }
        providers::parse_ipinfo(&response.body)
    }
}
