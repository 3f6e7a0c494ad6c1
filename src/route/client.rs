use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::RouteClientConfig;
use crate::route::model::{Route, RouteRequest};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Ship Jump Max is required.")]
    JumpMaxRequired,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),
    #[error("routing service returned status {0}")]
    Status(u16),
    #[error("could not decode routing response: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RouteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Network error: {0}")]
    Transport(#[from] TransportError),
    #[error("Route request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
    /// The collaborator answered with `ok: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("Malformed route response: {0}")]
    Malformed(String),
}

/// Carries a route request to the routing collaborator.
#[async_trait]
pub trait RouteTransport: Send + Sync {
    async fn fetch(&self, request: &RouteRequest) -> Result<Route, TransportError>;
}

/// Rejects requests that must never reach the collaborator.
pub fn validate(request: &RouteRequest) -> Result<(), ValidationError> {
    match request.ship_jump_max {
        Some(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(ValidationError::JumpMaxRequired),
    }
}

/// Turns a raw response into either a drawable route or an error.
pub fn normalize(route: Route) -> Result<Route, RouteError> {
    if !route.ok {
        let message = route
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "Route failed".to_owned());
        return Err(RouteError::Rejected(message));
    }
    if let Some(at) = route.first_gap() {
        return Err(RouteError::Malformed(format!(
            "hop {at} does not start where hop {} ended",
            at - 1
        )));
    }
    Ok(route)
}

/// Identifies one request; only the most recently issued ticket may apply its
/// result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteTicket(u64);

impl RouteTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: u64,
    pending: Option<RouteTicket>,
}

impl RequestTracker {
    /// Issues a new ticket, superseding any pending one.
    pub fn begin(&mut self) -> RouteTicket {
        self.issued += 1;
        let ticket = RouteTicket(self.issued);
        if let Some(old) = self.pending.replace(ticket) {
            debug!("route request {} superseded by {}", old.0, ticket.0);
        }
        ticket
    }

    pub fn is_current(&self, ticket: RouteTicket) -> bool {
        self.pending == Some(ticket)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending ticket. Returns false for a stale one.
    pub fn settle(&mut self, ticket: RouteTicket) -> bool {
        if self.is_current(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

pub struct RouteClient<T> {
    transport: T,
    timeout: Duration,
}

impl<T: RouteTransport> RouteClient<T> {
    pub fn new(transport: T, config: &RouteClientConfig) -> Self {
        RouteClient {
            transport,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn find_route(&self, request: &RouteRequest) -> Result<Route, RouteError> {
        validate(request)?;
        info!(
            "requesting route {} -> {} ({:?}, {:?})",
            request.from, request.to, request.metric, request.optimize
        );
        let raw = match tokio::time::timeout(self.timeout, self.transport.fetch(request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "route request {} -> {} timed out",
                    request.from, request.to
                );
                return Err(RouteError::Timeout(self.timeout));
            }
        };
        let route = normalize(raw)?;
        info!("route {} -> {} has {} hops", request.from, request.to, route.hops.len());
        Ok(route)
    }
}
