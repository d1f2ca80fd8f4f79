//! Access guard over the external identity collaborator.
//!
//! # Responsibility
//! - Carry the per-request authenticated identity as an explicit context
//!   value instead of ambient state.
//! - Reject unauthenticated callers before any store access.
//!
//! # Invariants
//! - Identity verification itself is external; this module only consumes
//!   its "authenticated, and as whom" answer.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authenticated caller, as reported by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Per-request context threaded into every controller call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<Identity>,
}

impl RequestContext {
    /// Context for a request the identity collaborator has authenticated.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Context for a request with no valid session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the identity or rejects the request.
    pub fn require_identity(&self) -> Result<&Identity, Unauthorized> {
        self.identity.as_ref().ok_or(Unauthorized)
    }
}

/// The request carried no authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;

impl Display for Unauthorized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "authentication required")
    }
}

impl Error for Unauthorized {}
