//! Request context carrying the authenticated subject.

use chrono::{DateTime, Utc};

use ota_auth::{Capability, TokenSubject};
use ota_core::error::AppError;

/// Context for the current authenticated request.
///
/// Built by the transport layer from a validated token and passed into
/// service methods so that every operation knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The validated token subject.
    pub subject: TokenSubject,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(subject: TokenSubject, ip_address: String, user_agent: Option<String>) -> Self {
        Self {
            subject,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Context for work started locally (CLI, maintenance tasks).
    pub fn local(subject: TokenSubject) -> Self {
        Self::new(subject, "local".to_string(), None)
    }

    /// Subject name of the caller.
    pub fn subject_name(&self) -> &str {
        &self.subject.name
    }

    /// Fails with `Forbidden` unless the caller holds `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        self.subject.require(capability)
    }
}
