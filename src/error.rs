//! Error taxonomy for discovery, transport and collection.

use crate::collectors::Domain;

#[derive(Debug, thiserror::Error)]
pub enum RedfishError {
    /// A call was attempted outside the `/redfish/v1` namespace.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Transport error for {path}: {message}")]
    Transport { path: String, message: String },

    #[error("{path}: HTTP {code} {status}")]
    HttpStatus {
        path: String,
        code: u16,
        status: String,
    },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Discovery failed at {step}: {source}")]
    Discovery {
        step: &'static str,
        #[source]
        source: Box<RedfishError>,
    },

    #[error("{domain} collector failed: {source}")]
    Collector {
        domain: Domain,
        #[source]
        source: Box<RedfishError>,
    },

    #[error("Target did not advertise a {0} endpoint")]
    MissingEndpoint(&'static str),

    #[error("Collection cycle deadline exceeded")]
    DeadlineExceeded,

    #[error("Collection cycle cancelled")]
    Cancelled,
}

impl RedfishError {
    pub(crate) fn discovery(step: &'static str, source: RedfishError) -> Self {
        Self::Discovery {
            step,
            source: Box::new(source),
        }
    }

    pub(crate) fn collector(domain: Domain, source: RedfishError) -> Self {
        Self::Collector {
            domain,
            source: Box::new(source),
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

pub type Result<T, E = RedfishError> = std::result::Result<T, E>;
