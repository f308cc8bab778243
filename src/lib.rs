//! Multi-vendor Redfish collection engine: discovery, vendor quirk
//! normalization, and bounded concurrent collection of hardware health facts.

pub mod collectors;
pub mod config;
pub mod discovery;
pub mod error;
pub mod identifiers;
pub mod pipeline;
pub mod quirks;
pub mod records;
pub mod redfish;

pub use collectors::Domain;
pub use discovery::{discover, EndpointMap, ProtocolVersion, Session, Vendor};
pub use error::{RedfishError, Result};
pub use pipeline::{start_collection, CollectionHandle, CollectionOptions, CycleReport, DomainOutcome};
pub use records::DomainRecord;
pub use redfish::{Credentials, HttpTransport, RedfishTransport};
