/*
    core_engine - Merge pipeline and query surface

    Handles:
    - Authorizing messages against custody, signer and fname state
    - Routing messages to their category store
    - Revoking a signer's messages across every store
    - Applying custody and name registry events
    - Change notification and the audit trail
    - Typed, argument-checked reads
*/

pub mod engine;
pub mod errors;
pub mod gate;
pub mod query;
pub mod reflector;
pub mod registry;
pub mod revocation;
pub mod router;

#[cfg(test)]
mod tests;

pub use engine::{Engine, EngineOptions};
pub use errors::{HubError, HubResult};
pub use gate::ValidationGate;
pub use query::QuerySurface;
pub use reflector::{AuditAction, AuditRecord, EventReflector, AUDIT_TARGET};
pub use registry::RegistryIngestor;
pub use revocation::{RevocationCoordinator, RevocationReport};
pub use router::MergeRouter;
