//! Core engine test suite
//!
//! Organized by component: gate, merge routing, revocation, registry
//! ingestion, queries, and order-independence properties.

mod convergence_tests;
mod query_tests;
mod registry_tests;

pub mod helpers;
