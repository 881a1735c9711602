//! Cascading browse filter: state store, dependency resolver and URL sync.
//!
//! # Responsibility
//! - Own the authoritative selection for one notes view.
//! - Keep child selections valid relative to their parents.
//! - Mirror the selection into the navigable query string.

pub mod query;
pub mod state;
