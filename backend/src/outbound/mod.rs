//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern:
//!
//! - **backend**: validated connection settings and the shared HTTP handle
//! - **identity**: the HTTP identity provider speaking the backend's auth API
//!
//! Adapters are thin translators that convert between domain types and
//! wire representations. They contain no business logic.

pub mod backend;
pub mod identity;
