//! Outbound adapters implementing the domain's driven ports.
//!
//! - [`persistence`]: PostgreSQL via Diesel.
//! - [`memory`]: process-local fallback used without a database.
//! - [`security`]: password hashing and bearer tokens.

pub mod memory;
pub mod persistence;
pub mod security;
