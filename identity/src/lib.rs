//! CRM identity core: credential and session authority.
//!
//! Authenticates principals (admins, clients, managers), maintains the
//! soft-delete-aware user store, and writes a tamper-evident audit trail
//! alongside every identity mutation. Token issuance and password hashing
//! live in the `auth` crate; this crate owns the domain model and the
//! Postgres adapters.
//!
//! This is a library consumed by a transport layer (HTTP/RPC) that is out of
//! scope here; there is no server binary.

pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::audit;
pub use domain::errors;
pub use domain::user;
pub use outbound::repositories;
