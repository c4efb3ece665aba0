//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories built on Diesel.
//!
//! Adapters translate between domain types and storage representations and
//! carry no business rules.

pub mod persistence;
