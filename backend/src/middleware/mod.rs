//! Actix middleware shared by every route.

pub mod trace;

pub use trace::{RequestTrace, TraceId};
