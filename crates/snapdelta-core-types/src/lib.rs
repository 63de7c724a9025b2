//! Core types shared across snapdelta facilities
//!
//! This crate provides foundational types used by the error, logging and
//! reporting facilities:
//!
//! - **Correlation types**: RequestId, TraceId, RunContext
//! - **Schema constants**: Canonical field keys, event names and snapshot labels

pub mod correlation;
pub mod schema;

pub use correlation::{RequestId, RunContext, TraceId};
