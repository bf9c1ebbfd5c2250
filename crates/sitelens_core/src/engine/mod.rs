//! In-memory record query engine.
//!
//! # Responsibility
//! - Derive metrics, filter, sort, aggregate and paginate record snapshots.
//! - Stay generic over record kind through [`record::QueryRecord`].
//!
//! # Invariants
//! - Every operation is a pure, synchronous function of its inputs.
//! - Inputs are never mutated; malformed values degrade, never fail.
//! - Nothing in this module logs.

pub mod aggregate;
pub mod criteria;
pub mod field;
pub mod metrics;
pub mod paginate;
pub mod pipeline;
pub mod record;
pub mod sort;
