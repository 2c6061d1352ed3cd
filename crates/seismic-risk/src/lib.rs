//! Composite seismic-risk scoring for building footprint layers.
//!
//! The [`scoring`] module holds the engine: a rule catalog describing how each
//! attribute is turned into a sub-score, the normalization bounds derived from
//! the feature population, and the weighted per-category aggregation that is
//! multiplied into a single risk value. The [`layer`] module provides the
//! feature store the engine reads from and writes back to.

pub mod config;
pub mod error;
pub mod layer;
pub mod router;
pub mod scoring;
pub mod telemetry;
