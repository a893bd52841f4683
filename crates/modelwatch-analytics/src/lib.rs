//! modelwatch-analytics: aggregation helpers for ML model portfolio monitoring.
//!
//! This crate turns raw record collections (registry models, metric snapshots,
//! monitoring jobs, deployments and data-quality reports) into the summaries
//! shown on a monitoring dashboard: health rollups, drift box-plots, quality
//! heatmap rows, KPI lists with RAG-style status and deployment tables.
//!
//! Every aggregator is a pure function over borrowed slices. Missing optional
//! fields and empty collections resolve to literal defaults instead of errors,
//! so the functions can be re-run on every filter change without guarding.
pub mod aggregate;
pub mod config;
pub mod detection;
pub mod error;
pub mod records;
pub mod stats;

pub use error::AnalyticsError;
