//! modelwatch-export: compose monitoring reports into paginated documents or slide decks.
//!
//! The export path takes the aggregates produced by `modelwatch-analytics`,
//! asks a [`capture::CaptureAdapter`] for a raster image of each included
//! chart section and lays everything out behind a cover block. Two composers
//! share one section list: a fixed-page-size document with a running
//! vertical cursor, and a wide-layout slide deck with one section per slide.
//! Finished documents are written as self-contained HTML artifacts.
pub mod capture;
pub mod composer;
pub mod config;
pub mod cover;
pub mod error;
pub mod layout;
pub mod orchestrator;
pub mod render;
pub mod section;

pub use config::{ExportConfig, ExportFormat};
pub use error::ExportError;
pub use orchestrator::{ExportOrchestrator, ExportOutcome, ExportRequest};
