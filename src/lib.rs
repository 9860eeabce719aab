//! Cell counting for microscopy images.
//!
//! The [`detector`] module holds the pure detection pipeline; [`batch`] and
//! [`report`] wrap it for directory processing and CSV/JSON reporting.

pub mod batch;
pub mod detector;
pub mod report;
pub mod synthetic;

pub use detector::{DetectionError, DetectionResult, DetectorConfig, detect};
