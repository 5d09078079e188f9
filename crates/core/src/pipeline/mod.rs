//! Pipeline orchestration

pub mod ports;
pub mod service;

pub use service::{PipelineReport, PipelineService, SnapshotSelection};
