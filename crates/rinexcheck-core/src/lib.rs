pub mod alignment;
pub mod config;
pub mod differences;
pub mod error;
pub mod geodesy;
pub mod gps_time;
pub mod ingestion;
pub mod outputs;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod statistics;

pub use error::{PipelineError, Result};
