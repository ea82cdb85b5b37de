// Data processing pipeline: ingestion of store exports, then the
// consolidate, normalize and match stages

pub mod ingestion;
pub mod processing;
pub mod runner;

pub use runner::Pipeline;
