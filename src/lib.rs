//! Batch cleaner for a tabular customer dataset.
//!
//! A table is loaded (usually from CSV), run through five fixed cleaning
//! steps and written back out. See [`pipeline::clean`].

pub mod coerce;
pub mod config;
pub mod constants;
pub mod csv_io;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod stats;
pub mod table;

pub use error::{CleanerError, Result};
pub use pipeline::{clean, CleaningPipeline, CleaningReport, CleaningStep, StepResult};
pub use table::{ColumnKind, Table, Value};
