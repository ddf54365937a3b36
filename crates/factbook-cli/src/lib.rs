//! The `factbook` batch pipeline: settings, the raw document source and the
//! stage orchestration shared by every subcommand.

pub mod config;
pub mod digest;
pub mod pipeline;
pub mod source;

pub use crate::config::Settings;
pub use crate::pipeline::{IngestReport, Pipeline};
pub use crate::source::{DirSource, RawSource};
