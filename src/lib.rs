pub mod adapters;
pub mod config;
pub mod convert;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use core::{engine::ReportEngine, pipeline::ReportPipeline};
pub use render::OdtRenderer;
pub use utils::error::{ReportError, Result};
