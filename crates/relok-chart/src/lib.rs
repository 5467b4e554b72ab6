//! Relok Chart - Helm chart loading and value merging
//!
//! Loads a chart directory (`Chart.yaml`, `values.yaml`, vendored
//! subcharts under `charts/`) and produces the fully merged value tree the
//! relok engine analyzes: subchart defaults nested under their dependency
//! alias, parent values overriding, `global` propagated chart-wide.

pub mod error;
pub mod loader;
pub mod manifest;

pub use error::{ChartError, Result};
pub use loader::LoadedChart;
pub use manifest::{ChartManifest, Dependency};
