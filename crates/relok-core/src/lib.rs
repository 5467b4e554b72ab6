//! Relok Core - Image reference analysis and override generation
//!
//! This crate is the engine behind `relok`: it walks a chart's merged value
//! tree, recognizes every shape a container image can be declared in, decides
//! which images are in scope for redirection, computes their new location
//! under a target registry, and builds the smallest values overlay that
//! accomplishes the redirection.
//!
//! The engine never touches the filesystem or network: chart loading and
//! output writing live in `relok-chart` and the CLI.

pub mod detect;
pub mod error;
pub mod generator;
pub mod image;
pub mod mappings;
pub mod overrides;
pub mod resolve;
pub mod strategy;
pub mod values;

pub use detect::{Classification, GlobalPattern, ImagePattern, UnsupportedReason, UnsupportedStructure};
pub use error::{CoreError, Result};
pub use generator::{
    AnalysisError, AnalysisSummary, ChartAnalysis, GenerationReport, Generator, GeneratorConfig,
    Outcome,
};
pub use image::{ImageReference, SourceShape};
pub use mappings::{RegistryMapping, RegistryMappings};
pub use overrides::{OverrideBuilder, OverrideDocument};
pub use resolve::{Destination, Scope};
pub use strategy::PathStrategy;
pub use values::{PathSegment, ValuePath, Values};
