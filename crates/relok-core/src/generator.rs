//! Analysis and override generation policy
//!
//! [`analyze`] walks a merged value tree and reports every image pattern,
//! global registry knob and unsupported structure it finds. [`Generator`]
//! drives the same traversal for override generation: resolving scope per
//! image, computing destinations, accumulating the override tree and
//! enforcing strict-mode and threshold policy.
//!
//! Traversal is synchronous, depth-first and visits every node exactly
//! once; a map classified as an image (or unsupported) is not descended
//! into.

use serde_json::Value as JsonValue;

use crate::detect::{
    self, Classification, GlobalPattern, ImagePattern, UnsupportedStructure,
};
use crate::error::{CoreError, Result};
use crate::image::SourceShape;
use crate::mappings::RegistryMappings;
use crate::overrides::{OverrideBuilder, OverrideDocument};
use crate::resolve::{self, Scope};
use crate::strategy::PathStrategy;
use crate::values::{ValuePath, Values};

/// Everything detection found in one chart
#[derive(Debug, Default)]
pub struct ChartAnalysis {
    pub image_patterns: Vec<ImagePattern>,
    pub global_patterns: Vec<GlobalPattern>,
    pub unsupported: Vec<UnsupportedStructure>,
}

/// Walk a merged value tree and collect every detectable pattern.
pub fn analyze(values: &Values) -> ChartAnalysis {
    let mut analysis = ChartAnalysis::default();
    walk(values.inner(), &ValuePath::root(), None, &mut analysis);
    analysis
}

fn walk(
    node: &JsonValue,
    path: &ValuePath,
    inherited_registry: Option<&str>,
    analysis: &mut ChartAnalysis,
) {
    match detect::classify_node(node, path, inherited_registry) {
        Some(Classification::Image(pattern)) => {
            analysis.image_patterns.push(pattern);
        }
        Some(Classification::Unsupported(unsupported)) => {
            analysis.unsupported.push(unsupported);
        }
        None => match node {
            JsonValue::Object(map) => {
                // A `global` block updates the default registry for this
                // subtree and is recorded for visibility.
                let mut active_registry = inherited_registry.map(str::to_string);
                if let Some(JsonValue::Object(global)) = map.get("global") {
                    let global_path = path.key("global");
                    for (key, value) in global {
                        if detect::is_global_registry_key(key) && value.is_string() {
                            analysis.global_patterns.push(GlobalPattern {
                                path: global_path.key(key),
                            });
                        }
                    }
                    if let Some(JsonValue::String(registry)) = global.get("imageRegistry") {
                        active_registry = Some(registry.clone());
                    }
                }

                for (key, value) in map {
                    walk(value, &path.key(key), active_registry.as_deref(), analysis);
                }
            }
            JsonValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    walk(item, &path.index(i), inherited_registry, analysis);
                }
            }
            _ => {}
        },
    }
}

/// Terminal outcome of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Strict mode and at least one unsupported structure
    FailedStrict,
    /// Match rate fell below the configured threshold
    ThresholdNotMet,
}

/// A per-path diagnostic attached to the summary
#[derive(Debug, Clone)]
pub struct AnalysisError {
    pub path: ValuePath,
    pub raw: JsonValue,
    pub reason: String,
}

/// Run statistics, finalized once traversal completes
#[derive(Debug, Clone, Default)]
pub struct AnalysisSummary {
    pub total_images: usize,
    pub relocated: usize,
    pub skipped_excluded: usize,
    pub skipped_out_of_scope: usize,
    pub skipped_unsupported: usize,
    pub errors: Vec<AnalysisError>,
}

impl AnalysisSummary {
    /// Images the run was expected to relocate: in-scope detections plus
    /// unsupported structures. Exclusions and out-of-scope registries are
    /// policy decisions, not failures.
    pub fn eligible(&self) -> usize {
        self.relocated + self.skipped_unsupported
    }

    /// Percentage of eligible images successfully relocated (100 when
    /// nothing was eligible).
    pub fn match_rate(&self) -> u32 {
        let eligible = self.eligible();
        if eligible == 0 {
            100
        } else {
            (self.relocated * 100 / eligible) as u32
        }
    }
}

/// Result of one generation run. Failures still carry the full summary and
/// whatever overrides were accumulated.
#[derive(Debug)]
pub struct GenerationReport {
    pub outcome: Outcome,
    pub summary: AnalysisSummary,
    pub overrides: OverrideDocument,
}

/// Configuration for a generation run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub target_registry: String,
    pub source_registries: Vec<String>,
    pub exclude_registries: Vec<String>,
    pub strategy: PathStrategy,
    pub mappings: RegistryMappings,
    pub strict: bool,
    /// Minimum match rate (0-100) for the run to succeed
    pub threshold: u32,
}

impl GeneratorConfig {
    pub fn new(target_registry: impl Into<String>, source_registries: Vec<String>) -> Self {
        Self {
            target_registry: target_registry.into(),
            source_registries,
            exclude_registries: Vec::new(),
            strategy: PathStrategy::default(),
            mappings: RegistryMappings::default(),
            strict: false,
            threshold: 100,
        }
    }
}

/// Orchestrates traversal, resolution and override accumulation
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Validates the configuration; invalid thresholds are rejected here,
    /// before any traversal begins.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        if config.threshold > 100 {
            return Err(CoreError::InvalidThreshold {
                value: config.threshold,
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the override document for a merged value tree.
    ///
    /// Unsupported structures are always collected in full before strict
    /// mode fails the run, so diagnostics cover the whole chart.
    pub fn generate(&self, values: &Values) -> Result<GenerationReport> {
        let analysis = analyze(values);

        let mut summary = AnalysisSummary::default();
        let mut builder = OverrideBuilder::new();

        for pattern in &analysis.image_patterns {
            summary.total_images += 1;

            match resolve::resolve_scope(
                &pattern.reference,
                &self.config.source_registries,
                &self.config.exclude_registries,
            ) {
                Scope::Excluded => summary.skipped_excluded += 1,
                Scope::OutOfScope => summary.skipped_out_of_scope += 1,
                Scope::InScope => {
                    let destination = resolve::resolve_destination(
                        &pattern.reference,
                        &self.config.target_registry,
                        &self.config.mappings,
                        self.config.strategy,
                    );

                    match pattern.shape {
                        SourceShape::String => {
                            let mut value =
                                format!("{}/{}", destination.registry, destination.repository);
                            if let Some(digest) = &pattern.reference.digest {
                                value.push('@');
                                value.push_str(digest);
                            } else if let Some(tag) = &pattern.reference.tag {
                                value.push(':');
                                value.push_str(tag);
                            }
                            builder.add_string(&pattern.path, value)?;
                        }
                        SourceShape::MapRegistryRepoTag | SourceShape::MapRepoTag => {
                            builder.add_map(
                                &pattern.path,
                                &destination.registry,
                                &destination.repository,
                            )?;
                        }
                    }
                    summary.relocated += 1;
                }
            }
        }

        for unsupported in &analysis.unsupported {
            summary.skipped_unsupported += 1;
            summary.errors.push(AnalysisError {
                path: unsupported.path.clone(),
                raw: unsupported.raw.clone(),
                reason: unsupported.reason.to_string(),
            });
        }

        let outcome = if self.config.strict && !analysis.unsupported.is_empty() {
            Outcome::FailedStrict
        } else if summary.match_rate() < self.config.threshold {
            Outcome::ThresholdNotMet
        } else {
            Outcome::Succeeded
        };

        Ok(GenerationReport {
            outcome,
            summary,
            overrides: builder.finalize(),
        })
    }
}
