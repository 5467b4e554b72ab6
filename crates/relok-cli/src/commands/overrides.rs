//! Override command - generate the redirection values overlay

use relok_chart::LoadedChart;
use relok_core::{Generator, GeneratorConfig, Outcome, PathStrategy, RegistryMappings};
use std::path::Path;

use crate::display;
use crate::error::{CliError, Result};

#[allow(clippy::too_many_arguments)]
pub fn run(
    chart_path: &Path,
    target_registry: &str,
    source_registries: &[String],
    exclude_registries: &[String],
    registry_file: Option<&Path>,
    strategy: &str,
    strict: bool,
    threshold: u32,
    output: Option<&Path>,
) -> Result<()> {
    let strategy: PathStrategy = strategy.parse().map_err(|e: relok_core::CoreError| {
        CliError::config_with_help(
            e.to_string(),
            format!(
                "known strategies: {}, {}",
                PathStrategy::PREFIX_SOURCE_REGISTRY,
                PathStrategy::FLAT
            ),
        )
    })?;

    let mappings = match registry_file {
        Some(path) => RegistryMappings::from_file(path)?,
        None => RegistryMappings::default(),
    };

    let generator = Generator::new(GeneratorConfig {
        target_registry: target_registry.to_string(),
        source_registries: source_registries.to_vec(),
        exclude_registries: exclude_registries.to_vec(),
        strategy,
        mappings,
        strict,
        threshold,
    })?;

    let chart = LoadedChart::load(chart_path)?;
    display::step(&format!(
        "Generating overrides for {} v{}",
        chart.manifest.name, chart.manifest.version
    ));

    let report = generator.generate(&chart.merged_values())?;
    display::summary(&report.summary);

    match report.outcome {
        Outcome::FailedStrict => {
            return Err(CliError::UnsupportedStructures {
                count: report.summary.skipped_unsupported,
            });
        }
        Outcome::ThresholdNotMet => {
            return Err(CliError::ThresholdNotMet {
                rate: report.summary.match_rate(),
                threshold,
            });
        }
        Outcome::Succeeded => {}
    }

    let yaml = report.overrides.to_yaml()?;
    match output {
        Some(path) => {
            std::fs::write(path, &yaml)?;
            display::ok(&format!("overrides written to {}", path.display()));
        }
        None => print!("{yaml}"),
    }

    Ok(())
}
