//! Inspect command - report image patterns without generating overrides

use clap::ValueEnum;
use relok_chart::LoadedChart;
use relok_core::{generator, resolve, Scope};
use serde_json::json;
use std::path::Path;

use crate::display;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
    Json,
}

pub fn run(chart_path: &Path, source_registries: &[String], format: OutputFormat) -> Result<()> {
    let chart = LoadedChart::load(chart_path)?;
    let values = chart.merged_values();
    let analysis = generator::analyze(&values);

    match format {
        OutputFormat::Text => print_text(&chart, &analysis, source_registries),
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&to_report(&chart, &analysis)).map_err(
                |e| crate::error::CliError::internal(e.to_string()),
            )?);
        }
        OutputFormat::Json => {
            println!("{:#}", to_report(&chart, &analysis));
        }
    }

    Ok(())
}

fn scope_label(
    reference: &relok_core::ImageReference,
    source_registries: &[String],
) -> Option<&'static str> {
    if source_registries.is_empty() {
        return None;
    }
    Some(
        match resolve::resolve_scope(reference, source_registries, &[]) {
            Scope::InScope => "in scope",
            Scope::OutOfScope => "out of scope",
            Scope::Excluded => "excluded",
        },
    )
}

fn print_text(
    chart: &LoadedChart,
    analysis: &generator::ChartAnalysis,
    source_registries: &[String],
) {
    display::step(&format!(
        "Inspecting chart {} v{}",
        chart.manifest.name, chart.manifest.version
    ));

    for (name, key) in chart.dependency_keys() {
        if name == key {
            display::ok(&format!("dependency {name}"));
        } else {
            display::ok(&format!("dependency {name} (alias {key})"));
        }
    }

    if analysis.image_patterns.is_empty() {
        display::warn("no image patterns detected");
    }
    for pattern in &analysis.image_patterns {
        let scope = scope_label(&pattern.reference, source_registries)
            .map(|s| format!(" [{s}]"))
            .unwrap_or_default();
        display::ok(&format!(
            "{}: {} ({}){scope}",
            pattern.path,
            pattern.reference,
            display::shape_name(pattern.shape),
        ));
    }

    for global in &analysis.global_patterns {
        display::ok(&format!("{}: global registry configuration", global.path));
    }

    for unsupported in &analysis.unsupported {
        display::fail(&format!("{}: {}", unsupported.path, unsupported.reason));
    }
}

fn to_report(chart: &LoadedChart, analysis: &generator::ChartAnalysis) -> serde_json::Value {
    json!({
        "chart": {
            "name": chart.manifest.name,
            "version": chart.manifest.version.to_string(),
        },
        "imagePatterns": analysis
            .image_patterns
            .iter()
            .map(|p| {
                json!({
                    "path": p.path.to_string(),
                    "shape": display::shape_name(p.shape),
                    "reference": p.reference.to_string(),
                    "effectiveRegistry": p.reference.effective_registry(),
                })
            })
            .collect::<Vec<_>>(),
        "globalPatterns": analysis
            .global_patterns
            .iter()
            .map(|g| json!({"path": g.path.to_string()}))
            .collect::<Vec<_>>(),
        "unsupported": analysis
            .unsupported
            .iter()
            .map(|u| {
                json!({
                    "path": u.path.to_string(),
                    "reason": u.reason.to_string(),
                    "value": u.raw,
                })
            })
            .collect::<Vec<_>>(),
    })
}
