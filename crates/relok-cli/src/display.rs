//! Terminal output helpers

use console::style;
use relok_core::{AnalysisSummary, SourceShape};

pub fn step(message: &str) {
    eprintln!("{} {message}", style("→").blue());
}

pub fn ok(message: &str) {
    eprintln!("  {} {message}", style("✓").green());
}

pub fn warn(message: &str) {
    eprintln!("  {} {message}", style("⚠").yellow());
}

pub fn fail(message: &str) {
    eprintln!("  {} {message}", style("✗").red());
}

/// Human-readable shape name for reports
pub fn shape_name(shape: SourceShape) -> &'static str {
    match shape {
        SourceShape::String => "string",
        SourceShape::MapRegistryRepoTag => "map(registry,repository,tag)",
        SourceShape::MapRepoTag => "map(repository,tag)",
    }
}

/// Print run statistics, one category per line
pub fn summary(summary: &AnalysisSummary) {
    ok(&format!(
        "{} image(s) detected, {} relocated ({}% match rate)",
        summary.total_images,
        summary.relocated,
        summary.match_rate()
    ));
    if summary.skipped_excluded > 0 {
        warn(&format!("{} skipped (excluded registry)", summary.skipped_excluded));
    }
    if summary.skipped_out_of_scope > 0 {
        warn(&format!(
            "{} skipped (registry not in sources)",
            summary.skipped_out_of_scope
        ));
    }
    for error in &summary.errors {
        fail(&format!("{}: {} ({})", error.path, error.reason, error.raw));
    }
}
