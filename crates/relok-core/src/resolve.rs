//! Registry scope resolution and destination computation

use crate::image::{normalize_registry, ImageReference};
use crate::mappings::RegistryMappings;
use crate::strategy::PathStrategy;

/// Whether an image is subject to redirection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Registry is a configured source and not excluded
    InScope,
    /// Registry is both a source and explicitly excluded (exclusion wins)
    Excluded,
    /// Registry is not among the configured sources
    OutOfScope,
}

/// Where an in-scope image will be pulled from after redirection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub registry: String,
    pub repository: String,
}

/// Decide whether a reference is in scope for redirection.
///
/// All comparisons are over normalized registry names. A registry present
/// in both sets is `Excluded` -- exclusion always wins over inclusion.
pub fn resolve_scope(
    reference: &ImageReference,
    source_registries: &[String],
    exclude_registries: &[String],
) -> Scope {
    let effective = reference.effective_registry();

    if exclude_registries.iter().any(|r| normalize_registry(r) == effective) {
        return Scope::Excluded;
    }
    if source_registries.iter().any(|r| normalize_registry(r) == effective) {
        return Scope::InScope;
    }
    Scope::OutOfScope
}

/// Compute the destination for an in-scope reference.
///
/// An enabled [`RegistryMappings`] entry for the effective registry takes
/// precedence: its target becomes the destination registry verbatim and the
/// repository is kept unchanged. Otherwise the path strategy computes the
/// repository under `target_registry`.
pub fn resolve_destination(
    reference: &ImageReference,
    target_registry: &str,
    mappings: &RegistryMappings,
    strategy: PathStrategy,
) -> Destination {
    let source_registry = reference.effective_registry();
    let repository = reference.effective_repository();

    if let Some(target) = mappings.target_for(&source_registry) {
        return Destination {
            registry: target.to_string(),
            repository,
        };
    }

    Destination {
        registry: target_registry.to_string(),
        repository: strategy.destination_repository(&source_registry, &repository),
    }
}
