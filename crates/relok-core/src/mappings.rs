//! Registry mapping configuration
//!
//! Explicit source-to-target registry overrides. When an enabled mapping
//! matches an image's effective registry it takes precedence over the path
//! strategy. Two file formats are accepted:
//!
//! ```yaml
//! version: "1.0"
//! registries:
//!   mappings:
//!     - source: docker.io
//!       target: registry.local/docker
//!       enabled: true
//! ```
//!
//! and the legacy flat form, treated as an all-enabled mapping list:
//!
//! ```yaml
//! docker.io: registry.local/docker
//! quay.io: registry.local/quay
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::image::normalize_registry;

/// A single source-to-target registry override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMapping {
    pub source: String,
    pub target: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Ordered collection of registry mappings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryMappings {
    mappings: Vec<RegistryMapping>,
}

#[derive(Deserialize)]
struct StructuredFile {
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<String>,
    registries: StructuredRegistries,
}

#[derive(Deserialize)]
struct StructuredRegistries {
    mappings: Vec<RegistryMapping>,
}

impl RegistryMappings {
    pub fn new(mappings: Vec<RegistryMapping>) -> Result<Self> {
        for m in &mappings {
            if m.source.trim().is_empty() || m.target.trim().is_empty() {
                return Err(CoreError::InvalidMappings {
                    message: format!(
                        "mapping entry must have a source and a target (source: '{}', target: '{}')",
                        m.source, m.target
                    ),
                });
            }
        }
        Ok(Self { mappings })
    }

    /// Parse mappings from YAML, accepting both the structured and the
    /// legacy flat format.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(file) = serde_yaml::from_str::<StructuredFile>(yaml) {
            return Self::new(file.registries.mappings);
        }

        // Legacy flat `source: target` map, all entries enabled
        let flat: Vec<(String, String)> = serde_yaml::from_str::<serde_yaml::Mapping>(yaml)
            .map_err(|e| CoreError::InvalidMappings {
                message: format!("not a mappings file: {e}"),
            })?
            .into_iter()
            .map(|(k, v)| match (k.as_str(), v.as_str()) {
                (Some(k), Some(v)) => Ok((k.to_string(), v.to_string())),
                _ => Err(CoreError::InvalidMappings {
                    message: "legacy mappings must map registry strings to registry strings"
                        .to_string(),
                }),
            })
            .collect::<Result<_>>()?;

        Self::new(
            flat.into_iter()
                .map(|(source, target)| RegistryMapping {
                    source: source.trim().to_string(),
                    target: target.trim().to_string(),
                    enabled: true,
                })
                .collect(),
        )
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Target registry for a source registry, if an enabled mapping matches.
    /// Comparison is over normalized registry names.
    pub fn target_for(&self, source: &str) -> Option<&str> {
        let normalized = normalize_registry(source);
        self.mappings
            .iter()
            .find(|m| m.enabled && normalize_registry(&m.source) == normalized)
            .map(|m| m.target.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryMapping> {
        self.mappings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_format() {
        let mappings = RegistryMappings::from_yaml(
            r#"
version: "1.0"
registries:
  mappings:
    - source: docker.io
      target: registry.local/docker
      enabled: true
    - source: quay.io
      target: registry.local/quay
      enabled: false
"#,
        )
        .unwrap();

        assert_eq!(mappings.target_for("docker.io"), Some("registry.local/docker"));
        // Disabled entries never match
        assert_eq!(mappings.target_for("quay.io"), None);
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let mappings = RegistryMappings::from_yaml(
            r#"
registries:
  mappings:
    - source: gcr.io
      target: registry.local/gcr
"#,
        )
        .unwrap();
        assert_eq!(mappings.target_for("gcr.io"), Some("registry.local/gcr"));
    }

    #[test]
    fn test_legacy_flat_format() {
        let mappings = RegistryMappings::from_yaml(
            r#"
docker.io: registry.local/docker
quay.io: registry.local/quay
"#,
        )
        .unwrap();

        assert_eq!(mappings.target_for("docker.io"), Some("registry.local/docker"));
        assert_eq!(mappings.target_for("quay.io"), Some("registry.local/quay"));
        assert_eq!(mappings.target_for("gcr.io"), None);
    }

    #[test]
    fn test_lookup_is_normalized() {
        let mappings = RegistryMappings::from_yaml("index.docker.io: registry.local/docker").unwrap();
        assert_eq!(mappings.target_for("docker.io"), Some("registry.local/docker"));
        assert_eq!(mappings.target_for("DOCKER.IO:443"), Some("registry.local/docker"));
    }

    #[test]
    fn test_empty_file() {
        let mappings = RegistryMappings::from_yaml("").unwrap();
        assert!(mappings.is_empty());
    }

    #[test]
    fn test_malformed_entry_is_configuration_error() {
        let err = RegistryMappings::from_yaml(
            r#"
registries:
  mappings:
    - source: docker.io
      target: ""
"#,
        )
        .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_non_string_legacy_values_rejected() {
        let err = RegistryMappings::from_yaml("docker.io: [a, b]").unwrap_err();
        assert!(matches!(err, CoreError::InvalidMappings { .. }));
    }
}
