//! Chart.yaml manifest model

use semver::Version;
use serde::{Deserialize, Serialize};

/// Parsed `Chart.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartManifest {
    #[serde(default)]
    pub api_version: Option<String>,

    pub name: String,

    pub version: Version,

    #[serde(default)]
    pub app_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A chart dependency declaration
///
/// The `alias` decides which top-level key the subchart's values live
/// under in the parent tree; without one the chart name is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub alias: Option<String>,

    #[serde(default)]
    pub condition: Option<String>,
}

impl ChartManifest {
    /// The values key for a dependency: its alias when declared, otherwise
    /// the chart name.
    pub fn value_key_for(&self, chart_name: &str) -> String {
        self.dependencies
            .iter()
            .find(|d| d.name == chart_name)
            .and_then(|d| d.alias.clone())
            .unwrap_or_else(|| chart_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest: ChartManifest = serde_yaml::from_str(
            r#"
apiVersion: v2
name: my-app
version: 1.2.3
appVersion: "4.5"
dependencies:
  - name: redis
    version: 18.x.x
    repository: https://charts.bitnami.com/bitnami
    alias: cache
    condition: cache.enabled
"#,
        )
        .unwrap();

        assert_eq!(manifest.name, "my-app");
        assert_eq!(manifest.version, Version::new(1, 2, 3));
        assert_eq!(manifest.dependencies.len(), 1);
        assert_eq!(manifest.dependencies[0].alias.as_deref(), Some("cache"));
        assert_eq!(manifest.value_key_for("redis"), "cache");
        assert_eq!(manifest.value_key_for("postgresql"), "postgresql");
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest: ChartManifest =
            serde_yaml::from_str("name: tiny\nversion: 0.1.0\n").unwrap();
        assert!(manifest.dependencies.is_empty());
        assert!(manifest.api_version.is_none());
    }
}
