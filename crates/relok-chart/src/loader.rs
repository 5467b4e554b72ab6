//! Chart directory loading and value tree merging

use relok_core::Values;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ChartError, Result};
use crate::manifest::ChartManifest;

/// A chart loaded from disk, with its vendored subcharts
#[derive(Debug)]
pub struct LoadedChart {
    pub path: PathBuf,
    pub manifest: ChartManifest,
    /// The chart's own values.yaml defaults
    pub values: Values,
    pub subcharts: Vec<LoadedChart>,
}

impl LoadedChart {
    /// Load a chart directory: `Chart.yaml` (required), `values.yaml`
    /// (optional) and directory subcharts under `charts/`.
    ///
    /// `.tgz` dependency archives are not unpacked; run `helm dep build`
    /// with untarred charts first if those images must be covered.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join("Chart.yaml");
        if !manifest_path.is_file() {
            return Err(ChartError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let manifest_raw = std::fs::read_to_string(&manifest_path)?;
        let manifest: ChartManifest =
            serde_yaml::from_str(&manifest_raw).map_err(|e| ChartError::InvalidManifest {
                path: manifest_path.clone(),
                message: e.to_string(),
            })?;

        let values_path = dir.join("values.yaml");
        let values = if values_path.is_file() {
            Values::from_file(&values_path)?
        } else {
            Values::new()
        };

        let mut subcharts = Vec::new();
        let charts_dir = dir.join("charts");
        if charts_dir.is_dir() {
            for entry in WalkDir::new(&charts_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| {
                    std::io::Error::other(format!("failed to scan {}: {e}", charts_dir.display()))
                })?;
                if entry.file_type().is_dir() && entry.path().join("Chart.yaml").is_file() {
                    subcharts.push(LoadedChart::load(entry.path())?);
                }
            }
        }

        Ok(Self {
            path: dir.to_path_buf(),
            manifest,
            values,
            subcharts,
        })
    }

    /// The fully merged value tree the engine analyzes.
    ///
    /// Merge order (lowest priority first): each subchart's own merged
    /// values nested under its alias-or-name key, then this chart's
    /// values.yaml. The parent therefore overrides subchart defaults, and
    /// `global` stays at the root.
    pub fn merged_values(&self) -> Values {
        let mut merged = Values::new();
        for sub in &self.subcharts {
            let key = self.manifest.value_key_for(&sub.manifest.name);
            merged.merge(&sub.merged_values().nest_under(&key));
        }
        merged.merge(&self.values);
        merged
    }

    /// `(chart name, values key)` pairs for every direct dependency that
    /// was actually vendored, for diagnostics.
    pub fn dependency_keys(&self) -> Vec<(String, String)> {
        self.subcharts
            .iter()
            .map(|sub| {
                let name = sub.manifest.name.clone();
                let key = self.manifest.value_key_for(&name);
                (name, key)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture_chart(root: &Path) {
        write(
            &root.join("Chart.yaml"),
            r#"
apiVersion: v2
name: parent
version: 1.0.0
dependencies:
  - name: redis
    version: 18.0.0
    alias: cache
"#,
        );
        write(
            &root.join("values.yaml"),
            r#"
image: "docker.io/team/app:1.0"
cache:
  image:
    tag: "7.4"
"#,
        );
        write(
            &root.join("charts/redis/Chart.yaml"),
            "apiVersion: v2\nname: redis\nversion: 18.0.0\n",
        );
        write(
            &root.join("charts/redis/values.yaml"),
            r#"
global:
  imageRegistry: docker.io
image:
  repository: bitnami/redis
  tag: "7.2"
"#,
        );
    }

    #[test]
    fn test_load_with_aliased_subchart() {
        let dir = tempfile::tempdir().unwrap();
        fixture_chart(dir.path());

        let chart = LoadedChart::load(dir.path()).unwrap();
        assert_eq!(chart.manifest.name, "parent");
        assert_eq!(chart.subcharts.len(), 1);
        assert_eq!(
            chart.dependency_keys(),
            vec![("redis".to_string(), "cache".to_string())]
        );
    }

    #[test]
    fn test_merged_values_alias_nesting_and_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fixture_chart(dir.path());

        let merged = LoadedChart::load(dir.path()).unwrap().merged_values();

        // Subchart defaults live under the alias, parent wins on conflict
        assert_eq!(merged.get("cache.image.repository").unwrap(), "bitnami/redis");
        assert_eq!(merged.get("cache.image.tag").unwrap(), "7.4");
        // Subchart global is hoisted to the root
        assert_eq!(merged.get("global.imageRegistry").unwrap(), "docker.io");
        assert_eq!(merged.get("image").unwrap(), "docker.io/team/app:1.0");
    }

    #[test]
    fn test_missing_chart_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoadedChart::load(dir.path()).unwrap_err();
        assert!(matches!(err, ChartError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("Chart.yaml"), "name: broken\nversion: not-semver\n");
        let err = LoadedChart::load(dir.path()).unwrap_err();
        assert!(matches!(err, ChartError::InvalidManifest { .. }));
    }

    #[test]
    fn test_values_yaml_optional() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("Chart.yaml"), "name: bare\nversion: 0.1.0\n");
        let chart = LoadedChart::load(dir.path()).unwrap();
        assert!(chart.values.is_empty());
        assert!(chart.merged_values().is_empty());
    }
}
