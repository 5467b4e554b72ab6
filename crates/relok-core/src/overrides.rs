//! Minimal override tree construction
//!
//! The builder accumulates per-path rewrite decisions and finalizes them
//! into the smallest values overlay that redirects the detected images:
//! only the decided keys are ever written, never unrelated siblings, and
//! tags/digests are never part of a decision.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::values::{ValuePath, Values};

/// Accumulates rewrite decisions keyed by value path
#[derive(Debug, Default)]
pub struct OverrideBuilder {
    // BTreeMap keeps emission order deterministic across runs
    writes: BTreeMap<ValuePath, JsonValue>,
}

impl OverrideBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a whole-string replacement (String shape).
    pub fn add_string(&mut self, path: &ValuePath, value: String) -> Result<()> {
        self.record(path, JsonValue::String(value))
    }

    /// Record a map rewrite (full/partial map shapes). Only `registry` and
    /// `repository` are written; `tag`/`digest` stay untouched in the chart.
    pub fn add_map(&mut self, path: &ValuePath, registry: &str, repository: &str) -> Result<()> {
        self.record(
            path,
            serde_json::json!({
                "registry": registry,
                "repository": repository,
            }),
        )
    }

    fn record(&mut self, path: &ValuePath, value: JsonValue) -> Result<()> {
        match self.writes.get(path) {
            // Identical duplicate writes are no-ops
            Some(existing) if *existing == value => Ok(()),
            Some(existing) => Err(CoreError::BuilderConflict {
                path: path.clone(),
                message: format!("existing value {existing} disagrees with new value {value}"),
            }),
            None => {
                self.writes.insert(path.clone(), value);
                Ok(())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Materialize the recorded decisions into an override document,
    /// pruning any branch left empty.
    pub fn finalize(self) -> OverrideDocument {
        let mut values = Values::new();
        for (path, value) in &self.writes {
            values.set_at(path, value.clone());
        }
        prune_empty(&mut values.0);
        OverrideDocument { values }
    }
}

/// Drop empty maps bottom-up. List entries are kept (including null
/// padding) so index addressing stays valid.
fn prune_empty(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => {
            for v in map.values_mut() {
                prune_empty(v);
            }
            map.retain(|_, v| !matches!(v, JsonValue::Object(m) if m.is_empty()));
        }
        JsonValue::Array(items) => {
            for v in items.iter_mut() {
                prune_empty(v);
            }
        }
        _ => {}
    }
}

/// Finalized minimal values overlay, ready for YAML serialization
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideDocument {
    values: Values,
}

impl OverrideDocument {
    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String> {
        self.values.to_yaml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(spec: &[&str]) -> ValuePath {
        spec.iter().fold(ValuePath::root(), |p, k| p.key(k))
    }

    #[test]
    fn test_minimal_map_override() {
        let mut builder = OverrideBuilder::new();
        builder
            .add_map(&path(&["image"]), "harbor.local", "dockerio/library/nginx")
            .unwrap();
        let doc = builder.finalize();

        assert_eq!(
            doc.values().inner(),
            &json!({"image": {"registry": "harbor.local", "repository": "dockerio/library/nginx"}})
        );
    }

    #[test]
    fn test_string_override_in_list() {
        let mut builder = OverrideBuilder::new();
        let p = ValuePath::root().key("sidecars").index(1).key("image");
        builder
            .add_string(&p, "harbor.local/dockerio/library/busybox:1.36".to_string())
            .unwrap();
        let doc = builder.finalize();

        assert_eq!(
            doc.values().inner(),
            &json!({"sidecars": [null, {"image": "harbor.local/dockerio/library/busybox:1.36"}]})
        );
    }

    #[test]
    fn test_duplicate_identical_write_is_noop() {
        let mut builder = OverrideBuilder::new();
        let p = path(&["image"]);
        builder.add_map(&p, "harbor.local", "dockerio/app").unwrap();
        builder.add_map(&p, "harbor.local", "dockerio/app").unwrap();
        let doc = builder.finalize();
        assert_eq!(
            doc.values().inner(),
            &json!({"image": {"registry": "harbor.local", "repository": "dockerio/app"}})
        );
    }

    #[test]
    fn test_conflicting_write_is_fatal() {
        let mut builder = OverrideBuilder::new();
        let p = path(&["image"]);
        builder.add_map(&p, "harbor.local", "dockerio/app").unwrap();
        let err = builder.add_map(&p, "harbor.local", "quayio/app").unwrap_err();
        assert!(matches!(err, CoreError::BuilderConflict { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_empty_builder_finalizes_empty() {
        let doc = OverrideBuilder::new().finalize();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_yaml_emission_is_deterministic() {
        let build = || {
            let mut b = OverrideBuilder::new();
            b.add_map(&path(&["redis", "image"]), "harbor.local", "dockerio/bitnami/redis")
                .unwrap();
            b.add_string(&path(&["app", "image"]), "harbor.local/dockerio/app:1.0".to_string())
                .unwrap();
            b.finalize().to_yaml().unwrap()
        };
        assert_eq!(build(), build());
    }
}
