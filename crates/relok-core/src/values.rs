//! Chart value trees and path addressing
//!
//! The engine works on an already-merged value tree represented as
//! `serde_json::Value` (parsed from YAML). Every reference into the tree is
//! a [`ValuePath`], never a live pointer, so detection and override emission
//! can be joined without borrowing into the tree.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// Values container with deep merge capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Load values from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    /// Serialize values as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Objects: recursive merge
    /// - Arrays: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Get a value by dotted path (e.g., "global.imageRegistry")
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let mut current = &self.0;
        for part in path.split('.') {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Set a value at a [`ValuePath`], creating intermediate maps and
    /// null-padded lists as needed.
    pub fn set_at(&mut self, path: &ValuePath, value: JsonValue) {
        set_at_segments(&mut self.0, path.segments(), value);
    }

    /// Look up the value at a [`ValuePath`], if present.
    pub fn get_at(&self, path: &ValuePath) -> Option<&JsonValue> {
        let mut current = &self.0;
        for seg in path.segments() {
            current = match seg {
                PathSegment::Key(k) => current.as_object()?.get(k)?,
                PathSegment::Index(i) => current.as_array()?.get(*i)?,
            };
        }
        Some(current)
    }

    /// Nest these values under a single top-level key
    ///
    /// Used when folding a subchart's values into the parent tree under its
    /// dependency alias. A `global` key stays at the root so global
    /// configuration keeps its chart-wide scope.
    pub fn nest_under(&self, key: &str) -> Values {
        let mut parent = serde_json::Map::new();
        let mut nested = serde_json::Map::new();

        if let JsonValue::Object(obj) = &self.0 {
            for (k, v) in obj {
                if k == "global" {
                    parent.insert(k.clone(), v.clone());
                } else {
                    nested.insert(k.clone(), v.clone());
                }
            }
        }

        if !nested.is_empty() {
            parent.insert(key.to_string(), JsonValue::Object(nested));
        }

        Values(JsonValue::Object(parent))
    }

    /// Get the inner JSON value
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }
}

/// Deep merge two JSON values
fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

fn set_at_segments(value: &mut JsonValue, segments: &[PathSegment], new_value: JsonValue) {
    let Some((head, rest)) = segments.split_first() else {
        *value = new_value;
        return;
    };

    match head {
        PathSegment::Key(k) => {
            if !value.is_object() {
                *value = JsonValue::Object(serde_json::Map::new());
            }
            let map = value.as_object_mut().expect("object ensured above");
            let entry = map.entry(k.clone()).or_insert(JsonValue::Null);
            set_at_segments(entry, rest, new_value);
        }
        PathSegment::Index(i) => {
            if !value.is_array() {
                *value = JsonValue::Array(Vec::new());
            }
            let arr = value.as_array_mut().expect("array ensured above");
            while arr.len() <= *i {
                arr.push(JsonValue::Null);
            }
            set_at_segments(&mut arr[*i], rest, new_value);
        }
    }
}

/// One step of a [`ValuePath`]: a map key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a node in the value tree
///
/// Rendered in dot/bracket notation (`sidecars[0].image`). Paths are the
/// join key between pattern detection and override emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValuePath(Vec<PathSegment>);

impl ValuePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Extend with a map key
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    /// Extend with a list index
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Last map key on the path, if any
    pub fn last_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(k)) => Some(k),
            _ => None,
        }
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Key(k) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{k}")?;
                }
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge() {
        let mut base = Values::from_yaml(
            r#"
image:
  repository: nginx
  tag: "1.0"
replicas: 1
"#,
        )
        .unwrap();

        let overlay = Values::from_yaml(
            r#"
image:
  tag: "2.0"
  pullPolicy: Always
replicas: 3
"#,
        )
        .unwrap();

        base.merge(&overlay);

        assert_eq!(base.get("image.repository").unwrap(), "nginx");
        assert_eq!(base.get("image.tag").unwrap(), "2.0");
        assert_eq!(base.get("image.pullPolicy").unwrap(), "Always");
        assert_eq!(base.get("replicas").unwrap(), 3);
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let mut base = Values::from_yaml("sidecars: [a, b, c]").unwrap();
        let overlay = Values::from_yaml("sidecars: [d]").unwrap();
        base.merge(&overlay);
        assert_eq!(base.get("sidecars").unwrap(), &serde_json::json!(["d"]));
    }

    #[test]
    fn test_nest_under_preserves_global() {
        let sub = Values::from_yaml(
            r#"
global:
  imageRegistry: docker.io
enabled: true
replicas: 3
"#,
        )
        .unwrap();

        let nested = sub.nest_under("redis");

        assert_eq!(nested.get("global.imageRegistry").unwrap(), "docker.io");
        assert_eq!(nested.get("redis.enabled").unwrap(), true);
        assert_eq!(nested.get("redis.replicas").unwrap(), 3);
        assert!(nested.get("enabled").is_none());
    }

    #[test]
    fn test_path_display() {
        let path = ValuePath::root().key("sidecars").index(0).key("image");
        assert_eq!(path.to_string(), "sidecars[0].image");
        assert_eq!(path.last_key(), Some("image"));
        assert_eq!(ValuePath::root().key("image").to_string(), "image");
    }

    #[test]
    fn test_set_at_creates_lists() {
        let mut values = Values::new();
        let path = ValuePath::root().key("sidecars").index(1).key("image");
        values.set_at(&path, serde_json::json!("busybox:1.36"));

        assert_eq!(
            values.inner(),
            &serde_json::json!({"sidecars": [null, {"image": "busybox:1.36"}]})
        );
        assert_eq!(values.get_at(&path).unwrap(), "busybox:1.36");
    }

    #[test]
    fn test_empty_yaml_is_empty_values() {
        let values = Values::from_yaml("").unwrap();
        assert!(values.is_empty());
    }
}
