//! Image pattern classification
//!
//! [`classify_node`] inspects a single value-tree node and decides whether it
//! declares a container image, in which supported shape. It is a pure
//! function over the node; the traversal order and recursion policy live in
//! the generator.
//!
//! Precedence (first match wins):
//! 1. String shape: `[registry/]repository[:tag|@digest]` under an
//!    image-suggesting key.
//! 2. Full map shape: `registry` + `repository` + one of `tag`/`digest`.
//! 3. Partial map shape: `repository` + `tag`/`digest`, registry inherited
//!    from the nearest `global.imageRegistry`-style ancestor or Docker Hub.
//!
//! Maps that carry a `repository` key but don't form a complete reference
//! are reported as unsupported structures, never silently skipped.

use serde_json::Value as JsonValue;
use std::fmt;

use crate::image::{ImageReference, SourceShape};
use crate::values::{PathSegment, ValuePath};

/// A detected image declaration
#[derive(Debug, Clone)]
pub struct ImagePattern {
    pub path: ValuePath,
    pub shape: SourceShape,
    pub reference: ImageReference,
    /// Original node value, kept for shape-preserving re-emission
    pub raw: JsonValue,
}

/// A node that influences descendant image resolution without being an
/// image itself (e.g. `global.imageRegistry`). Recorded for visibility,
/// never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPattern {
    pub path: ValuePath,
}

/// Why an image-like node could not be classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Both `tag` and `digest` present
    TagAndDigest,
    /// `repository` present but neither `tag` nor `digest`
    MissingTagOrDigest,
    /// An image field holds a non-string (and non-numeric-tag) value
    NonStringField,
    /// A string under an image key that does not parse as a reference
    Unparseable,
    /// The value embeds an unresolved `{{ ... }}` template expression
    TemplatedValue,
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            UnsupportedReason::TagAndDigest => "both tag and digest are set",
            UnsupportedReason::MissingTagOrDigest => "repository without tag or digest",
            UnsupportedReason::NonStringField => "image field is not a string",
            UnsupportedReason::Unparseable => "string does not parse as an image reference",
            UnsupportedReason::TemplatedValue => "value contains an unresolved template expression",
        };
        f.write_str(msg)
    }
}

/// An image-like node the engine cannot relocate
#[derive(Debug, Clone)]
pub struct UnsupportedStructure {
    pub path: ValuePath,
    pub raw: JsonValue,
    pub reason: UnsupportedReason,
}

/// Outcome of classifying one node
#[derive(Debug, Clone)]
pub enum Classification {
    Image(ImagePattern),
    Unsupported(UnsupportedStructure),
}

/// Classify a single node. Returns `None` for nodes that are neither image
/// declarations nor image-like; the caller keeps traversing those.
pub fn classify_node(
    node: &JsonValue,
    path: &ValuePath,
    inherited_registry: Option<&str>,
) -> Option<Classification> {
    match node {
        JsonValue::String(s) => classify_string(s, path),
        JsonValue::Object(map) => classify_map(map, node, path, inherited_registry),
        _ => None,
    }
}

/// True for keys whose string values are image reference candidates
/// (`image`, `repoImage`, `initContainerImage`, ...). Registry knobs like
/// `imageRegistry` hold hostnames, not references, and are never candidates.
fn is_image_key(path: &ValuePath) -> bool {
    nearest_key(path).is_some_and(|k| {
        let k = k.to_ascii_lowercase();
        k.contains("image") && !k.ends_with("registry")
    })
}

/// Last map key on the path, skipping over trailing list indices so that
/// `initContainers[2]` still resolves to `initContainers`.
fn nearest_key(path: &ValuePath) -> Option<&str> {
    path.segments().iter().rev().find_map(|seg| match seg {
        PathSegment::Key(k) => Some(k.as_str()),
        PathSegment::Index(_) => None,
    })
}

fn classify_string(value: &str, path: &ValuePath) -> Option<Classification> {
    if !is_image_key(path) {
        return None;
    }

    if value.contains("{{") {
        return Some(Classification::Unsupported(UnsupportedStructure {
            path: path.clone(),
            raw: JsonValue::String(value.to_string()),
            reason: UnsupportedReason::TemplatedValue,
        }));
    }

    // Bare words like pull policies ("Always") or plain untagged names are
    // not relocation candidates.
    if !value.contains('/') && !value.contains(':') && !value.contains('@') {
        return None;
    }

    match ImageReference::parse(value) {
        Ok(reference) => Some(Classification::Image(ImagePattern {
            path: path.clone(),
            shape: SourceShape::String,
            reference,
            raw: JsonValue::String(value.to_string()),
        })),
        Err(_) => Some(Classification::Unsupported(UnsupportedStructure {
            path: path.clone(),
            raw: JsonValue::String(value.to_string()),
            reason: UnsupportedReason::Unparseable,
        })),
    }
}

fn classify_map(
    map: &serde_json::Map<String, JsonValue>,
    node: &JsonValue,
    path: &ValuePath,
    inherited_registry: Option<&str>,
) -> Option<Classification> {
    // Only maps declaring a repository are image candidates; anything else
    // is traversed through.
    let repository = map.get("repository")?;

    let unsupported = |reason| {
        Some(Classification::Unsupported(UnsupportedStructure {
            path: path.clone(),
            raw: node.clone(),
            reason,
        }))
    };

    let Some(repository) = repository.as_str() else {
        return unsupported(UnsupportedReason::NonStringField);
    };

    let registry = match map.get("registry") {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(_) => return unsupported(UnsupportedReason::NonStringField),
        None => None,
    };

    let tag = match map.get("tag") {
        Some(JsonValue::String(s)) => Some(s.clone()),
        // Charts routinely write tag: 1.25 without quotes
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Null) | None => None,
        Some(_) => return unsupported(UnsupportedReason::NonStringField),
    };

    let digest = match map.get("digest") {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Null) | None => None,
        Some(_) => return unsupported(UnsupportedReason::NonStringField),
    };

    if tag.is_some() && digest.is_some() {
        return unsupported(UnsupportedReason::TagAndDigest);
    }
    if tag.is_none() && digest.is_none() {
        return unsupported(UnsupportedReason::MissingTagOrDigest);
    }

    for field in [Some(repository), registry.as_deref(), tag.as_deref()].into_iter().flatten() {
        if field.contains("{{") {
            return unsupported(UnsupportedReason::TemplatedValue);
        }
    }

    let (shape, registry) = match registry {
        Some(r) => (SourceShape::MapRegistryRepoTag, Some(r)),
        None => (
            SourceShape::MapRepoTag,
            inherited_registry.map(str::to_string),
        ),
    };

    let mut reference = ImageReference {
        registry,
        repository: repository.to_string(),
        tag,
        digest,
        original: String::new(),
    };
    reference.original = reference.to_string();

    Some(Classification::Image(ImagePattern {
        path: path.clone(),
        shape,
        reference,
        raw: node.clone(),
    }))
}

/// True for keys under a `global` map that steer descendant image
/// resolution (`imageRegistry`, `registry`, ...).
pub fn is_global_registry_key(key: &str) -> bool {
    key.to_ascii_lowercase().ends_with("registry")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(key: &str) -> ValuePath {
        ValuePath::root().key(key)
    }

    fn expect_image(c: Option<Classification>) -> ImagePattern {
        match c {
            Some(Classification::Image(p)) => p,
            other => panic!("expected image pattern, got {other:?}"),
        }
    }

    fn expect_unsupported(c: Option<Classification>) -> UnsupportedStructure {
        match c {
            Some(Classification::Unsupported(u)) => u,
            other => panic!("expected unsupported structure, got {other:?}"),
        }
    }

    #[test]
    fn test_string_shape() {
        let node = json!("quay.io/prometheus/prometheus:v2.48.0");
        let p = expect_image(classify_node(&node, &at("image"), None));
        assert_eq!(p.shape, SourceShape::String);
        assert_eq!(p.reference.registry.as_deref(), Some("quay.io"));
        assert_eq!(p.reference.tag.as_deref(), Some("v2.48.0"));
    }

    #[test]
    fn test_string_requires_image_key() {
        let node = json!("quay.io/prometheus/prometheus:v2.48.0");
        assert!(classify_node(&node, &at("annotation"), None).is_none());
    }

    #[test]
    fn test_pull_policy_is_not_an_image() {
        assert!(classify_node(&json!("IfNotPresent"), &at("imagePullPolicy"), None).is_none());
        assert!(classify_node(&json!("nginx"), &at("image"), None).is_none());
    }

    #[test]
    fn test_string_under_list_index_uses_nearest_key() {
        let path = ValuePath::root().key("extraImages").index(1);
        let p = expect_image(classify_node(&json!("busybox:1.36"), &path, None));
        assert_eq!(p.reference.repository, "busybox");
    }

    #[test]
    fn test_templated_string_is_unsupported() {
        let node = json!("{{ .Values.registry }}/app:1.0");
        let u = expect_unsupported(classify_node(&node, &at("image"), None));
        assert_eq!(u.reason, UnsupportedReason::TemplatedValue);
    }

    #[test]
    fn test_unparseable_string_is_unsupported() {
        let node = json!("nginx@sha256:nothex");
        let u = expect_unsupported(classify_node(&node, &at("image"), None));
        assert_eq!(u.reason, UnsupportedReason::Unparseable);
    }

    #[test]
    fn test_full_map_shape() {
        let node = json!({"registry": "docker.io", "repository": "library/nginx", "tag": "1.14.2"});
        let p = expect_image(classify_node(&node, &at("image"), None));
        assert_eq!(p.shape, SourceShape::MapRegistryRepoTag);
        assert_eq!(p.reference.registry.as_deref(), Some("docker.io"));
        assert_eq!(p.reference.repository, "library/nginx");
        assert_eq!(p.reference.tag.as_deref(), Some("1.14.2"));
    }

    #[test]
    fn test_partial_map_inherits_registry() {
        let node = json!({"repository": "bitnami/redis", "tag": "7.2"});
        let p = expect_image(classify_node(&node, &at("image"), Some("ghcr.io")));
        assert_eq!(p.shape, SourceShape::MapRepoTag);
        assert_eq!(p.reference.registry.as_deref(), Some("ghcr.io"));

        let p = expect_image(classify_node(&node, &at("image"), None));
        assert_eq!(p.reference.registry, None);
        assert_eq!(p.reference.effective_registry(), "docker.io");
    }

    #[test]
    fn test_map_with_digest() {
        let digest = "sha256:e2f5c0f2a9365ed1d195dfeae912e24c5603a0909eb2f2d06275f0e8f0d8fa80";
        let node = json!({"registry": "quay.io", "repository": "argoproj/argocd", "digest": digest});
        let p = expect_image(classify_node(&node, &at("image"), None));
        assert_eq!(p.reference.digest.as_deref(), Some(digest));
        assert_eq!(p.reference.tag, None);
    }

    #[test]
    fn test_numeric_tag_is_coerced() {
        let node = json!({"repository": "library/nginx", "tag": 1.25});
        let p = expect_image(classify_node(&node, &at("image"), None));
        assert_eq!(p.reference.tag.as_deref(), Some("1.25"));
    }

    #[test]
    fn test_map_tag_and_digest_is_unsupported() {
        let node = json!({"repository": "app", "tag": "1.0", "digest": "sha256:ab"});
        let u = expect_unsupported(classify_node(&node, &at("image"), None));
        assert_eq!(u.reason, UnsupportedReason::TagAndDigest);
    }

    #[test]
    fn test_map_without_tag_or_digest_is_unsupported() {
        let node = json!({"registry": "docker.io", "repository": "library/nginx"});
        let u = expect_unsupported(classify_node(&node, &at("image"), None));
        assert_eq!(u.reason, UnsupportedReason::MissingTagOrDigest);
    }

    #[test]
    fn test_map_with_non_string_repository_is_unsupported() {
        let node = json!({"repository": ["library/nginx"], "tag": "1.0"});
        let u = expect_unsupported(classify_node(&node, &at("image"), None));
        assert_eq!(u.reason, UnsupportedReason::NonStringField);
    }

    #[test]
    fn test_plain_maps_are_not_patterns() {
        let node = json!({"enabled": true, "replicas": 3});
        assert!(classify_node(&node, &at("redis"), None).is_none());
        // tag-only partial overrides are traversed through, not flagged
        let node = json!({"tag": "1.2"});
        assert!(classify_node(&node, &at("image"), None).is_none());
    }

    #[test]
    fn test_registry_knob_is_not_an_image() {
        let node = json!("registry.local:5000");
        assert!(classify_node(&node, &at("imageRegistry"), None).is_none());
    }

    #[test]
    fn test_global_registry_keys() {
        assert!(is_global_registry_key("imageRegistry"));
        assert!(is_global_registry_key("registry"));
        assert!(!is_global_registry_key("repository"));
    }
}
