//! Container image references: parsing, normalization, sanitization
//!
//! Registry comparison always goes through [`normalize_registry`] so that
//! `docker.io`, `index.docker.io`, `DOCKER.IO:443` and an absent registry
//! all mean the same thing, and Docker-official images (`alpine`) compare
//! equal to their canonical form (`docker.io/library/alpine`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::{CoreError, Result};

pub const DEFAULT_REGISTRY: &str = "docker.io";
pub const LIBRARY_NAMESPACE: &str = "library";

static PORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static DIGEST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:[.+_-][a-z0-9]+)*:[0-9a-fA-F]{32,}$").expect("valid regex"));

/// How an image reference was declared in the values tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceShape {
    /// A single string scalar, e.g. `image: "nginx:1.25"`
    String,
    /// A map carrying `registry`, `repository` and `tag`/`digest`
    MapRegistryRepoTag,
    /// A map carrying `repository` and `tag`/`digest` but no `registry`
    MapRepoTag,
}

/// Parsed components of a container image reference
///
/// Invariant: at most one of `tag`/`digest` is set. Whichever the original
/// declaration carried is preserved exactly for round-trip re-emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: Option<String>,
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
    /// The raw string this reference was parsed from
    pub original: String,
}

impl ImageReference {
    /// Registry after normalization and default-registry fallback
    pub fn effective_registry(&self) -> String {
        normalize_registry(self.registry.as_deref().unwrap_or(""))
    }

    /// Repository after Docker Library normalization
    ///
    /// `alpine` on Docker Hub becomes `library/alpine`; everything else is
    /// returned unchanged.
    pub fn effective_repository(&self) -> String {
        if self.effective_registry() == DEFAULT_REGISTRY && !self.repository.contains('/') {
            format!("{LIBRARY_NAMESPACE}/{}", self.repository)
        } else {
            self.repository.clone()
        }
    }

    /// Parse a raw image string into a structured reference.
    ///
    /// Accepted form: `[registry/]repository[:tag|@digest]`. The first
    /// `/`-segment is a registry when it contains a `.` or `:` or equals
    /// `localhost`, which distinguishes `docker.io/nginx` from
    /// `library/nginx`.
    pub fn parse(raw: &str) -> Result<Self> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(CoreError::InvalidReference {
                value: raw.to_string(),
                message: "empty image reference".to_string(),
            });
        }

        let (name, digest) = match input.split_once('@') {
            Some((name, digest)) => {
                if !DIGEST_RE.is_match(digest) {
                    return Err(CoreError::InvalidReference {
                        value: raw.to_string(),
                        message: format!("malformed digest '{digest}'"),
                    });
                }
                (name, Some(digest.to_string()))
            }
            None => (input, None),
        };

        // A ':' after the last '/' separates the tag; a ':' before it is a
        // registry port.
        let tag_split = match name.rfind('/') {
            Some(slash) => name[slash..].find(':').map(|i| slash + i),
            None => name.find(':'),
        };
        let (name, tag) = match tag_split {
            Some(colon) => {
                let tag = &name[colon + 1..];
                if tag.is_empty() || tag.contains('/') {
                    return Err(CoreError::InvalidReference {
                        value: raw.to_string(),
                        message: format!("malformed tag '{tag}'"),
                    });
                }
                (&name[..colon], Some(tag.to_string()))
            }
            None => (name, None),
        };

        if tag.is_some() && digest.is_some() {
            return Err(CoreError::InvalidReference {
                value: raw.to_string(),
                message: "reference carries both a tag and a digest".to_string(),
            });
        }

        let (registry, repository) = match name.split_once('/') {
            Some((first, rest)) if is_registry_segment(first) => {
                (Some(first.to_string()), rest.to_string())
            }
            _ => (None, name.to_string()),
        };

        if repository.is_empty() || repository.split('/').any(str::is_empty) {
            return Err(CoreError::InvalidReference {
                value: raw.to_string(),
                message: "empty repository".to_string(),
            });
        }

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
            original: raw.to_string(),
        })
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "{registry}/")?;
        }
        write!(f, "{}", self.repository)?;
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        } else if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        Ok(())
    }
}

/// The first path segment of an image string denotes a registry when it
/// contains a `.` or `:` or is `localhost`.
fn is_registry_segment(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

/// Standardize a registry name for comparison
///
/// Lowercases, folds `index.docker.io` (and empty) into `docker.io`, strips
/// any path component and a trailing numeric port.
pub fn normalize_registry(registry: &str) -> String {
    let trimmed = registry.trim().to_ascii_lowercase();
    if trimmed.is_empty() || trimmed == DEFAULT_REGISTRY || trimmed == "index.docker.io" {
        return DEFAULT_REGISTRY.to_string();
    }

    let mut hostname = match trimmed.split_once('/') {
        Some((host, _)) => host,
        None => trimmed.as_str(),
    };

    if let Some(colon) = hostname.rfind(':') {
        if PORT_RE.is_match(&hostname[colon + 1..]) {
            hostname = &hostname[..colon];
        }
    }

    hostname.to_string()
}

/// Make a registry name safe for use as a repository path component
///
/// Strips the port, removes `.` and `:`, lowercases:
/// `docker.io` -> `dockerio`, `quay.io:443` -> `quayio`.
pub fn sanitize_registry_for_path(registry: &str) -> String {
    let mut name = registry.trim().to_ascii_lowercase();
    if name.is_empty() || name == "index.docker.io" {
        name = DEFAULT_REGISTRY.to_string();
    }

    if let Some(colon) = name.rfind(':') {
        if PORT_RE.is_match(&name[colon + 1..]) {
            name.truncate(colon);
        }
    }

    name.replace(['.', ':'], "")
}
