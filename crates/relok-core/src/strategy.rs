//! Destination repository path strategies
//!
//! A strategy is a pure function from `(source registry, repository)` to the
//! repository path under the target registry. Strategies never see tags or
//! digests, so those can't be altered by construction.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::image::{self, DEFAULT_REGISTRY, LIBRARY_NAMESPACE};

/// Closed set of built-in path strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathStrategy {
    /// `harbor.local` + `docker.io/library/nginx` -> `dockerio/library/nginx`
    #[default]
    PrefixSourceRegistry,
    /// `quay.io/prometheus/node-exporter` -> `quayio-prometheus-node-exporter`
    Flat,
}

impl PathStrategy {
    pub const PREFIX_SOURCE_REGISTRY: &'static str = "prefix-source-registry";
    pub const FLAT: &'static str = "flat";

    pub fn name(&self) -> &'static str {
        match self {
            PathStrategy::PrefixSourceRegistry => Self::PREFIX_SOURCE_REGISTRY,
            PathStrategy::Flat => Self::FLAT,
        }
    }

    /// Compute the destination repository path for an image.
    ///
    /// `source_registry` is the effective (normalized) registry and
    /// `repository` the Library-normalized repository path.
    pub fn destination_repository(&self, source_registry: &str, repository: &str) -> String {
        let prefix = image::sanitize_registry_for_path(source_registry);
        match self {
            PathStrategy::PrefixSourceRegistry => {
                // Guard against a repository that still carries the registry
                let repository = repository
                    .strip_prefix(&format!("{source_registry}/"))
                    .unwrap_or(repository);
                format!("{prefix}/{repository}")
            }
            PathStrategy::Flat => {
                let flattened = if image::normalize_registry(source_registry) == DEFAULT_REGISTRY
                    && !repository.contains('/')
                {
                    format!("{LIBRARY_NAMESPACE}-{repository}")
                } else {
                    repository.replace('/', "-")
                };
                format!("{prefix}-{flattened}")
            }
        }
    }
}

impl FromStr for PathStrategy {
    type Err = CoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            Self::PREFIX_SOURCE_REGISTRY => Ok(PathStrategy::PrefixSourceRegistry),
            Self::FLAT => Ok(PathStrategy::Flat),
            _ => Err(CoreError::UnknownStrategy {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for PathStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
