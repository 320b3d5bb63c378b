use serde::{Deserialize, Serialize};

use crate::error::{ObjectError, ObjectResult};

/// Configuration for an [`ObjectPool`](crate::ObjectPool).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Whether `parse_object` consults the replacement map.
    pub replace_refs: bool,
    /// Number of replacement hops examined before giving up.
    pub max_replace_depth: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            replace_refs: true,
            max_replace_depth: 5,
        }
    }
}

impl PoolConfig {
    /// Load a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> ObjectResult<Self> {
        toml::from_str(s).map_err(|e| ObjectError::Config(e.to_string()))
    }

    /// Configuration that never follows replacement digests.
    pub fn without_replacements() -> Self {
        Self {
            replace_refs: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = PoolConfig::default();
        assert!(c.replace_refs);
        assert_eq!(c.max_replace_depth, 5);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = PoolConfig::from_toml_str("replace_refs = false").unwrap();
        assert!(!c.replace_refs);
        assert_eq!(c.max_replace_depth, 5);
        assert_eq!(PoolConfig::from_toml_str("").unwrap(), PoolConfig::default());
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = PoolConfig::from_toml_str("max_replace_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, ObjectError::Config(_)));
    }
}
