use serde::{Deserialize, Serialize};

use crate::error::{PackError, PackResult};

/// Widths of the inline size fields of a [`PackEntry`](crate::PackEntry).
///
/// A size is kept inline when it is below `1 << bits`; larger values are
/// recomputed from the store (object size) or kept in a side array (delta
/// size).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    pub size_bits: u32,
    pub delta_size_bits: u32,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            size_bits: 31,
            delta_size_bits: 20,
        }
    }
}

impl PackingConfig {
    pub fn from_toml_str(s: &str) -> PackResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| PackError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PackResult<()> {
        for (name, bits) in [
            ("size_bits", self.size_bits),
            ("delta_size_bits", self.delta_size_bits),
        ] {
            if !(1..=32).contains(&bits) {
                return Err(PackError::InvalidConfig(format!(
                    "{name} must be between 1 and 32, got {bits}"
                )));
            }
        }
        Ok(())
    }

    /// Smallest object size that is not stored inline.
    pub fn size_limit(&self) -> u64 {
        1u64 << self.size_bits
    }

    /// Smallest delta size that spills to the side array.
    pub fn delta_size_limit(&self) -> u64 {
        1u64 << self.delta_size_bits
    }
}
