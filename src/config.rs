use serde::Deserialize;

use crate::error::{DataError, Result};

/// Factory-wide settings.
///
/// ```ron
/// (
///     auto_search: true,
///     max_nesting_depth: 8,
/// )
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FactoryConfig {
    /// Allows lookups to fall back to every registered data set.
    pub auto_search: bool,
    /// How deep nested armature displays may recurse before resolution gives up.
    pub max_nesting_depth: usize,
    /// Scale applied when a parse call passes a non-positive scale.
    pub default_scale: f32,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            auto_search: false,
            max_nesting_depth: 16,
            default_scale: 1.0,
        }
    }
}

impl FactoryConfig {
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::de::from_str(source).map_err(|e| DataError::Config(e.to_string()))
    }

    pub fn from_ron_bytes(source: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(source).map_err(|e| DataError::Config(e.to_string()))?;
        Self::from_ron_str(text)
    }

    pub(crate) fn effective_scale(&self, scale: f32) -> f32 {
        if scale > 0.0 { scale } else { self.default_scale }
    }
}
