//! Registry configuration.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default limit on nested factory invocations.
///
/// Every nesting level costs several stack frames, so the limit has to trip
/// well before a 2 MiB thread stack runs out.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables applied when a [`Registry`](crate::Registry) is built.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Registry, RegistryConfig};
///
/// let config = RegistryConfig::default()
///     .with_max_depth(64)
///     .with_cycle_detection(false);
/// let registry = Registry::with_config(config.clone());
/// assert_eq!(registry.config(), &config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RegistryConfig {
    /// Maximum number of factories allowed to run nested inside each other
    pub max_depth: usize,
    /// Report re-entry of an entry under construction as `DiError::Circular`
    pub detect_cycles: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_cycles: true,
        }
    }
}

impl RegistryConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Parses a configuration document. Missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
