//! Layer subsystem configuration.
//!
//! [`LayerConfig`] collects the few knobs that change how layers behave at
//! runtime: ref-tracing, default rowstride alignment, whether new layers get
//! a timing ledger, and how strictly illegal transitions are treated.
//!
//! A config can come from YAML, from a file, or from the environment:
//!
//! ```rust
//! use vfx_layer::LayerConfig;
//!
//! let cfg = LayerConfig::from_yaml_str("debug_refs: true\nrowstride_alignment: 16\n").unwrap();
//! assert!(cfg.debug_refs);
//! assert_eq!(cfg.rowstride_alignment, 16);
//! assert!(!cfg.timing_by_default);
//! ```
//!
//! # Environment
//!
//! | variable | field |
//! |---|---|
//! | `VFX_LAYER_DEBUG_REFS` | `debug_refs` |
//! | `VFX_LAYER_ROWSTRIDE_ALIGN` | `rowstride_alignment` |
//! | `VFX_LAYER_TIMING` | `timing_by_default` |
//! | `VFX_LAYER_STRICT` | `strict_transitions` |
//!
//! # Process-wide default
//!
//! Layers built through the plain factories capture
//! [`LayerConfig::current`] at construction. [`LayerConfig::install`] sets it
//! once per process; until then the built-in defaults apply.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LayerError, LayerResult};

static INSTALLED: OnceLock<LayerConfig> = OnceLock::new();

/// Runtime settings for layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Log every `ref_inc`/`ref_dec` with its call site.
    pub debug_refs: bool,
    /// Byte alignment of default rowstrides. Must be a power of two.
    pub rowstride_alignment: usize,
    /// Attach an empty timing ledger to every new layer.
    pub timing_by_default: bool,
    /// Also `debug_assert!` on illegal status transitions.
    pub strict_transitions: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            debug_refs: false,
            rowstride_alignment: 1,
            timing_by_default: false,
            strict_transitions: false,
        }
    }
}

impl LayerConfig {
    /// Parses a config from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> LayerResult<Self> {
        let cfg: LayerConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> LayerResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Defaults overridden by `VFX_LAYER_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `VFX_LAYER_*` environment overrides on top of `self`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("VFX_LAYER_DEBUG_REFS") {
            apply_bool(&mut self.debug_refs, "VFX_LAYER_DEBUG_REFS", &v);
        }
        if let Some(v) = lookup("VFX_LAYER_TIMING") {
            apply_bool(&mut self.timing_by_default, "VFX_LAYER_TIMING", &v);
        }
        if let Some(v) = lookup("VFX_LAYER_STRICT") {
            apply_bool(&mut self.strict_transitions, "VFX_LAYER_STRICT", &v);
        }
        if let Some(v) = lookup("VFX_LAYER_ROWSTRIDE_ALIGN") {
            match v.trim().parse::<usize>() {
                Ok(a) if a.is_power_of_two() => self.rowstride_alignment = a,
                _ => warn!(value = %v, "ignoring VFX_LAYER_ROWSTRIDE_ALIGN"),
            }
        }
        self
    }

    /// Checks field constraints.
    pub fn validate(&self) -> LayerResult<()> {
        if !self.rowstride_alignment.is_power_of_two() {
            return Err(LayerError::config(format!(
                "rowstride_alignment must be a power of two, got {}",
                self.rowstride_alignment
            )));
        }
        Ok(())
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> LayerResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Installs `self` as the process-wide default.
    ///
    /// Fails if a config was already installed.
    pub fn install(self) -> LayerResult<()> {
        self.validate()?;
        debug!(config = ?self, "installing layer config");
        INSTALLED
            .set(self)
            .map_err(|_| LayerError::ConfigAlreadyInstalled)
    }

    /// The installed config, or the defaults.
    pub fn current() -> LayerConfig {
        INSTALLED.get().cloned().unwrap_or_default()
    }
}

fn apply_bool(field: &mut bool, key: &str, value: &str) {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => *field = true,
        "0" | "false" | "no" | "off" => *field = false,
        _ => warn!(key, value, "ignoring unparseable boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = LayerConfig::default();
        assert!(!cfg.debug_refs);
        assert_eq!(cfg.rowstride_alignment, 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial() {
        let cfg = LayerConfig::from_yaml_str("timing_by_default: true").unwrap();
        assert!(cfg.timing_by_default);
        assert_eq!(cfg.rowstride_alignment, 1);
    }

    #[test]
    fn test_yaml_rejects_bad_alignment() {
        let err = LayerConfig::from_yaml_str("rowstride_alignment: 12").unwrap_err();
        assert!(matches!(err, LayerError::Config(_)));
    }

    #[test]
    fn test_yaml_round_trip() {
        let cfg = LayerConfig {
            debug_refs: true,
            rowstride_alignment: 32,
            timing_by_default: true,
            strict_transitions: false,
        };
        let yaml = cfg.to_yaml_string().unwrap();
        assert_eq!(LayerConfig::from_yaml_str(&yaml).unwrap(), cfg);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debug_refs: true").unwrap();
        writeln!(file, "strict_transitions: true").unwrap();
        let cfg = LayerConfig::from_file(file.path()).unwrap();
        assert!(cfg.debug_refs);
        assert!(cfg.strict_transitions);
    }

    #[test]
    fn test_missing_file() {
        let err = LayerConfig::from_file("/nonexistent/layer.yaml").unwrap_err();
        assert!(matches!(err, LayerError::Io(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("VFX_LAYER_DEBUG_REFS", "yes"),
            ("VFX_LAYER_ROWSTRIDE_ALIGN", "64"),
            ("VFX_LAYER_TIMING", "maybe"),
        ]
        .into_iter()
        .collect();
        let cfg = LayerConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert!(cfg.debug_refs);
        assert_eq!(cfg.rowstride_alignment, 64);
        assert!(!cfg.timing_by_default);
    }

    #[test]
    fn test_override_bad_alignment_ignored() {
        let cfg = LayerConfig::default()
            .with_overrides(|k| (k == "VFX_LAYER_ROWSTRIDE_ALIGN").then(|| "24".to_string()));
        assert_eq!(cfg.rowstride_alignment, 1);
    }
}
