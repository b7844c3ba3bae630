//! CLI command implementations

pub mod blank;
pub mod palettes;
pub mod simulate;

use anyhow::{Context, Result};
use std::path::Path;
use vfx_layer::LayerConfig;

/// Loads the layer config from `path` (or defaults), applies environment
/// overrides and installs it for every layer the command creates.
pub fn load_config(path: Option<&Path>) -> Result<LayerConfig> {
    let base = match path {
        Some(path) => LayerConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => LayerConfig::default(),
    };
    let config = base.with_env_overrides();
    config.clone().install().context("Failed to install layer config")?;
    Ok(config)
}

/// Prints `config` as YAML.
pub fn print_config(config: &LayerConfig) -> Result<()> {
    print!("{}", config.to_yaml_string()?);
    Ok(())
}

/// Formats a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
