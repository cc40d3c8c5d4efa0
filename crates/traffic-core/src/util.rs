//! Environment file loading and result export

use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Write `value` to `path` as pretty-printed JSON
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Load environment variables from the simulator env file if not already set.
/// Searches standard locations in order:
/// 1. ./traffic.env
/// 2. User's config directory/traffic-sim/traffic.env
/// 3. ~/.config/traffic-sim/traffic.env
pub fn load_env_file() {
    let env_paths = [
        "traffic.env".to_string(),
        dirs::config_dir()
            .map(|p| p.join("traffic-sim/traffic.env").to_string_lossy().to_string())
            .unwrap_or_default(),
        dirs::home_dir()
            .map(|p| p.join(".config/traffic-sim/traffic.env").to_string_lossy().to_string())
            .unwrap_or_default(),
    ];

    for path in &env_paths {
        if path.is_empty() {
            continue;
        }
        if Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => {
                    tracing::debug!("Loading environment from {}", path);
                    parse_env_file(&contents);
                }
                Err(e) => tracing::warn!("Failed to read env file {}: {}", path, e),
            }
            break;
        }
    }
}

/// Parse env file contents and set environment variables (only if not already set).
/// Supports formats:
/// - `KEY=value`
/// - `export KEY=value`
/// - `KEY="quoted value"`
/// - `KEY='single quoted'`
/// - Comments starting with #
pub fn parse_env_file(contents: &str) {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}
