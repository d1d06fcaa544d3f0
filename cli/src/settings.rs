//! Settings resolution for the CLI.
//!
//! `source` and `target` come from, in order of precedence: command-line
//! flags, the file named by `--config`, and a `.env` file in the working
//! directory. Keys are `SOURCE_DIR` and `TARGET_DIR`, matched
//! case-insensitively.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, File as ConfigFile};

pub const SOURCE_KEY: &str = "SOURCE_DIR";
pub const TARGET_KEY: &str = "TARGET_DIR";

/// Flat key/value settings with upper-cased keys.
pub type Settings = HashMap<String, String>;

/// Load an explicitly requested config file.
///
/// `.json`, `.toml`, `.yaml` and `.yml` files are read with the `config`
/// crate; anything else is treated as a `KEY=value` env file. Nested values
/// are ignored.
pub fn load_config_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("json") | Some("toml") | Some("yaml") | Some("yml") => {
            let config = Config::builder()
                .add_source(ConfigFile::from(path))
                .build()
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let raw: HashMap<String, config::Value> = config
                .try_deserialize()
                .with_context(|| format!("Config file {} is not a flat table", path.display()))?;
            Ok(raw
                .into_iter()
                .filter_map(|(key, value)| value.into_string().ok().map(|v| (key.to_uppercase(), v)))
                .collect())
        }
        _ => load_env_file(path),
    }
}

/// Load a `KEY=value` env file. A missing file yields no settings.
pub fn load_env_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::new());
    }

    let mut settings = Settings::new();
    let entries = dotenv::from_path_iter(path)
        .with_context(|| format!("Failed to open env file {}", path.display()))?;
    for entry in entries {
        let (key, value) =
            entry.with_context(|| format!("Malformed line in env file {}", path.display()))?;
        settings.insert(key.trim().to_uppercase(), value.trim().to_string());
    }
    Ok(settings)
}

/// First non-empty value among the flag, the config file and the env file.
pub fn resolve_setting(
    flag: Option<&Path>,
    config: &Settings,
    env_file: &Settings,
    key: &str,
) -> Option<PathBuf> {
    if let Some(flag) = flag.filter(|p| !p.as_os_str().is_empty()) {
        return Some(flag.to_path_buf());
    }
    config
        .get(key)
        .or_else(|| env_file.get(key))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Split a `--extensions` value on commas. Normalization happens in
/// `BackupOptions::with_extensions`.
pub fn parse_extensions(value: Option<&str>) -> Option<Vec<String>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.split(',').map(|p| p.trim().to_string()).collect())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
