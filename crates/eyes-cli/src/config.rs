//! Configuration Vault – reads/writes `~/.eyes/config.toml`.
//!
//! The file has two optional sections, each merged over the built-in
//! defaults field by field:
//!
//! ```toml
//! [settings]
//! focal_length_px = 620.0
//!
//! [tables]
//! currency_symbol = "$"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use eyes_safety::priority::PROXIMITY_CEILING;
use eyes_types::{ClassificationTables, PerceptionSettings};

/// Persisted configuration stored in `~/.eyes/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calibration constants and thresholds.
    pub settings: PerceptionSettings,
    /// Criticality tiers, heights, currency and scene rules.
    pub tables: ClassificationTables,
}

/// Return the path to `~/.eyes/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".eyes").join("config.toml")
}

/// Load the effective configuration.
///
/// A missing file is not an error: the built-in defaults are used. Env
/// overrides apply in both cases.
pub fn load_effective(path: &Path) -> Result<Config, String> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does not
/// exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    validate(&cfg)?;
    Ok(Some(cfg))
}

/// Reject settings the perception core cannot run with.
fn validate(cfg: &Config) -> Result<(), String> {
    let s = &cfg.settings;
    if s.max_priority_items == 0 {
        return Err("settings.max_priority_items must be at least 1".to_string());
    }
    if s.reference_height_px <= 0.0 || s.focal_length_px <= 0.0 {
        return Err("settings.focal_length_px and reference_height_px must be positive".to_string());
    }
    // Critical bonus must stay dominant.
    if !(0.0..=PROXIMITY_CEILING).contains(&s.unknown_distance_bonus) {
        return Err(format!(
            "settings.unknown_distance_bonus must be within [0, {PROXIMITY_CEILING}]"
        ));
    }
    if !(s.distance_very_close <= s.distance_close && s.distance_close <= s.distance_medium) {
        return Err(
            "settings distances must satisfy very_close <= close <= medium".to_string(),
        );
    }
    Ok(())
}

/// Apply `EYES_*` environment variable overrides to `cfg`.
///
/// Values that fail to parse are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `EYES_FOCAL_LENGTH_PX` | `settings.focal_length_px` |
/// | `EYES_LOW_LIGHT_THRESHOLD` | `settings.low_light_threshold` |
/// | `EYES_DISTANCE_VERY_CLOSE` | `settings.distance_very_close` |
/// | `EYES_DISTANCE_CLOSE` | `settings.distance_close` |
/// | `EYES_DISTANCE_MEDIUM` | `settings.distance_medium` |
/// | `EYES_MAX_PRIORITY_ITEMS` | `settings.max_priority_items` |
pub fn apply_env_overrides(cfg: &mut Config) {
    let s = &mut cfg.settings;
    override_from_env("EYES_FOCAL_LENGTH_PX", &mut s.focal_length_px);
    override_from_env("EYES_LOW_LIGHT_THRESHOLD", &mut s.low_light_threshold);
    override_from_env("EYES_DISTANCE_VERY_CLOSE", &mut s.distance_very_close);
    override_from_env("EYES_DISTANCE_CLOSE", &mut s.distance_close);
    override_from_env("EYES_DISTANCE_MEDIUM", &mut s.distance_medium);
    if let Ok(v) = std::env::var("EYES_MAX_PRIORITY_ITEMS")
        && let Ok(n) = v.parse::<usize>()
        && n > 0
    {
        s.max_priority_items = n;
    }
}

fn override_from_env(var: &str, field: &mut f32) {
    if let Ok(v) = std::env::var(var)
        && let Ok(parsed) = v.parse::<f32>()
        && parsed.is_finite()
    {
        *field = parsed;
    }
}

/// Save the config to a specific path, creating the parent directory.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = to_toml(cfg)?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

/// Pretty TOML rendering, as written by [`save_to`].
pub fn to_toml(cfg: &Config) -> Result<String, String> {
    toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))
}
