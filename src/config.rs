//! Configuration loading for Sprig.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.sprig/config.toml`)
//! 3. User config (`~/.sprig/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SprigError};

/// Owner id used when neither config nor `$USER` provides one.
pub const DEFAULT_OWNER: &str = "local";

/// Main configuration struct for Sprig.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Care defaults and read-path behavior.
    pub care: CareConfig,
    /// Identity of the local user.
    pub owner: OwnerConfig,
    /// Where plant records live.
    pub storage: StorageConfig,
}

/// Care defaults applied at plant creation, and read-path behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CareConfig {
    /// Watering cadence for plants created without one.
    pub default_frequency_days: u32,
    /// Sunlight hint for plants created without one.
    pub default_sunlight: Option<String>,
    /// Persist recomputed snapshots when plants are read.
    ///
    /// Off by default: reads are side-effect free and `sweep` is the explicit
    /// persist path.
    pub persist_on_read: bool,
}

/// Minimum valid watering frequency in days.
pub const MIN_FREQUENCY_DAYS: u32 = 1;

/// Maximum valid watering frequency in days (ten years).
pub const MAX_FREQUENCY_DAYS: u32 = 3650;

impl CareConfig {
    /// Check if a watering frequency is valid (between 1 and 3650 days).
    pub fn is_valid_frequency(value: u32) -> bool {
        (MIN_FREQUENCY_DAYS..=MAX_FREQUENCY_DAYS).contains(&value)
    }
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            default_frequency_days: 3,
            default_sunlight: Some("Indirect Sunlight".to_string()),
            persist_on_read: false,
        }
    }
}

/// Local user identity.
///
/// Sprig trusts this id unconditionally; it stands in for an
/// authenticated owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OwnerConfig {
    /// Explicit owner id. Falls back to `$USER`, then `"local"`.
    pub id: Option<String>,
}

/// Plant storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding plant records. Defaults to `<sprig_home>/plants`.
    pub plants_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.sprig/config.toml` in cwd or an ancestor)
    /// 3. User config (`~/.sprig/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.sprig/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = sprig_home()?;
        let config_path = home.join("config.toml");
        Self::load_optional(&config_path)
    }

    /// Load project config from `.sprig/config.toml` under the project root.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = project_sprig_dir(cwd).join("config.toml");
        Self::load_optional(&config_path)
    }

    /// Load a config file that may not exist.
    ///
    /// A missing file is silent; an unreadable or malformed one is warned
    /// about and skipped.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| SprigError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| SprigError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // SPRIG_DEFAULT_FREQUENCY_DAYS
        if let Ok(val) = env::var("SPRIG_DEFAULT_FREQUENCY_DAYS") {
            match val.parse::<u32>() {
                Ok(n) => {
                    if CareConfig::is_valid_frequency(n) {
                        self.care.default_frequency_days = n;
                    } else {
                        eprintln!(
                            "Warning: Invalid SPRIG_DEFAULT_FREQUENCY_DAYS value '{}'. \
                            Must be between {} and {}. Using default '{}'.",
                            n,
                            MIN_FREQUENCY_DAYS,
                            MAX_FREQUENCY_DAYS,
                            self.care.default_frequency_days
                        );
                    }
                }
                Err(_) => eprintln!(
                    "Warning: Invalid SPRIG_DEFAULT_FREQUENCY_DAYS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.care.default_frequency_days
                ),
            }
        }

        // SPRIG_DEFAULT_SUNLIGHT
        if let Ok(val) = env::var("SPRIG_DEFAULT_SUNLIGHT") {
            self.care.default_sunlight = if val.trim().is_empty() {
                None
            } else {
                Some(val)
            };
        }

        // SPRIG_PERSIST_ON_READ
        if let Ok(val) = env::var("SPRIG_PERSIST_ON_READ") {
            self.care.persist_on_read = val == "true" || val == "1";
        }

        // SPRIG_OWNER
        if let Ok(val) = env::var("SPRIG_OWNER") {
            if val.trim().is_empty() {
                eprintln!("Warning: SPRIG_OWNER is empty. Ignoring.");
            } else {
                self.owner.id = Some(val);
            }
        }

        // SPRIG_PLANTS_DIR
        if let Ok(val) = env::var("SPRIG_PLANTS_DIR") {
            if !val.is_empty() {
                self.storage.plants_dir = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence for every field it sets to a
    /// non-default value. As with any default-comparing merge, a layer cannot
    /// explicitly reset a value back to its default.
    fn merge(mut self, other: Config) -> Self {
        let default_care = CareConfig::default();
        if other.care.default_frequency_days != default_care.default_frequency_days {
            if CareConfig::is_valid_frequency(other.care.default_frequency_days) {
                self.care.default_frequency_days = other.care.default_frequency_days;
            } else {
                tracing::warn!(
                    value = other.care.default_frequency_days,
                    "ignoring invalid care.default_frequency_days"
                );
            }
        }
        if other.care.default_sunlight != default_care.default_sunlight {
            self.care.default_sunlight = other.care.default_sunlight;
        }
        if other.care.persist_on_read != default_care.persist_on_read {
            self.care.persist_on_read = other.care.persist_on_read;
        }

        if other.owner.id.is_some() {
            self.owner.id = other.owner.id;
        }

        if other.storage.plants_dir.is_some() {
            self.storage.plants_dir = other.storage.plants_dir;
        }

        self
    }

    /// The owner id every CLI operation runs as.
    pub fn owner_id(&self) -> String {
        if let Some(id) = self.owner.id.as_deref().filter(|id| !id.trim().is_empty()) {
            return id.to_string();
        }
        env::var("USER")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string())
    }

    /// The directory plant records are stored in.
    pub fn plants_dir(&self) -> Option<PathBuf> {
        self.storage.plants_dir.clone().or_else(plants_dir)
    }
}

/// Get the Sprig home directory.
///
/// Checks `SPRIG_HOME` environment variable first, then falls back to
/// `~/.sprig`.
pub fn sprig_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("SPRIG_HOME") {
        if home.is_empty() {
            tracing::warn!("SPRIG_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("SPRIG_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".sprig"));
    }

    // Containerized/minimal environments without HOME
    let fallback_path = fallback_sprig_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback sprig home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_sprig_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/sprig-{}", uid))
}

/// Get fallback sprig home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_sprig_home() -> PathBuf {
    std::env::temp_dir().join("sprig")
}

/// Find the project root for a given working directory.
///
/// Walks up from `cwd` looking for an existing `.sprig/` directory; falls
/// back to `cwd` itself.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    for ancestor in cwd.ancestors() {
        if ancestor.join(".sprig").is_dir() {
            return ancestor.to_path_buf();
        }
    }
    cwd.to_path_buf()
}

/// Get the project sprig directory for a given working directory.
pub fn project_sprig_dir(cwd: &Path) -> PathBuf {
    find_project_root(cwd).join(".sprig")
}

/// Get the default plants directory.
///
/// Returns `<sprig_home>/plants/`.
pub fn plants_dir() -> Option<PathBuf> {
    sprig_home().map(|h| h.join("plants"))
}

/// Get the crash log path.
///
/// Returns `<sprig_home>/crash.log`.
pub fn crash_log_path() -> Option<PathBuf> {
    sprig_home().map(|h| h.join("crash.log"))
}
