// AxeProfiler - platform/config.rs
//
// Platform-specific path resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance. A missing or corrupt config file never
// aborts startup; the application falls back to defaults and reports
// warnings.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for AxeProfiler data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/axeprofiler/).
    pub config_dir: PathBuf,

    /// Default profile storage directory (e.g. ~/.config/axeprofiler/profiles/).
    pub profiles_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let profiles_dir = config_dir.join(constants::PROFILES_DIR_NAME);

            tracing::debug!(
                config = %config_dir.display(),
                profiles = %profiles_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                profiles_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                profiles_dir: fallback.join(constants::PROFILES_DIR_NAME),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[storage]` section.
    pub storage: StorageSection,
    /// `[device]` section.
    pub device: DeviceSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[storage]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Profile storage directory (overrides the platform default).
    pub directory: Option<String>,
}

/// `[device]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    /// Address offered as the default at the RUN prompt.
    pub default_address: Option<String>,
    /// HTTP timeout in seconds for device operations.
    pub timeout_secs: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Profile storage directory override (None = platform default).
    pub storage_dir: Option<PathBuf>,
    /// Default device address for the RUN prompt.
    pub default_address: Option<String>,
    /// Device HTTP timeout in seconds.
    pub http_timeout_secs: u64,
    /// Logging level string (applied at logging init).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            default_address: None,
            http_timeout_secs: constants::DEFAULT_HTTP_TIMEOUT_SECS,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no warnings
/// (first run). If the file is unparseable, returns defaults with a warning
/// -- the application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults. \
                 See config.example.toml for the expected format.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let mut config = AppConfig::default();

    // -- Storage: directory --
    if let Some(ref dir) = raw.storage.directory {
        if dir.is_empty() {
            warnings.push("[storage] directory is empty. Using platform default.".to_string());
        } else {
            config.storage_dir = Some(PathBuf::from(dir));
        }
    }

    // -- Device: default_address --
    if let Some(ref addr) = raw.device.default_address {
        if !addr.is_empty() {
            config.default_address = Some(addr.clone());
        }
    }

    // -- Device: timeout_secs --
    if let Some(secs) = raw.device.timeout_secs {
        if (1..=constants::MAX_HTTP_TIMEOUT_SECS).contains(&secs) {
            config.http_timeout_secs = secs;
        } else {
            warnings.push(format!(
                "[device] timeout_secs = {secs} is out of range (1-{}). Using default ({}).",
                constants::MAX_HTTP_TIMEOUT_SECS,
                constants::DEFAULT_HTTP_TIMEOUT_SECS,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert!(config.storage_dir.is_none());
        assert_eq!(
            config.http_timeout_secs,
            constants::DEFAULT_HTTP_TIMEOUT_SECS
        );
    }

    #[test]
    fn test_unparseable_config_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), "not = [toml").unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Failed to parse"));
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_valid_config_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(constants::CONFIG_FILE_NAME),
            r#"
[storage]
directory = "/tmp/axe-profiles"

[device]
default_address = "bitaxe.local"
timeout_secs = 30

[logging]
level = "debug"
"#,
        )
        .unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(
            config.storage_dir.as_deref(),
            Some(Path::new("/tmp/axe-profiles"))
        );
        assert_eq!(config.default_address.as_deref(), Some("bitaxe.local"));
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_timeout_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(constants::CONFIG_FILE_NAME),
            "[device]\ntimeout_secs = 0\n",
        )
        .unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("timeout_secs"));
        assert_eq!(
            config.http_timeout_secs,
            constants::DEFAULT_HTTP_TIMEOUT_SECS
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(constants::CONFIG_FILE_NAME),
            "[future_section]\nshiny = true\n",
        )
        .unwrap();
        let (_, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_bad_log_level_warns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(constants::CONFIG_FILE_NAME),
            "[logging]\nlevel = \"loud\"\n",
        )
        .unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(config.log_level.is_none());
    }
}
