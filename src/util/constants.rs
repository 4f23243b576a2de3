// AxeProfiler - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "AxeProfiler";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "AxeProfiler";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Storage
// =============================================================================

/// Directory name under the platform config root where profiles are stored.
pub const PROFILES_DIR_NAME: &str = "profiles";

/// File extension for persisted profile records.
pub const PROFILE_FILE_EXT: &str = "json";

/// Suffix appended to the temp file written before the atomic rename.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Maximum size of a single profile record. Records exceeding this are
/// rejected on load rather than read into memory.
pub const MAX_PROFILE_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Config file name, located next to the profiles directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Session
// =============================================================================

/// Number of profiles shown per page when listing.
pub const LIST_PAGE_SIZE: usize = 4;

/// Reserved token that aborts interactive profile creation at any prompt.
pub const CANCEL_TOKEN: &str = "!cancel";

// =============================================================================
// Device transport
// =============================================================================

/// Default global timeout for all device HTTP operations, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Upper bound on the configurable device timeout.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

/// AxeOS endpoint for changing system settings (PATCH, JSON body).
pub const SYSTEM_ENDPOINT: &str = "/api/system";

/// AxeOS endpoint for reading the live system state (GET, JSON response).
pub const SYSTEM_INFO_ENDPOINT: &str = "/api/system/info";

/// AxeOS endpoint for triggering a device restart (POST, no body).
pub const RESTART_ENDPOINT: &str = "/api/system/restart";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config specify one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
