// AxeProfiler - app/store.rs
//
// Filesystem persistence for profile records: one JSON file per profile
// under a configured directory, filename derived from the profile name.
//
// Design principles:
// - Every write goes through write-temp then atomic rename, so a crash
//   during save never corrupts an existing record.
// - Rename-save writes the record under the NEW name before removing the
//   old file: at every intermediate point at least one durable copy of the
//   profile exists.
// - Load runs records through the same validate-and-construct path as
//   interactive creation, so a hand-edited file fails loudly instead of
//   being silently coerced.

use crate::core::model::Profile;
use crate::core::profile;
use crate::util::constants;
use crate::util::error::StoreError;
use std::path::{Path, PathBuf};

/// Handle on the profile storage directory.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The storage directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for a given profile name.
    fn record_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{name}.{}", constants::PROFILE_FILE_EXT))
    }

    /// True if a record is persisted under the given name.
    pub fn exists(&self, name: &str) -> bool {
        self.record_path(name).is_file()
    }

    /// Persist a profile, moving the record when the profile was renamed.
    ///
    /// `previous_name` is the name the profile was stored under before a
    /// rename, as reported by `core::profile::apply_update`. The new record
    /// is written first; only after it is durably in place is the old one
    /// removed.
    pub fn save(&self, profile: &Profile, previous_name: Option<&str>) -> Result<(), StoreError> {
        self.write_record(profile)?;

        // Remove the old record only after the new one is durable. If the
        // process dies between the two steps, a later save under the new
        // name completes the move.
        if let Some(old_name) = previous_name {
            if old_name != profile.name() {
                self.remove_previous(old_name, profile.name())?;
            }
        }

        Ok(())
    }

    /// Make the record for a profile durable: write a temp file, then
    /// atomically rename it into place.
    fn write_record(&self, profile: &Profile) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Persistence {
            path: self.dir.clone(),
            operation: "create directory",
            source: e,
        })?;

        let content = serde_json::to_string_pretty(profile).map_err(|e| StoreError::Serialize {
            name: profile.name().to_string(),
            source: e,
        })?;

        let final_path = self.record_path(profile.name());
        let temp_path = self
            .dir
            .join(format!("{}{}", file_name(&final_path), constants::TEMP_FILE_SUFFIX));

        std::fs::write(&temp_path, content).map_err(|e| StoreError::Persistence {
            path: temp_path.clone(),
            operation: "write",
            source: e,
        })?;
        std::fs::rename(&temp_path, &final_path).map_err(|e| StoreError::Persistence {
            path: final_path.clone(),
            operation: "rename",
            source: e,
        })?;

        tracing::debug!(
            profile = profile.name(),
            path = %final_path.display(),
            "Profile saved"
        );
        Ok(())
    }

    /// Remove the record left under the old name by a rename. Called only
    /// once the record under the new name is durable.
    fn remove_previous(&self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        let old_path = self.record_path(old_name);
        if !old_path.is_file() {
            return Ok(());
        }
        std::fs::remove_file(&old_path).map_err(|e| StoreError::Persistence {
            path: old_path.clone(),
            operation: "remove",
            source: e,
        })?;
        tracing::info!(
            from = old_name,
            to = new_name,
            "Profile record moved after rename"
        );
        Ok(())
    }

    /// Load a profile by name, validating the record exactly like creation
    /// input.
    pub fn load(&self, name: &str) -> Result<Profile, StoreError> {
        let path = self.record_path(name);

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(e) => {
                return Err(StoreError::Persistence {
                    path,
                    operation: "stat",
                    source: e,
                });
            }
        };

        if metadata.len() > constants::MAX_PROFILE_FILE_SIZE {
            return Err(StoreError::FileTooLarge {
                path,
                size: metadata.len(),
                max_size: constants::MAX_PROFILE_FILE_SIZE,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| StoreError::Persistence {
            path: path.clone(),
            operation: "read",
            source: e,
        })?;

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                source: e,
            })?;

        profile::from_config(&value).map_err(|e| StoreError::Validation {
            name: name.to_string(),
            source: e,
        })
    }

    /// Remove the persisted record for a profile name.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.record_path(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(profile = name, "Profile deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(StoreError::Persistence {
                path,
                operation: "remove",
                source: e,
            }),
        }
    }

    /// All persisted profile names in sorted order.
    ///
    /// A missing storage directory is treated as an empty store (first run).
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Persistence {
                    path: self.dir.clone(),
                    operation: "read directory",
                    source: e,
                });
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Persistence {
                path: self.dir.clone(),
                operation: "read directory",
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(constants::PROFILE_FILE_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

/// File name component of a path, falling back to the full path display.
fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

// =============================================================================
// Tests
// =============================================================================
