// AxeProfiler - core/profile.rs
//
// Profile validation and pure update logic.
// Core layer: accepts JSON values, never touches the filesystem or network.
// I/O is handled by app::store, which feeds record content here.

use crate::core::model::{FieldChange, Profile, ProfileUpdate, UpdateOutcome};
use crate::util::error::ValidationError;
use serde_json::Value;

// =============================================================================
// Validate-and-construct
// =============================================================================

/// Validate a raw configuration mapping and construct a [`Profile`].
///
/// All five fields are mandatory and type-checked. The first failure aborts
/// construction; no partial profile is ever returned. Both interactive
/// creation and record load go through this single path, so a hand-edited
/// record fails exactly like bad creation input.
pub fn from_config(config: &Value) -> Result<Profile, ValidationError> {
    let name = require_string(config, "name")?;
    validate_name(name)?;
    let hostname = require_string(config, "hostname")?;
    let frequency = require_integer(config, "frequency")?;
    let core_voltage = require_integer(config, "coreVoltage")?;
    let fanspeed = require_integer(config, "fanspeed")?;

    Ok(Profile::new(
        name.to_string(),
        hostname.to_string(),
        frequency,
        core_voltage,
        fanspeed,
    ))
}

/// Require a present, non-empty string field.
fn require_string<'a>(config: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    match config.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::MissingField { field }),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "string",
        }),
    }
}

/// Require a present, non-negative integer field that fits in u32.
fn require_integer(config: &Value, field: &'static str) -> Result<u32, ValidationError> {
    match config.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(ValidationError::WrongType {
                field,
                expected: "integer",
            }),
    }
}

/// The profile name doubles as a file stem, so path-like names are rejected.
fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name == "." || name == ".." {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
            reason: "reserved path component",
        });
    }
    if name.contains(['/', '\\']) || name.contains('\0') {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
            reason: "contains a path separator",
        });
    }
    Ok(())
}

// =============================================================================
// Partial update
// =============================================================================

/// Apply a partial update, returning the new profile value and the set of
/// fields that actually changed.
///
/// Fields absent from the update, or present with a value equal to the
/// current one, produce no change entry. When the name changes, the outcome
/// records the old name so persistence can move the record (rename-save).
///
/// An incoming name goes through the same name rules as creation; a rename
/// can never produce a profile whose record would land outside the storage
/// directory.
pub fn apply_update(
    profile: &Profile,
    update: &ProfileUpdate,
) -> Result<(Profile, UpdateOutcome), ValidationError> {
    if let Some(new) = &update.name {
        validate_name(new)?;
    }

    let mut outcome = UpdateOutcome::default();

    let name = match &update.name {
        Some(new) if new.as_str() != profile.name() => {
            outcome.changes.push(FieldChange {
                field: "name",
                from: profile.name().to_string(),
                to: new.clone(),
            });
            outcome.previous_name = Some(profile.name().to_string());
            new.clone()
        }
        _ => profile.name().to_string(),
    };

    let hostname = match &update.hostname {
        Some(new) if new.as_str() != profile.hostname() => {
            outcome.changes.push(FieldChange {
                field: "hostname",
                from: profile.hostname().to_string(),
                to: new.clone(),
            });
            new.clone()
        }
        _ => profile.hostname().to_string(),
    };

    let frequency = diff_numeric(
        "frequency",
        profile.frequency(),
        update.frequency,
        &mut outcome,
    );
    let core_voltage = diff_numeric(
        "coreVoltage",
        profile.core_voltage(),
        update.core_voltage,
        &mut outcome,
    );
    let fanspeed = diff_numeric("fanspeed", profile.fanspeed(), update.fanspeed, &mut outcome);

    let updated = Profile::new(name, hostname, frequency, core_voltage, fanspeed);
    Ok((updated, outcome))
}

fn diff_numeric(
    field: &'static str,
    current: u32,
    incoming: Option<u32>,
    outcome: &mut UpdateOutcome,
) -> u32 {
    match incoming {
        Some(new) if new != current => {
            outcome.changes.push(FieldChange {
                field,
                from: current.to_string(),
                to: new.to_string(),
            });
            new
        }
        _ => current,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_config() -> Value {
        json!({
            "name": "rig1",
            "hostname": "bitaxe-garage",
            "frequency": 550,
            "coreVoltage": 1150,
            "fanspeed": 100,
        })
    }

    #[test]
    fn test_valid_config_round_trips() {
        let config = valid_config();
        let profile = from_config(&config).unwrap();
        assert_eq!(profile.name(), "rig1");
        assert_eq!(profile.hostname(), "bitaxe-garage");
        assert_eq!(profile.frequency(), 550);
        assert_eq!(profile.core_voltage(), 1150);
        assert_eq!(profile.fanspeed(), 100);
        assert_eq!(profile.to_value(), config);
    }

    #[test]
    fn test_missing_field_rejected() {
        for field in ["name", "hostname", "frequency", "coreVoltage", "fanspeed"] {
            let mut config = valid_config();
            config.as_object_mut().unwrap().remove(field);
            let result = from_config(&config);
            match result.unwrap_err() {
                ValidationError::MissingField { field: f } => assert_eq!(f, field),
                other => panic!("Expected MissingField for '{field}', got: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let mut config = valid_config();
        config["hostname"] = json!("");
        assert!(matches!(
            from_config(&config).unwrap_err(),
            ValidationError::MissingField { field: "hostname" }
        ));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut config = valid_config();
        config["frequency"] = json!("550");
        assert!(matches!(
            from_config(&config).unwrap_err(),
            ValidationError::WrongType {
                field: "frequency",
                ..
            }
        ));

        let mut config = valid_config();
        config["name"] = json!(42);
        assert!(matches!(
            from_config(&config).unwrap_err(),
            ValidationError::WrongType { field: "name", .. }
        ));
    }

    #[test]
    fn test_negative_integer_rejected() {
        let mut config = valid_config();
        config["coreVoltage"] = json!(-5);
        assert!(matches!(
            from_config(&config).unwrap_err(),
            ValidationError::WrongType {
                field: "coreVoltage",
                ..
            }
        ));
    }

    #[test]
    fn test_path_like_name_rejected() {
        let mut config = valid_config();
        config["name"] = json!("../escape");
        assert!(matches!(
            from_config(&config).unwrap_err(),
            ValidationError::InvalidName { .. }
        ));
    }

    #[test]
    fn test_update_with_current_values_is_noop() {
        let profile = from_config(&valid_config()).unwrap();
        let update = ProfileUpdate {
            name: Some("rig1".to_string()),
            frequency: Some(550),
            ..Default::default()
        };
        let (updated, outcome) = apply_update(&profile, &update).unwrap();
        assert!(outcome.is_noop());
        assert!(outcome.previous_name.is_none());
        assert_eq!(updated, profile);
    }

    #[test]
    fn test_update_empty_is_noop() {
        let profile = from_config(&valid_config()).unwrap();
        let (updated, outcome) = apply_update(&profile, &ProfileUpdate::default()).unwrap();
        assert!(outcome.is_noop());
        assert_eq!(updated, profile);
    }

    #[test]
    fn test_update_changes_only_differing_fields() {
        let profile = from_config(&valid_config()).unwrap();
        let update = ProfileUpdate {
            frequency: Some(600),
            fanspeed: Some(100), // equal to current: no change
            ..Default::default()
        };
        let (updated, outcome) = apply_update(&profile, &update).unwrap();
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].field, "frequency");
        assert_eq!(outcome.changes[0].from, "550");
        assert_eq!(outcome.changes[0].to, "600");
        assert!(outcome.previous_name.is_none());
        assert_eq!(updated.frequency(), 600);
        assert_eq!(updated.fanspeed(), 100);
        assert_eq!(updated.name(), "rig1");
    }

    #[test]
    fn test_update_rename_records_previous_name() {
        let profile = from_config(&valid_config()).unwrap();
        let update = ProfileUpdate {
            name: Some("rig2".to_string()),
            ..Default::default()
        };
        let (updated, outcome) = apply_update(&profile, &update).unwrap();
        assert_eq!(updated.name(), "rig2");
        assert_eq!(outcome.previous_name.as_deref(), Some("rig1"));
        assert_eq!(outcome.changes.len(), 1);
    }

    #[test]
    fn test_update_rejects_path_like_name() {
        let profile = from_config(&valid_config()).unwrap();
        for bad in ["../escape", "a/b", "a\\b", "..", "."] {
            let update = ProfileUpdate {
                name: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(
                matches!(
                    apply_update(&profile, &update),
                    Err(ValidationError::InvalidName { .. })
                ),
                "rename to '{bad}' was accepted"
            );
        }
    }

    #[test]
    fn test_settings_excludes_identity_fields() {
        let profile = from_config(&valid_config()).unwrap();
        let value = serde_json::to_value(profile.settings()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["frequency"], json!(550));
        assert_eq!(obj["coreVoltage"], json!(1150));
        assert_eq!(obj["fanspeed"], json!(100));
        assert!(!obj.contains_key("name"));
        assert!(!obj.contains_key("hostname"));
    }
}
