// AxeProfiler - core/model.rs
//
// Profile domain types. Fields are private: a Profile is constructed only
// through the validate-and-construct path in core::profile and mutated only
// through `apply_update`, never by direct assignment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, persisted set of device operating parameters for a miner
/// running AxeOS.
///
/// On disk and over the wire the voltage field is spelled `coreVoltage`,
/// matching the AxeOS system API. The persisted record uses exactly the
/// five keys produced by [`Profile::to_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    name: String,
    hostname: String,
    frequency: u32,
    #[serde(rename = "coreVoltage")]
    core_voltage: u32,
    fanspeed: u32,
}

impl Profile {
    /// Construct a profile from already-validated parts.
    ///
    /// Crate-internal: external callers go through `core::profile::from_config`.
    pub(crate) fn new(
        name: String,
        hostname: String,
        frequency: u32,
        core_voltage: u32,
        fanspeed: u32,
    ) -> Self {
        Self {
            name,
            hostname,
            frequency,
            core_voltage,
            fanspeed,
        }
    }

    /// The profile name; doubles as the storage key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Informational device label, not used for addressing.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Clock frequency setting in MHz.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Core supply voltage setting in millivolts.
    pub fn core_voltage(&self) -> u32 {
        self.core_voltage
    }

    /// Fan duty setting in percent.
    pub fn fanspeed(&self) -> u32 {
        self.fanspeed
    }

    /// The non-identity subset pushed to a device: everything except
    /// `name` and `hostname`.
    pub fn settings(&self) -> DeviceSettings {
        DeviceSettings {
            frequency: self.frequency,
            core_voltage: self.core_voltage,
            fanspeed: self.fanspeed,
        }
    }

    /// The full field set as a JSON value, in the on-disk schema.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "hostname": self.hostname,
            "frequency": self.frequency,
            "coreVoltage": self.core_voltage,
            "fanspeed": self.fanspeed,
        })
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = serde_json::to_string_pretty(&self.to_value()).map_err(|_| fmt::Error)?;
        f.write_str(&pretty)
    }
}

/// The settings payload for the AxeOS system PATCH endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSettings {
    pub frequency: u32,
    #[serde(rename = "coreVoltage")]
    pub core_voltage: u32,
    pub fanspeed: u32,
}

/// The live operating state reported by a device's system info endpoint,
/// used to prefill profile creation.
///
/// Every field is optional: the info response carries dozens of keys and
/// varies across firmware versions, so anything the device does not report
/// simply gets no prefill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceInfo {
    pub hostname: Option<String>,
    pub frequency: Option<u32>,
    #[serde(rename = "coreVoltage")]
    pub core_voltage: Option<u32>,
    pub fanspeed: Option<u32>,
}

/// A partial update to a profile: one explicit present-vs-absent slot per
/// field. `None` means "leave unchanged"; `Some(v)` equal to the current
/// value is treated as unchanged when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub frequency: Option<u32>,
    pub core_voltage: Option<u32>,
    pub fanspeed: Option<u32>,
}

impl ProfileUpdate {
    /// True when no field is present at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.hostname.is_none()
            && self.frequency.is_none()
            && self.core_voltage.is_none()
            && self.fanspeed.is_none()
    }
}

/// One field that actually changed value during an update, with display
/// strings for user feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub from: String,
    pub to: String,
}

/// Result of applying a [`ProfileUpdate`]: which fields changed, and the
/// old name when the update renamed the profile (so persistence can move
/// the record instead of duplicating it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub changes: Vec<FieldChange>,
    pub previous_name: Option<String>,
}

impl UpdateOutcome {
    /// True when the update changed nothing and persistence can be skipped.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}
