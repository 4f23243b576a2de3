// AxeProfiler - net/client.rs
//
// Blocking HTTP client for the AxeOS device control API.
// The session layer consumes this through the DeviceTransport trait so it
// can be exercised with a recording fake in tests.

use crate::core::model::{DeviceInfo, DeviceSettings};
use crate::util::constants;
use crate::util::error::TransportError;
use std::time::Duration;
use ureq::Agent;

/// The device operations the session controller needs.
pub trait DeviceTransport {
    /// Read the device's live operating state via GET /api/system/info.
    fn fetch_info(&self, address: &str) -> Result<DeviceInfo, TransportError>;

    /// Push operating settings to a device via PATCH /api/system.
    fn apply_settings(
        &self,
        address: &str,
        settings: &DeviceSettings,
    ) -> Result<(), TransportError>;

    /// Trigger a device restart via POST /api/system/restart.
    fn restart(&self, address: &str) -> Result<(), TransportError>;
}

/// `DeviceTransport` implementation speaking plain HTTP to a device on the
/// local network.
pub struct HttpDeviceClient {
    agent: Agent,
}

impl HttpDeviceClient {
    /// Create a client with a global timeout covering connect, send, and read.
    pub fn new(timeout_secs: u64) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build()
            .into();
        Self { agent }
    }
}

impl DeviceTransport for HttpDeviceClient {
    fn fetch_info(&self, address: &str) -> Result<DeviceInfo, TransportError> {
        let url = device_url(address, constants::SYSTEM_INFO_ENDPOINT);
        tracing::info!(url = %url, "Reading device state");

        let mut response = self.agent.get(&url).call().map_err(|e| classify(address, e))?;
        response
            .body_mut()
            .read_json()
            .map_err(|e| classify(address, e))
    }

    fn apply_settings(
        &self,
        address: &str,
        settings: &DeviceSettings,
    ) -> Result<(), TransportError> {
        let url = device_url(address, constants::SYSTEM_ENDPOINT);
        tracing::info!(url = %url, "Applying settings to device");

        self.agent
            .patch(&url)
            .send_json(settings)
            .map_err(|e| classify(address, e))?;

        Ok(())
    }

    fn restart(&self, address: &str) -> Result<(), TransportError> {
        let url = device_url(address, constants::RESTART_ENDPOINT);
        tracing::info!(url = %url, "Restarting device");

        self.agent
            .post(&url)
            .send_empty()
            .map_err(|e| classify(address, e))?;

        Ok(())
    }
}

/// Build a device endpoint URL from a user-typed address.
///
/// Tolerates an explicit `http://` prefix and a trailing slash; devices on
/// the local network speak plain HTTP, so no scheme upgrade is attempted.
pub fn device_url(address: &str, endpoint: &str) -> String {
    let host = address
        .trim()
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("http://{host}{endpoint}")
}

/// Map a ureq failure into the transport error taxonomy.
fn classify(address: &str, error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::StatusCode(status) => TransportError::Http {
            address: address.to_string(),
            status,
        },
        ureq::Error::Timeout(_) => TransportError::Timeout {
            address: address.to_string(),
        },
        other => TransportError::Connection {
            address: address.to_string(),
            source: Box::new(other),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_url_bare_address() {
        assert_eq!(
            device_url("192.168.1.50", "/api/system"),
            "http://192.168.1.50/api/system"
        );
    }

    #[test]
    fn test_device_url_strips_scheme_and_slash() {
        assert_eq!(
            device_url("http://bitaxe.local/", "/api/system/restart"),
            "http://bitaxe.local/api/system/restart"
        );
    }

    #[test]
    fn test_device_url_trims_whitespace() {
        assert_eq!(
            device_url("  10.0.0.7 ", "/api/system"),
            "http://10.0.0.7/api/system"
        );
    }

    #[test]
    fn test_classify_status_code() {
        let err = classify("10.0.0.7", ureq::Error::StatusCode(500));
        match err {
            TransportError::Http { address, status } => {
                assert_eq!(address, "10.0.0.7");
                assert_eq!(status, 500);
            }
            other => panic!("Expected Http, got: {other:?}"),
        }
    }
}
