// AxeProfiler - tests/e2e_session.rs
//
// End-to-end tests for the interactive session over a real temp storage
// directory. Input is a scripted line sequence, output a captured
// transcript; only the device transport is faked (no miner on the CI
// network). This exercises the full path from typed commands to JSON
// records on disk.

use axeprofiler::app::session::Session;
use axeprofiler::app::store::ProfileStore;
use axeprofiler::core::model::{DeviceInfo, DeviceSettings};
use axeprofiler::net::client::DeviceTransport;
use axeprofiler::util::error::TransportError;
use std::cell::RefCell;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;

// =============================================================================
// Helpers
// =============================================================================

/// Transport fake recording every device call.
#[derive(Clone, Default)]
struct RecordingTransport {
    calls: Rc<RefCell<Vec<String>>>,
}

impl DeviceTransport for RecordingTransport {
    fn fetch_info(&self, address: &str) -> Result<DeviceInfo, TransportError> {
        self.calls.borrow_mut().push(format!("info {address}"));
        Ok(DeviceInfo::default())
    }

    fn apply_settings(
        &self,
        address: &str,
        settings: &DeviceSettings,
    ) -> Result<(), TransportError> {
        self.calls.borrow_mut().push(format!(
            "apply {address} {}/{}/{}",
            settings.frequency, settings.core_voltage, settings.fanspeed
        ));
        Ok(())
    }

    fn restart(&self, address: &str) -> Result<(), TransportError> {
        self.calls.borrow_mut().push(format!("restart {address}"));
        Ok(())
    }
}

/// Drive a full session with scripted input lines and return the transcript.
fn run_script(storage_dir: &Path, script: &str) -> String {
    let store = ProfileStore::new(storage_dir.to_path_buf());
    let transport = RecordingTransport::default();
    let mut out = Vec::new();
    let mut session = Session::new(
        store,
        transport,
        None,
        Cursor::new(script.to_string()),
        &mut out,
    );
    session.run().expect("session loop failed on in-memory I/O");
    String::from_utf8(out).expect("session output was not UTF-8")
}

fn record_value(storage_dir: &Path, name: &str) -> serde_json::Value {
    let content = std::fs::read_to_string(storage_dir.join(format!("{name}.json")))
        .unwrap_or_else(|e| panic!("missing record for '{name}': {e}"));
    serde_json::from_str(&content).expect("record is not valid JSON")
}

// =============================================================================
// Full scenario
// =============================================================================

/// Create rig1, show it, bump the frequency, show again, quit. The persisted
/// record ends with frequency 600 and every other field unchanged.
#[test]
fn e2e_create_show_update_show_quit() {
    let dir = tempfile::tempdir().unwrap();

    // N: skip prefill, five fields, confirm; S; U: keep name/hostname,
    // frequency 600, keep voltage/fanspeed; S; Q.
    let script = "N\n\nrig1\nh1\n550\n1150\n100\ny\nS\nU\n\n\n600\n\n\nS\nQ\n";
    let output = run_script(dir.path(), script);

    assert!(output.contains("Profile 'rig1' saved."), "{output}");
    assert!(output.contains("frequency: 550 -> 600"), "{output}");
    assert!(output.contains("frequency    600 MHz"), "{output}");

    let record = record_value(dir.path(), "rig1");
    assert_eq!(record["name"], "rig1");
    assert_eq!(record["hostname"], "h1");
    assert_eq!(record["frequency"], 600);
    assert_eq!(record["coreVoltage"], 1150);
    assert_eq!(record["fanspeed"], 100);

    // Exactly one record on disk.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

/// Renaming through the session moves the record: exactly one file
/// afterwards, under the new name.
#[test]
fn e2e_rename_moves_record() {
    let dir = tempfile::tempdir().unwrap();

    let script = "N\n\nalpha\nh1\n550\n1150\n100\ny\nU\nbeta\n\n\n\n\nQ\n";
    let output = run_script(dir.path(), script);
    assert!(output.contains("name: alpha -> beta"), "{output}");

    assert!(dir.path().join("beta.json").is_file());
    assert!(!dir.path().join("alpha.json").exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    let record = record_value(dir.path(), "beta");
    assert_eq!(record["name"], "beta");
    assert_eq!(record["frequency"], 550);
}

/// An update answering every prompt with Enter writes nothing: record
/// content and mtime are untouched.
#[test]
fn e2e_noop_update_skips_persistence() {
    let dir = tempfile::tempdir().unwrap();

    run_script(dir.path(), "N\n\nrig1\nh1\n550\n1150\n100\ny\nQ\n");

    let path = dir.path().join("rig1.json");
    let before_content = std::fs::read_to_string(&path).unwrap();
    let before_mtime = std::fs::metadata(&path).unwrap().modified().unwrap();

    let output = run_script(dir.path(), "L\nrig1\nU\n\n\n\n\n\nQ\n");
    assert!(output.contains("No changes"), "{output}");

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before_content);
    assert_eq!(
        std::fs::metadata(&path).unwrap().modified().unwrap(),
        before_mtime
    );
}

// =============================================================================
// Pagination
// =============================================================================

/// Nine stored profiles paginate as 4, 4, 1 in sorted order, and repeated
/// P answers list every profile exactly once.
#[test]
fn e2e_pagination_exhausts_all_profiles_once() {
    let dir = tempfile::tempdir().unwrap();

    // Seed nine profiles through the session itself.
    let mut seed = String::new();
    for i in 1..=9 {
        seed.push_str(&format!("N\n\nrig{i}\nh\n550\n1150\n100\ny\n"));
    }
    seed.push_str("Q\n");
    run_script(dir.path(), &seed);

    // P, P pages through; Enter at the final page returns to the menu.
    let output = run_script(dir.path(), "L\nP\nP\n\nQ\n");

    assert!(output.contains("Saved profiles (9):"), "{output}");
    for i in 1..=9 {
        let listed = output.matches(&format!(" rig{i}\n")).count();
        assert_eq!(listed, 1, "rig{i} listed {listed} times:\n{output}");
    }

    // Two page prompts offer P (pages 1 and 2), the final page does not.
    let next_page_prompts = output.matches("[P] next page").count();
    assert_eq!(next_page_prompts, 2, "{output}");
}

// =============================================================================
// Guards and persistence across runs
// =============================================================================

/// A guarded command sequence with no selection touches neither the store
/// nor the transport.
#[test]
fn e2e_guard_sequence_has_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();

    let store = ProfileStore::new(dir.path().to_path_buf());
    let transport = RecordingTransport::default();
    let mut out = Vec::new();
    let mut session = Session::new(
        store,
        transport.clone(),
        None,
        Cursor::new("U\nR\nD\nS\nQ\n".to_string()),
        &mut out,
    );
    session.run().unwrap();

    let output = String::from_utf8(out).unwrap();
    assert_eq!(output.matches("No profile selected").count(), 4);
    assert!(transport.calls.borrow().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// Renaming to a path-like name is rejected: no record ever lands outside
/// the storage directory, and the original record is untouched.
#[test]
fn e2e_rename_cannot_escape_storage_dir() {
    let root = tempfile::tempdir().unwrap();
    let storage = root.path().join("store");
    std::fs::create_dir_all(&storage).unwrap();

    let output = run_script(
        &storage,
        "N\n\nrig1\nh1\n550\n1150\n100\ny\nU\n../escape\n\n\n\n\nQ\n",
    );
    assert!(output.contains("not usable"), "{output}");

    assert!(storage.join("rig1.json").is_file());
    assert!(!root.path().join("escape.json").exists());
    assert_eq!(std::fs::read_dir(&storage).unwrap().count(), 1);
}

/// Profiles created in one session are listed and loadable in the next.
#[test]
fn e2e_selection_survives_via_storage_not_memory() {
    let dir = tempfile::tempdir().unwrap();

    run_script(dir.path(), "N\n\nrig1\nh1\n550\n1150\n100\ny\nQ\n");

    // Fresh session: nothing selected until the explicit load.
    let output = run_script(dir.path(), "S\nL\nrig1\nS\nQ\n");
    assert!(output.contains("No profile selected"), "{output}");
    assert!(output.contains("Loaded profile 'rig1'."), "{output}");
    assert!(output.contains("coreVoltage  1150 mV"), "{output}");
}

/// Running a profile sends only the non-identity fields to the device.
#[test]
fn e2e_run_sends_device_settings() {
    let dir = tempfile::tempdir().unwrap();

    let store = ProfileStore::new(dir.path().to_path_buf());
    let transport = RecordingTransport::default();
    let mut out = Vec::new();
    let script = "N\n\nrig1\nh1\n550\n1150\n100\ny\nR\n192.168.1.50\ny\nQ\n";
    let mut session = Session::new(
        store,
        transport.clone(),
        None,
        Cursor::new(script.to_string()),
        &mut out,
    );
    session.run().unwrap();

    assert_eq!(
        transport.calls.borrow().as_slice(),
        [
            "apply 192.168.1.50 550/1150/100",
            "restart 192.168.1.50"
        ]
    );
}
