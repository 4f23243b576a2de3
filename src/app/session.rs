// AxeProfiler - app/session.rs
//
// The interactive session: a single-threaded menu loop that holds at most
// one selected profile and dispatches single-character commands to the
// profile store or the device transport.
//
// Design principles:
// - Every non-terminal command returns to the menu; only Q (or EOF on the
//   input stream) terminates the loop.
// - This layer is the single place store and transport errors are caught
//   and translated into user-facing text; nothing domain-level propagates
//   out of `run`, only terminal I/O errors.
// - Input and output are injected (`BufRead` / `Write`) so tests drive the
//   loop with scripted lines and inspect the rendered transcript.

use crate::app::store::ProfileStore;
use crate::core::model::{DeviceInfo, Profile, ProfileUpdate};
use crate::core::profile;
use crate::net::client::DeviceTransport;
use crate::util::constants;
use std::io::{self, BufRead, Write};

/// A parsed menu command. Commands are single characters, case-insensitive;
/// empty input defaults to re-showing the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    New,
    Update,
    Run,
    Delete,
    Show,
    Menu,
    Quit,
    Unknown,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Menu;
        }
        let mut chars = trimmed.chars();
        let first = chars.next().map(|c| c.to_ascii_lowercase());
        if chars.next().is_some() {
            return Self::Unknown;
        }
        match first {
            Some('l') => Self::List,
            Some('n') => Self::New,
            Some('u') => Self::Update,
            Some('r') => Self::Run,
            Some('d') => Self::Delete,
            Some('s') => Self::Show,
            Some('m') => Self::Menu,
            Some('q') => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

/// Outcome of a cancellable creation prompt.
enum Entry<T> {
    Value(T),
    Cancelled,
}

/// The interactive session controller.
pub struct Session<R, W, T> {
    input: R,
    out: W,
    store: ProfileStore,
    transport: T,
    selected: Option<Profile>,
    default_address: Option<String>,
}

impl<R: BufRead, W: Write, T: DeviceTransport> Session<R, W, T> {
    pub fn new(
        store: ProfileStore,
        transport: T,
        default_address: Option<String>,
        input: R,
        out: W,
    ) -> Self {
        Self {
            input,
            out,
            store,
            transport,
            selected: None,
            default_address,
        }
    }

    /// Run the menu loop until Q or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        tracing::info!("Session started");
        loop {
            self.render_menu()?;
            let Some(line) = self.prompt("Enter option [M]: ")? else {
                break;
            };
            match Command::parse(&line) {
                Command::List => self.handle_list()?,
                Command::New => self.handle_create()?,
                Command::Update => self.handle_update()?,
                Command::Run => self.handle_run()?,
                Command::Delete => self.handle_delete()?,
                Command::Show => self.handle_show()?,
                Command::Menu => {}
                Command::Quit => break,
                Command::Unknown => {
                    writeln!(self.out, "Unrecognised option '{}'.", line.trim())?;
                }
            }
        }
        writeln!(self.out, "Session terminated.")?;
        tracing::info!("Session terminated");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Command handlers
    // -------------------------------------------------------------------

    /// L: enumerate persisted profiles in fixed-size pages. At each page
    /// prompt the user may page forward, load a profile by name (explicit
    /// load sets the selection), or return to the menu.
    fn handle_list(&mut self) -> io::Result<()> {
        let names = match self.store.list() {
            Ok(names) => names,
            Err(e) => {
                writeln!(self.out, "Could not list profiles: {e}")?;
                return Ok(());
            }
        };
        if names.is_empty() {
            writeln!(self.out, "No profiles saved yet. Use [N] to create one.")?;
            return Ok(());
        }

        writeln!(self.out, "Saved profiles ({}):", names.len())?;
        let mut pages = names.chunks(constants::LIST_PAGE_SIZE).peekable();
        while let Some(page) = pages.next() {
            for name in page {
                let marker = if self.selected.as_ref().map(Profile::name) == Some(name.as_str()) {
                    '*'
                } else {
                    ' '
                };
                writeln!(self.out, "  {marker} {name}")?;
            }
            let more = pages.peek().is_some();
            let label = if more {
                "[P] next page, profile name to load, or Enter for menu: "
            } else {
                "Profile name to load, or Enter for menu: "
            };
            let Some(answer) = self.prompt(label)? else {
                return Ok(());
            };
            if answer.is_empty() {
                return Ok(());
            }
            if more && answer.eq_ignore_ascii_case("p") {
                continue;
            }
            self.load_and_select(&answer)?;
            return Ok(());
        }
        Ok(())
    }

    fn load_and_select(&mut self, name: &str) -> io::Result<()> {
        match self.store.load(name) {
            Ok(profile) => {
                writeln!(self.out, "Loaded profile '{}'.", profile.name())?;
                self.selected = Some(profile);
            }
            Err(e) => writeln!(self.out, "Could not load profile: {e}")?,
        }
        Ok(())
    }

    /// N: interactively collect the five fields, validate-and-construct,
    /// confirm, persist. The cancel token aborts at any prompt with zero
    /// side effects; on success the new profile becomes the selection.
    ///
    /// Creation optionally starts by reading a device's live state, which
    /// prefills the hostname and settings prompts (Enter accepts the shown
    /// value).
    fn handle_create(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "Creating a new profile (type {} at any prompt to abort).",
            constants::CANCEL_TOKEN
        )?;

        let Entry::Value(info) = self.prefill_info()? else {
            return self.creation_cancelled();
        };
        let info = info.unwrap_or_default();

        let Entry::Value(name) = self.create_field("Profile name: ", None)? else {
            return self.creation_cancelled();
        };
        let hostname_label = match info.hostname.as_deref() {
            Some(h) => format!("Device hostname [{h}]: "),
            None => "Device hostname: ".to_string(),
        };
        let Entry::Value(hostname) =
            self.create_field(&hostname_label, info.hostname.as_deref())?
        else {
            return self.creation_cancelled();
        };
        let Entry::Value(frequency) =
            self.create_number(&number_label("Frequency (MHz)", info.frequency), info.frequency)?
        else {
            return self.creation_cancelled();
        };
        let Entry::Value(core_voltage) = self.create_number(
            &number_label("Core voltage (mV)", info.core_voltage),
            info.core_voltage,
        )?
        else {
            return self.creation_cancelled();
        };
        let Entry::Value(fanspeed) =
            self.create_number(&number_label("Fan speed (%)", info.fanspeed), info.fanspeed)?
        else {
            return self.creation_cancelled();
        };

        let config = serde_json::json!({
            "name": name,
            "hostname": hostname,
            "frequency": frequency,
            "coreVoltage": core_voltage,
            "fanspeed": fanspeed,
        });
        let new_profile = match profile::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                writeln!(self.out, "Could not create profile: {e}")?;
                return Ok(());
            }
        };

        let verb = if self.store.exists(new_profile.name()) {
            "Overwrite existing"
        } else {
            "Save"
        };
        let question = format!("{verb} profile '{}'? [y/N]: ", new_profile.name());
        if !self.confirm(&question)? {
            writeln!(self.out, "Discarded; nothing was saved.")?;
            return Ok(());
        }

        match self.store.save(&new_profile, None) {
            Ok(()) => {
                writeln!(self.out, "Profile '{}' saved.", new_profile.name())?;
                self.selected = Some(new_profile);
            }
            Err(e) => writeln!(self.out, "Could not save profile: {e}")?,
        }
        Ok(())
    }

    fn creation_cancelled(&mut self) -> io::Result<()> {
        writeln!(self.out, "Creation cancelled; nothing was saved.")?;
        Ok(())
    }

    /// Optional prefill step at the start of creation: an address reads the
    /// device's live state, Enter starts blank. A transport failure falls
    /// back to blank prompts rather than aborting creation.
    fn prefill_info(&mut self) -> io::Result<Entry<Option<DeviceInfo>>> {
        match self.prompt("Device address to prefill from (Enter to start blank): ")? {
            None => Ok(Entry::Cancelled),
            Some(v) if v == constants::CANCEL_TOKEN => Ok(Entry::Cancelled),
            Some(v) if v.is_empty() => Ok(Entry::Value(None)),
            Some(address) => match self.transport.fetch_info(&address) {
                Ok(info) => {
                    writeln!(
                        self.out,
                        "Read current settings from {address}; Enter accepts the shown value."
                    )?;
                    Ok(Entry::Value(Some(info)))
                }
                Err(e) => {
                    writeln!(self.out, "Could not read device state: {e}")?;
                    writeln!(self.out, "Starting blank.")?;
                    Ok(Entry::Value(None))
                }
            },
        }
    }

    /// U: partial update of the selected profile. Empty input keeps the
    /// current value for that field; an update that changes nothing skips
    /// persistence entirely.
    fn handle_update(&mut self) -> io::Result<()> {
        let Some(current) = self.selected.clone() else {
            return self.nothing_selected();
        };

        writeln!(
            self.out,
            "Updating profile '{}' (Enter keeps the current value).",
            current.name()
        )?;

        let update = ProfileUpdate {
            name: self.update_field(&format!("Name [{}]: ", current.name()))?,
            hostname: self.update_field(&format!("Hostname [{}]: ", current.hostname()))?,
            frequency: self
                .update_number(&format!("Frequency (MHz) [{}]: ", current.frequency()))?,
            core_voltage: self
                .update_number(&format!("Core voltage (mV) [{}]: ", current.core_voltage()))?,
            fanspeed: self.update_number(&format!("Fan speed (%) [{}]: ", current.fanspeed()))?,
        };

        let (updated, outcome) = match profile::apply_update(&current, &update) {
            Ok(result) => result,
            Err(e) => {
                writeln!(self.out, "Could not update profile: {e}")?;
                return Ok(());
            }
        };
        if outcome.is_noop() {
            writeln!(self.out, "No changes; profile left untouched.")?;
            return Ok(());
        }

        for change in &outcome.changes {
            writeln!(
                self.out,
                "  {}: {} -> {}",
                change.field, change.from, change.to
            )?;
        }

        // A rename onto another profile's name replaces that record; ask
        // first, exactly like overwriting at creation.
        if outcome.previous_name.is_some() && self.store.exists(updated.name()) {
            let question = format!("Overwrite existing profile '{}'? [y/N]: ", updated.name());
            if !self.confirm(&question)? {
                writeln!(
                    self.out,
                    "Discarded; profile '{}' left untouched.",
                    current.name()
                )?;
                return Ok(());
            }
        }

        // The in-memory mutation happens regardless of save outcome; a
        // failed save leaves the selection updated but not durable.
        self.selected = Some(updated.clone());
        match self.store.save(&updated, outcome.previous_name.as_deref()) {
            Ok(()) => writeln!(self.out, "Profile '{}' saved.", updated.name())?,
            Err(e) => {
                writeln!(self.out, "Could not save changes: {e}")?;
                writeln!(
                    self.out,
                    "The update is applied in memory only; run [U] again to retry saving."
                )?;
            }
        }
        Ok(())
    }

    /// R: push the selected profile's device settings (frequency, voltage,
    /// fan speed; never name/hostname) to a device address. Transport
    /// failures are reported and the loop resumes at the menu.
    fn handle_run(&mut self) -> io::Result<()> {
        let Some((name, settings)) = self
            .selected
            .as_ref()
            .map(|p| (p.name().to_string(), p.settings()))
        else {
            return self.nothing_selected();
        };

        let label = match &self.default_address {
            Some(addr) => format!("Device address [{addr}]: "),
            None => "Device address (IP or hostname): ".to_string(),
        };
        let Some(answer) = self.prompt(&label)? else {
            return Ok(());
        };
        let address = if answer.is_empty() {
            match &self.default_address {
                Some(addr) => addr.clone(),
                None => {
                    writeln!(self.out, "No address given; returning to menu.")?;
                    return Ok(());
                }
            }
        } else {
            answer
        };

        writeln!(self.out, "Applying profile '{name}' to {address}...")?;
        match self.transport.apply_settings(&address, &settings) {
            Ok(()) => {
                writeln!(self.out, "Settings applied.")?;
                if self.confirm("Restart the device to pick up the new settings? [y/N]: ")? {
                    match self.transport.restart(&address) {
                        Ok(()) => writeln!(self.out, "Device is restarting.")?,
                        Err(e) => writeln!(self.out, "Restart failed: {e}")?,
                    }
                }
            }
            Err(e) => writeln!(self.out, "Could not apply settings: {e}")?,
        }
        Ok(())
    }

    /// D: delete the selected profile's record after confirmation and clear
    /// the selection.
    fn handle_delete(&mut self) -> io::Result<()> {
        let Some(name) = self.selected.as_ref().map(|p| p.name().to_string()) else {
            return self.nothing_selected();
        };

        if !self.confirm(&format!("Delete profile '{name}'? [y/N]: "))? {
            writeln!(self.out, "Kept profile '{name}'.")?;
            return Ok(());
        }

        match self.store.delete(&name) {
            Ok(()) => {
                self.selected = None;
                writeln!(self.out, "Profile '{name}' deleted.")?;
            }
            Err(e) if e.is_not_found() => {
                // Record already gone; drop the stale selection anyway.
                self.selected = None;
                writeln!(
                    self.out,
                    "Profile '{name}' had no saved record; selection cleared."
                )?;
            }
            Err(e) => writeln!(self.out, "Could not delete profile: {e}")?,
        }
        Ok(())
    }

    /// S: render the selected profile's current field values.
    fn handle_show(&mut self) -> io::Result<()> {
        let Some(profile) = self.selected.clone() else {
            return self.nothing_selected();
        };
        writeln!(self.out, "Profile '{}':", profile.name())?;
        writeln!(self.out, "  name         {}", profile.name())?;
        writeln!(self.out, "  hostname     {}", profile.hostname())?;
        writeln!(self.out, "  frequency    {} MHz", profile.frequency())?;
        writeln!(self.out, "  coreVoltage  {} mV", profile.core_voltage())?;
        writeln!(self.out, "  fanspeed     {} %", profile.fanspeed())?;
        Ok(())
    }

    fn nothing_selected(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "No profile selected. Create one with [N] or load one from [L]."
        )?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Rendering and prompting
    // -------------------------------------------------------------------

    fn render_menu(&mut self) -> io::Result<()> {
        let selected = self
            .selected
            .as_ref()
            .map(Profile::name)
            .unwrap_or("(none)");
        writeln!(self.out)?;
        writeln!(
            self.out,
            "=== {} v{} ===",
            constants::APP_NAME,
            constants::APP_VERSION
        )?;
        writeln!(self.out, "Selected profile: {selected}")?;
        writeln!(self.out, "  [L] List saved profiles")?;
        writeln!(self.out, "  [N] New profile")?;
        writeln!(self.out, "  [U] Update the selected profile")?;
        writeln!(self.out, "  [R] Run the selected profile on a device")?;
        writeln!(self.out, "  [D] Delete the selected profile")?;
        writeln!(self.out, "  [S] Show the selected profile")?;
        writeln!(self.out, "  [M] Show this menu")?;
        writeln!(self.out, "  [Q] Quit")?;
        Ok(())
    }

    /// Print a prompt and read one trimmed line. `None` means end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Yes/no confirmation; anything but y/yes (or end of input) is "no".
    fn confirm(&mut self, label: &str) -> io::Result<bool> {
        let answer = self.prompt(label)?;
        Ok(matches!(
            answer.as_deref(),
            Some(a) if a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes")
        ))
    }

    /// Creation prompt for a free-text field; the cancel token (or end of
    /// input) aborts. Empty input takes the prefill default when there is
    /// one.
    fn create_field(&mut self, label: &str, default: Option<&str>) -> io::Result<Entry<String>> {
        match self.prompt(label)? {
            None => Ok(Entry::Cancelled),
            Some(v) if v == constants::CANCEL_TOKEN => Ok(Entry::Cancelled),
            Some(v) if v.is_empty() => match default {
                Some(d) => Ok(Entry::Value(d.to_string())),
                None => Ok(Entry::Value(v)),
            },
            Some(v) => Ok(Entry::Value(v)),
        }
    }

    /// Creation prompt for an integer field; re-asks until the input parses.
    /// Empty input takes the prefill default when there is one.
    fn create_number(&mut self, label: &str, default: Option<u32>) -> io::Result<Entry<u32>> {
        loop {
            match self.prompt(label)? {
                None => return Ok(Entry::Cancelled),
                Some(v) if v == constants::CANCEL_TOKEN => return Ok(Entry::Cancelled),
                Some(v) if v.is_empty() => {
                    if let Some(d) = default {
                        return Ok(Entry::Value(d));
                    }
                    writeln!(self.out, "Enter a whole number (e.g. 550).")?;
                }
                Some(v) => match v.parse::<u32>() {
                    Ok(n) => return Ok(Entry::Value(n)),
                    Err(_) => {
                        writeln!(self.out, "Enter a whole number (e.g. 550).")?;
                    }
                },
            }
        }
    }

    /// Update prompt for a free-text field; empty input (or end of input)
    /// keeps the current value.
    fn update_field(&mut self, label: &str) -> io::Result<Option<String>> {
        match self.prompt(label)? {
            None => Ok(None),
            Some(v) if v.is_empty() => Ok(None),
            Some(v) => Ok(Some(v)),
        }
    }

    /// Update prompt for an integer field; empty keeps, bad input re-asks.
    fn update_number(&mut self, label: &str) -> io::Result<Option<u32>> {
        loop {
            match self.update_field(label)? {
                None => return Ok(None),
                Some(v) => match v.parse::<u32>() {
                    Ok(n) => return Ok(Some(n)),
                    Err(_) => {
                        writeln!(self.out, "Enter a whole number, or press Enter to keep.")?;
                    }
                },
            }
        }
    }
}

/// Prompt label for a numeric creation field, showing the prefill default
/// when there is one.
fn number_label(field: &str, default: Option<u32>) -> String {
    match default {
        Some(d) => format!("{field} [{d}]: "),
        None => format!("{field}: "),
    }
}

// =============================================================================
// Tests
// =============================================================================
