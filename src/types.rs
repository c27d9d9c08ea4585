use serde::{Deserialize, Serialize};
use std::fmt;

/// Meta tag of terminals that represent controllable zones
pub const ZONE_OUTPUT_META: &str = "meta:zone:output";

/// Identity of a discovered receiver
///
/// Two identities with the same `id` refer to the same physical device,
/// even if the display name changed in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Last 6 hex characters of the device's UPnP unique device name
    pub id: String,
    pub display_name: String,
    pub model: String,
    pub api_version: String,
    /// Base control URL, e.g. `http://192.168.1.20:10000/sony`
    pub base_url: String,
}

/// Whether a terminal is an input or an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Input,
    Output,
}

/// Input or output endpoint reported by `getCurrentExternalTerminalsStatus`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terminal {
    pub uri: String,

    #[serde(default)]
    pub title: String,

    /// Classification tag, e.g. `meta:zone:output`
    #[serde(default)]
    pub meta: String,

    /// `active` or `inactive`
    #[serde(default)]
    pub active: String,

    #[serde(default)]
    pub connection: Option<String>,
}

impl Terminal {
    /// Inferred from the uri: `extOutput:` terminals are outputs, everything else an input
    pub fn kind(&self) -> TerminalKind {
        if self.uri.starts_with("extOutput:") {
            TerminalKind::Output
        } else {
            TerminalKind::Input
        }
    }

    /// Whether this terminal is a controllable zone
    pub fn is_zone(&self) -> bool {
        self.meta == ZONE_OUTPUT_META
    }

    pub fn is_active(&self) -> bool {
        self.active == "active"
    }
}

/// Volume state of one output, in device-native units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub output: String,
    pub volume: i32,
    pub min_volume: i32,
    pub max_volume: i32,

    /// `on` or `off`
    #[serde(default)]
    pub mute: String,

    #[serde(default)]
    pub step: Option<i32>,
}

impl VolumeInfo {
    pub fn is_muted(&self) -> bool {
        self.mute == "on"
    }

    /// Volume as a percentage of the output's range
    pub fn percent(&self) -> u8 {
        volume_percent(self.volume, self.min_volume, self.max_volume)
    }
}

/// Content currently selected on one output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentInfo {
    #[serde(default)]
    pub output: String,

    /// Input uri of the selected source
    #[serde(rename = "uri", default)]
    pub source: String,
}

/// Raw power status as reported by the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerStatus {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub standby_detail: Option<String>,
}

impl PowerStatus {
    pub fn state(&self) -> PowerState {
        PowerState::from_status(self.status.as_deref().unwrap_or_default())
    }
}

/// Receiver power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    Off,
    Standby,
    On,
    /// The device did not answer
    Unknown,
}

impl PowerState {
    /// Map a device status string; anything unrecognized is treated as off
    pub fn from_status(status: &str) -> Self {
        match status {
            "active" | "activating" => PowerState::On,
            "standby" => PowerState::Standby,
            _ => PowerState::Off,
        }
    }
}

/// Result of `getSystemInformation`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(default)]
    pub mac_addr: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(rename = "deviceID", default)]
    pub device_id: Option<String>,
}

/// Result of `getInterfaceInformation`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceInfo {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub interface_version: Option<String>,
    #[serde(default)]
    pub server_name: Option<String>,
}

/// Target state for `setActiveTerminal`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Active,
    Inactive,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Active => "active",
            Activity::Inactive => "inactive",
        }
    }
}

/// Argument for `setAudioMute`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteSetting {
    On,
    Off,
    Toggle,
}

impl MuteSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            MuteSetting::On => "on",
            MuteSetting::Off => "off",
            MuteSetting::Toggle => "toggle",
        }
    }
}

impl From<bool> for MuteSetting {
    fn from(muted: bool) -> Self {
        if muted {
            MuteSetting::On
        } else {
            MuteSetting::Off
        }
    }
}

/// Argument for `setPowerStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCommand {
    Active,
    Standby,
    Off,
    /// Same as pressing the power key on the remote
    Toggle,
}

impl PowerCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerCommand::Active => "active",
            PowerCommand::Standby => "standby",
            PowerCommand::Off => "off",
            PowerCommand::Toggle => "",
        }
    }
}

/// Argument for `setAudioVolume`, in device-native units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeChange {
    Absolute(i32),
    Relative(i32),
}

impl fmt::Display for VolumeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeChange::Absolute(volume) => write!(f, "{}", volume),
            VolumeChange::Relative(delta) => write!(f, "{:+}", delta),
        }
    }
}

/// Derived state of one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub uri: String,
    pub active: bool,

    /// Position in the source catalog; `None` when the device reported an unknown source
    pub source_index: Option<usize>,

    /// Volume as 0-100 of the zone's native range
    pub volume_percent: u8,
    pub muted: bool,

    pub min_volume: i32,
    pub max_volume: i32,
}

impl ZoneSnapshot {
    /// Native volume for a percentage of this zone's range
    pub fn native_volume(&self, percent: u8) -> i32 {
        native_volume(percent, self.min_volume, self.max_volume)
    }
}

/// Output of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub identity: DeviceIdentity,
    pub power_state: PowerState,
    pub zones: Vec<ZoneSnapshot>,

    /// False when zone data could not be fetched this pass; prior zone state should be kept
    pub zones_complete: bool,
}

impl DeviceSnapshot {
    /// Snapshot carrying only a power state
    pub fn without_zones(identity: DeviceIdentity, power_state: PowerState) -> Self {
        Self {
            identity,
            power_state,
            zones: Vec::new(),
            zones_complete: false,
        }
    }

    /// Find a zone by terminal uri
    pub fn zone(&self, uri: &str) -> Option<&ZoneSnapshot> {
        self.zones.iter().find(|zone| zone.uri == uri)
    }
}

/// Volume as a rounded percentage of `[min, max]`, clamped to 0-100
///
/// A degenerate range (`min >= max`) yields 0.
pub fn volume_percent(volume: i32, min: i32, max: i32) -> u8 {
    if max <= min {
        return 0;
    }
    let span = f64::from(max) - f64::from(min);
    let percent = (f64::from(volume) - f64::from(min)) / span * 100.0;
    percent.round().clamp(0.0, 100.0) as u8
}

/// Native volume for a percentage of `[min, max]`, truncated toward zero
pub fn native_volume(percent: u8, min: i32, max: i32) -> i32 {
    let percent = f64::from(percent.min(100));
    let span = f64::from(max) - f64::from(min);
    (percent / 100.0 * span + f64::from(min)) as i32
}
