//! Reconciliation tests against a scripted device

use async_trait::async_trait;
use rstest::rstest;
use scalar_avr::{
    reconcile, Activity, ApiError, ApiResult, ContentInfo, DeviceApi, DeviceIdentity,
    MuteSetting, PowerCommand, PowerState, PowerStatus, Terminal, VolumeChange, VolumeInfo,
    ZoneSnapshot, SOURCE_URIS,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Device stub answering from fixed responses and counting every call
struct ScriptedDevice {
    power: ApiResult<PowerStatus>,
    terminals: ApiResult<Vec<Terminal>>,
    volumes: ApiResult<Vec<VolumeInfo>>,
    contents: ApiResult<Vec<ContentInfo>>,
    calls: AtomicUsize,
}

impl ScriptedDevice {
    fn new() -> Self {
        Self {
            power: Ok(power("active")),
            terminals: Ok(Vec::new()),
            volumes: Ok(Vec::new()),
            contents: Ok(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record<T: Clone>(&self, response: &ApiResult<T>) -> ApiResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        response.clone()
    }
}

#[async_trait]
impl DeviceApi for ScriptedDevice {
    async fn get_power_status(&self) -> ApiResult<PowerStatus> {
        self.record(&self.power)
    }

    async fn get_terminals(&self) -> ApiResult<Vec<Terminal>> {
        self.record(&self.terminals)
    }

    async fn get_volume_info(&self, _output: &str) -> ApiResult<Vec<VolumeInfo>> {
        self.record(&self.volumes)
    }

    async fn get_playing_content(&self, _output: &str) -> ApiResult<Vec<ContentInfo>> {
        self.record(&self.contents)
    }

    async fn set_active_terminal(&self, _uri: &str, _activity: Activity) -> ApiResult<()> {
        unreachable!("reconciliation never sends commands")
    }

    async fn set_play_content(&self, _output: &str, _uri: &str) -> ApiResult<()> {
        unreachable!("reconciliation never sends commands")
    }

    async fn set_volume(&self, _output: &str, _change: VolumeChange) -> ApiResult<()> {
        unreachable!("reconciliation never sends commands")
    }

    async fn set_mute(&self, _output: &str, _mute: MuteSetting) -> ApiResult<()> {
        unreachable!("reconciliation never sends commands")
    }

    async fn set_power(&self, _command: PowerCommand) -> ApiResult<()> {
        unreachable!("reconciliation never sends commands")
    }
}

fn identity() -> DeviceIdentity {
    DeviceIdentity {
        id: "4e2a2e".to_string(),
        display_name: "Living Room".to_string(),
        model: "STR-DN1080".to_string(),
        api_version: "1.0".to_string(),
        base_url: "http://192.168.1.20:10000/sony".to_string(),
    }
}

fn power(status: &str) -> PowerStatus {
    PowerStatus {
        status: Some(status.to_string()),
        standby_detail: None,
    }
}

fn zone_terminal(uri: &str, active: bool) -> Terminal {
    Terminal {
        uri: uri.to_string(),
        title: "Zone".to_string(),
        meta: "meta:zone:output".to_string(),
        active: if active { "active" } else { "inactive" }.to_string(),
        connection: None,
    }
}

fn volume(output: &str, volume: i32, min: i32, max: i32, mute: &str) -> VolumeInfo {
    VolumeInfo {
        output: output.to_string(),
        volume,
        min_volume: min,
        max_volume: max,
        mute: mute.to_string(),
        step: Some(1),
    }
}

fn content(output: &str, source: &str) -> ContentInfo {
    ContentInfo {
        output: output.to_string(),
        source: source.to_string(),
    }
}

#[tokio::test]
async fn test_single_zone_scenario() {
    let device = ScriptedDevice {
        terminals: Ok(vec![zone_terminal("out1", true)]),
        volumes: Ok(vec![volume("out1", 50, 0, 100, "off")]),
        contents: Ok(vec![content("out1", SOURCE_URIS[0])]),
        ..ScriptedDevice::new()
    };

    let snapshot = reconcile(&identity(), &device).await;

    assert_eq!(snapshot.identity, identity());
    assert_eq!(snapshot.power_state, PowerState::On);
    assert!(snapshot.zones_complete);
    assert_eq!(
        snapshot.zones,
        vec![ZoneSnapshot {
            uri: "out1".to_string(),
            active: true,
            source_index: Some(0),
            volume_percent: 50,
            muted: false,
            min_volume: 0,
            max_volume: 100,
        }]
    );
    assert_eq!(device.calls(), 4);
}

#[rstest]
#[case(ApiError::Unreachable("timed out".to_string()), PowerState::Unknown)]
#[case(ApiError::Rejected { code: 12, message: "No Such Method".to_string() }, PowerState::Off)]
#[case(ApiError::InvalidResponse("garbage".to_string()), PowerState::Off)]
#[tokio::test]
async fn test_power_failure_stops_the_pass(#[case] error: ApiError, #[case] expected: PowerState) {
    let device = ScriptedDevice {
        power: Err(error),
        terminals: Ok(vec![zone_terminal("out1", true)]),
        volumes: Ok(vec![volume("out1", 50, 0, 100, "off")]),
        contents: Ok(vec![content("out1", SOURCE_URIS[0])]),
        ..ScriptedDevice::new()
    };

    let snapshot = reconcile(&identity(), &device).await;

    assert_eq!(snapshot.power_state, expected);
    assert!(snapshot.zones.is_empty());
    assert!(!snapshot.zones_complete);
    assert_eq!(device.calls(), 1, "no zone data is fetched after a power failure");
}

#[rstest]
#[case::terminals(true, false, false)]
#[case::volumes(false, true, false)]
#[case::contents(false, false, true)]
#[tokio::test]
async fn test_partial_zone_data_is_not_projected(
    #[case] fail_terminals: bool,
    #[case] fail_volumes: bool,
    #[case] fail_contents: bool,
) {
    let failure = || ApiError::Unreachable("connection reset".to_string());
    let mut device = ScriptedDevice {
        power: Ok(power("standby")),
        terminals: Ok(vec![zone_terminal("out1", true)]),
        volumes: Ok(vec![volume("out1", 50, 0, 100, "off")]),
        contents: Ok(vec![content("out1", SOURCE_URIS[0])]),
        ..ScriptedDevice::new()
    };
    if fail_terminals {
        device.terminals = Err(failure());
    }
    if fail_volumes {
        device.volumes = Err(failure());
    }
    if fail_contents {
        device.contents = Err(failure());
    }

    let snapshot = reconcile(&identity(), &device).await;

    assert_eq!(snapshot.power_state, PowerState::Standby);
    assert!(snapshot.zones.is_empty());
    assert!(!snapshot.zones_complete);
}

#[tokio::test]
async fn test_zone_without_content_is_skipped() {
    let device = ScriptedDevice {
        terminals: Ok(vec![zone_terminal("zoneA", true), zone_terminal("zoneB", false)]),
        volumes: Ok(vec![
            volume("zoneA", 20, 0, 40, "on"),
            volume("zoneB", 10, 0, 40, "off"),
        ]),
        contents: Ok(vec![content("zoneA", "extInput:tv")]),
        ..ScriptedDevice::new()
    };

    let snapshot = reconcile(&identity(), &device).await;

    assert!(snapshot.zones_complete);
    assert_eq!(snapshot.zones.len(), 1);
    let zone = snapshot.zone("zoneA").expect("zoneA is reported");
    assert_eq!(zone.volume_percent, 50);
    assert!(zone.muted);
    assert!(snapshot.zone("zoneB").is_none());
}

#[tokio::test]
async fn test_unknown_source_has_no_index() {
    let device = ScriptedDevice {
        terminals: Ok(vec![zone_terminal("out1", false)]),
        volumes: Ok(vec![volume("out1", 0, 0, 74, "off")]),
        contents: Ok(vec![content("out1", "extInput:hdmi?port=3")]),
        ..ScriptedDevice::new()
    };

    let snapshot = reconcile(&identity(), &device).await;

    assert_eq!(snapshot.zones.len(), 1);
    assert_eq!(snapshot.zones[0].source_index, None);
    assert!(!snapshot.zones[0].active);
}

#[tokio::test]
async fn test_degenerate_volume_range_is_zero_percent() {
    let device = ScriptedDevice {
        terminals: Ok(vec![zone_terminal("out1", true)]),
        volumes: Ok(vec![volume("out1", 7, 7, 7, "off")]),
        contents: Ok(vec![content("out1", "extInput:game")]),
        ..ScriptedDevice::new()
    };

    let snapshot = reconcile(&identity(), &device).await;

    assert_eq!(snapshot.zones[0].volume_percent, 0);
    assert_eq!(snapshot.zones[0].source_index, Some(3));
}

#[tokio::test]
async fn test_non_zone_terminals_are_ignored() {
    let mut input = zone_terminal("extInput:hdmi?port=1", true);
    input.meta = "meta:bd".to_string();

    let device = ScriptedDevice {
        terminals: Ok(vec![input, zone_terminal("out1", true)]),
        volumes: Ok(vec![volume("out1", 50, 0, 100, "off")]),
        contents: Ok(vec![
            content("extInput:hdmi?port=1", "extInput:bd-dvd"),
            content("out1", "extInput:bd-dvd"),
        ]),
        ..ScriptedDevice::new()
    };

    let snapshot = reconcile(&identity(), &device).await;

    assert_eq!(snapshot.zones.len(), 1);
    assert_eq!(snapshot.zones[0].uri, "out1");
    assert_eq!(snapshot.zones[0].source_index, Some(1));
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let device = ScriptedDevice {
        terminals: Ok(vec![zone_terminal("out1", true), zone_terminal("out2", false)]),
        volumes: Ok(vec![
            volume("out1", 33, 0, 74, "off"),
            volume("out2", -40, -80, 0, "on"),
        ]),
        contents: Ok(vec![content("out1", "radio:fm"), content("out2", "dlna:music")]),
        ..ScriptedDevice::new()
    };

    let first = reconcile(&identity(), &device).await;
    let second = reconcile(&identity(), &device).await;

    assert_eq!(first, second);
    assert_eq!(first.zones[1].volume_percent, 50);
    assert_eq!(first.zones[1].source_index, Some(10));
    assert_eq!(device.calls(), 8);
}
