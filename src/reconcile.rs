//! Projection of live device state onto the zone model.
//!
//! A pass fetches power status, terminals, volume information and playing content,
//! correlates them by output uri and returns a fresh [`DeviceSnapshot`]. Passes keep
//! no state, so they can be retried freely and different devices can be reconciled
//! concurrently.

use crate::client::DeviceApi;
use crate::error::ApiError;
use crate::source::source_index;
use crate::types::{
    ContentInfo, DeviceIdentity, DeviceSnapshot, PowerState, Terminal, VolumeInfo, ZoneSnapshot,
};

/// Run one reconciliation pass against a device
///
/// - If the power status cannot be fetched, no further calls are made and the
///   snapshot has no zones. An unreachable device reports [`PowerState::Unknown`],
///   any other failure [`PowerState::Off`].
/// - If any zone data fetch fails, the snapshot keeps the power state but has no
///   zones and `zones_complete` is false; partial data is never projected.
/// - A zone terminal without matching volume or content entries is skipped.
pub async fn reconcile<D>(identity: &DeviceIdentity, device: &D) -> DeviceSnapshot
where
    D: DeviceApi + ?Sized,
{
    let power_state = match device.get_power_status().await {
        Ok(status) => status.state(),
        Err(e) => {
            tracing::warn!("Power status of {} unavailable: {}", identity.id, e);
            let state = match e {
                ApiError::Unreachable(_) => PowerState::Unknown,
                _ => PowerState::Off,
            };
            return DeviceSnapshot::without_zones(identity.clone(), state);
        }
    };

    let terminals = device.get_terminals().await;
    let volumes = device.get_volume_info("").await;
    let contents = device.get_playing_content("").await;

    let (terminals, volumes, contents) = match (terminals, volumes, contents) {
        (Ok(terminals), Ok(volumes), Ok(contents)) => (terminals, volumes, contents),
        (terminals, volumes, contents) => {
            for e in [terminals.err(), volumes.err(), contents.err()]
                .into_iter()
                .flatten()
            {
                tracing::warn!("Zone data of {} unavailable: {}", identity.id, e);
            }
            return DeviceSnapshot::without_zones(identity.clone(), power_state);
        }
    };

    DeviceSnapshot {
        identity: identity.clone(),
        power_state,
        zones: project_zones(&terminals, &volumes, &contents),
        zones_complete: true,
    }
}

/// Build zone snapshots from a consistent set of device responses, in terminal order
pub fn project_zones(
    terminals: &[Terminal],
    volumes: &[VolumeInfo],
    contents: &[ContentInfo],
) -> Vec<ZoneSnapshot> {
    terminals
        .iter()
        .filter(|terminal| terminal.is_zone())
        .filter_map(|terminal| {
            let uri = terminal.uri.as_str();

            let Some(content) = contents.iter().find(|c| c.output == uri) else {
                tracing::warn!("No playing content reported for zone {}, skipping", uri);
                return None;
            };
            let Some(volume) = volumes.iter().find(|v| v.output == uri) else {
                tracing::warn!("No volume information reported for zone {}, skipping", uri);
                return None;
            };

            let source_index = source_index(&content.source);
            if source_index.is_none() {
                tracing::debug!("Zone {} reports unknown source {}", uri, content.source);
            }

            Some(ZoneSnapshot {
                uri: terminal.uri.clone(),
                active: terminal.is_active(),
                source_index,
                volume_percent: volume.percent(),
                muted: volume.is_muted(),
                min_volume: volume.min_volume,
                max_volume: volume.max_volume,
            })
        })
        .collect()
}
