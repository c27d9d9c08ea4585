use crate::client::{AvrClient, DeviceApi};
use crate::config::ClientConfig;
use crate::error::{ApiResult, AvrError, Result};
use crate::reconcile::reconcile;
use crate::registry::{sanitize_address, sanitize_name, zone_node_address, NodeRegistry};
use crate::source::source_uri;
use crate::types::{
    Activity, DeviceIdentity, DeviceSnapshot, MuteSetting, PowerCommand, VolumeChange,
    ZoneSnapshot,
};
use futures_util::future::join_all;
use std::collections::HashSet;

/// Handle for one receiver and its zones
///
/// A `Receiver` pairs a device identity with a client. It offers the zone-level
/// commands a host exposes and polls the device into [`DeviceSnapshot`]s. It holds
/// no cached device state; every snapshot is built fresh.
///
/// # Example
///
/// ```no_run
/// use scalar_avr::{discover, ClientConfig, Receiver};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     for identity in discover(Duration::from_secs(5)).await? {
///         let receiver = Receiver::new(identity, &ClientConfig::default())?;
///         let snapshot = receiver.poll().await;
///         for zone in &snapshot.zones {
///             receiver.set_zone_volume(zone, 30).await?;
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Receiver {
    identity: DeviceIdentity,
    client: AvrClient,
}

impl Receiver {
    /// Create a handle for a discovered receiver
    pub fn new(identity: DeviceIdentity, config: &ClientConfig) -> Result<Self> {
        let client = AvrClient::connect(
            identity.base_url.clone(),
            identity.api_version.clone(),
            config,
        )?;
        Ok(Self { identity, client })
    }

    /// Restore a handle from a blob written by [`Receiver::to_blob`]
    pub fn from_blob(blob: &str, config: &ClientConfig) -> Result<Self> {
        let identity: DeviceIdentity = serde_json::from_str(blob)?;
        Self::new(identity, config)
    }

    /// Serialize the receiver identity for host storage
    pub fn to_blob(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.identity)?)
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn client(&self) -> &AvrClient {
        &self.client
    }

    /// Host node address of the receiver
    pub fn address(&self) -> String {
        sanitize_address(&self.identity.id)
    }

    /// Run one reconciliation pass
    pub async fn poll(&self) -> DeviceSnapshot {
        reconcile(&self.identity, &self.client).await
    }

    /// Create a host node for every zone of the receiver
    ///
    /// Each zone node stores its terminal uri, and the receiver node stores the
    /// receiver blob, so both can be rebuilt without discovery. A zone whose node
    /// address is already taken by another zone of this receiver is skipped.
    pub async fn register_zones<R>(&self, registry: &mut R) -> Result<Vec<R::Zone>>
    where
        R: NodeRegistry,
    {
        let terminals = self.client.get_terminals().await?;
        registry.persist(&self.address(), &self.to_blob()?);

        let mut taken = HashSet::new();
        let mut zones = Vec::new();
        for terminal in terminals.iter().filter(|terminal| terminal.is_zone()) {
            let address = zone_node_address(&self.identity.id, &terminal.uri);
            if !taken.insert(address.clone()) {
                tracing::warn!(
                    "Zone {} maps to node address {} of another zone, skipping",
                    terminal.uri,
                    address
                );
                continue;
            }

            let name = sanitize_name(&format!("{} - {}", self.identity.model, terminal.title));
            zones.push(registry.lookup_or_create_zone(&address, &name));
            registry.persist(&address, &terminal.uri);
        }

        tracing::info!(
            "Registered {} zone(s) for {} ({})",
            zones.len(),
            self.identity.display_name,
            self.identity.id
        );
        Ok(zones)
    }

    /// Poll several receivers concurrently, returning snapshots in input order
    pub async fn poll_all(receivers: &[Receiver]) -> Vec<DeviceSnapshot> {
        join_all(receivers.iter().map(|receiver| receiver.poll())).await
    }

    /// Turn a zone on
    pub async fn activate_zone(&self, uri: &str) -> ApiResult<()> {
        self.client
            .set_active_terminal(uri, Activity::Active)
            .await
            .inspect_err(|e| tracing::warn!("Failed to activate zone {}: {}", uri, e))
    }

    /// Turn a zone off
    pub async fn deactivate_zone(&self, uri: &str) -> ApiResult<()> {
        self.client
            .set_active_terminal(uri, Activity::Inactive)
            .await
            .inspect_err(|e| tracing::warn!("Failed to deactivate zone {}: {}", uri, e))
    }

    /// Select a zone's source by catalog position
    pub async fn select_source(&self, uri: &str, index: usize) -> Result<()> {
        let source = source_uri(index).ok_or(AvrError::InvalidSource(index))?;
        self.client
            .set_play_content(uri, source)
            .await
            .inspect_err(|e| tracing::warn!("Failed to select {} on zone {}: {}", source, uri, e))?;
        Ok(())
    }

    /// Set a zone's volume as a percentage of its native range
    pub async fn set_zone_volume(&self, zone: &ZoneSnapshot, percent: u8) -> ApiResult<()> {
        let volume = zone.native_volume(percent);
        self.client
            .set_volume(&zone.uri, VolumeChange::Absolute(volume))
            .await
            .inspect_err(|e| tracing::warn!("Failed to set volume of zone {}: {}", zone.uri, e))
    }

    pub async fn mute_zone(&self, uri: &str) -> ApiResult<()> {
        self.set_mute(uri, MuteSetting::On).await
    }

    pub async fn unmute_zone(&self, uri: &str) -> ApiResult<()> {
        self.set_mute(uri, MuteSetting::Off).await
    }

    /// Toggle a zone's mute state
    ///
    /// The device reports the previous state for a moment after toggling, so the
    /// new state is left to the next poll.
    pub async fn toggle_mute(&self, uri: &str) -> ApiResult<()> {
        self.set_mute(uri, MuteSetting::Toggle).await
    }

    /// Mute every output
    pub async fn mute_all(&self) -> ApiResult<()> {
        self.set_mute("", MuteSetting::On).await
    }

    /// Unmute every output
    pub async fn unmute_all(&self) -> ApiResult<()> {
        self.set_mute("", MuteSetting::Off).await
    }

    /// Change the receiver's power state
    pub async fn set_power(&self, command: PowerCommand) -> ApiResult<()> {
        self.client
            .set_power(command)
            .await
            .inspect_err(|e| tracing::warn!("Failed to set power of {}: {}", self.identity.id, e))
    }

    async fn set_mute(&self, uri: &str, mute: MuteSetting) -> ApiResult<()> {
        self.client.set_mute(uri, mute).await.inspect_err(|e| {
            tracing::warn!("Failed to set mute {} on {:?}: {}", mute.as_str(), uri, e)
        })
    }
}
