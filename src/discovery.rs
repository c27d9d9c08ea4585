use crate::config::DiscoveryConfig;
use crate::description::DeviceDescription;
use crate::error::Result;
use crate::ssdp;
use crate::types::DeviceIdentity;
use futures_util::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Discovery of controllable receivers on the local network
///
/// A discovery pass sends an SSDP search, fetches the descriptor of every responder
/// and keeps the devices that advertise the `system`, `audio` and `avContent`
/// services. A responder that cannot be fetched or parsed is logged and skipped;
/// it never aborts the pass.
///
/// # Example
///
/// ```no_run
/// use scalar_avr::Discovery;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let discovery = Discovery::new()?;
///     for device in discovery.discover().await? {
///         println!("Found {} ({}) at {}", device.display_name, device.model, device.base_url);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Discovery {
    config: DiscoveryConfig,
    http: reqwest::Client,
}

impl Discovery {
    /// Create a discovery manager with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DiscoveryConfig::default())
    }

    /// Create a discovery manager with custom settings
    pub fn with_config(config: DiscoveryConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Get the discovery settings
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Run one discovery pass
    ///
    /// Devices are unique by id. Repeated locations are fetched once, and when
    /// several distinct locations describe the same device the last of them in
    /// response order wins. Callers should treat the result as a set.
    pub async fn discover(&self) -> Result<Vec<DeviceIdentity>> {
        let responses = ssdp::search(&self.config).await?;
        tracing::debug!("SSDP discovery returned {} response(s)", responses.len());

        let devices = self
            .identify(responses.into_iter().map(|response| response.location))
            .await;

        tracing::info!("Discovered {} receiver(s)", devices.len());
        Ok(devices)
    }

    /// Fetch and evaluate the descriptors at the given locations
    ///
    /// Locations are deduplicated before fetching, keeping their first position;
    /// among distinct locations that describe the same device id, the last wins.
    pub async fn identify<I>(&self, locations: I) -> Vec<DeviceIdentity>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<String> = locations
            .into_iter()
            .filter(|location| seen.insert(location.clone()))
            .collect();

        // `buffered` keeps input order, so the last distinct location wins
        let found: Vec<Option<DeviceIdentity>> = stream::iter(unique)
            .map(|location| async move { self.identify_one(&location).await })
            .buffered(self.config.fetch_concurrency)
            .collect()
            .await;

        let mut devices = BTreeMap::new();
        for identity in found.into_iter().flatten() {
            if let Some(previous) = devices.insert(identity.id.clone(), identity) {
                tracing::debug!("Device {} answered more than once", previous.id);
            }
        }

        devices.into_values().collect()
    }

    async fn identify_one(&self, location: &str) -> Option<DeviceIdentity> {
        let xml = match self.fetch_descriptor(location).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!("Failed to fetch device descriptor from {}: {}", location, e);
                return None;
            }
        };

        let description = match DeviceDescription::from_xml(&xml) {
            Ok(description) => description,
            Err(e) => {
                tracing::warn!("Unparseable device descriptor at {}: {}", location, e);
                return None;
            }
        };

        let Some(info) = description.scalar_api.as_ref() else {
            tracing::debug!("{} has no ScalarWebAPI device info, skipping", location);
            return None;
        };

        if !info.supports_required_services() {
            tracing::debug!(
                "{} lacks required services (advertises {:?}), skipping",
                location,
                info.services
            );
            return None;
        }

        match description.to_identity() {
            Ok(identity) => {
                tracing::debug!(
                    "Receiver found - ID: {}, Name: {}, Model: {}",
                    identity.id,
                    identity.display_name,
                    identity.model
                );
                Some(identity)
            }
            Err(e) => {
                tracing::warn!("Skipping device at {}: {}", location, e);
                None
            }
        }
    }

    async fn fetch_descriptor(&self, location: &str) -> Result<String> {
        let response = self.http.get(location).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Run one discovery pass with default settings and the given timeout
pub async fn discover(timeout: Duration) -> Result<Vec<DeviceIdentity>> {
    Discovery::with_config(DiscoveryConfig::default().with_timeout(timeout))?
        .discover()
        .await
}
