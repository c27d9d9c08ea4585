use scalar_avr::{discover, ClientConfig, MemoryRegistry, NodeRegistry, PowerState, Receiver};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let devices = discover(Duration::from_secs(5)).await?;
    if devices.is_empty() {
        tracing::info!("No receivers found");
        return Ok(());
    }

    let config = ClientConfig::default();
    let mut registry = MemoryRegistry::new();
    let mut receivers = Vec::new();

    for identity in devices {
        let receiver = Receiver::new(identity, &config)?;
        if let Err(e) = receiver.register_zones(&mut registry).await {
            tracing::warn!("Could not register zones of {}: {}", receiver.identity().id, e);
        }
        receivers.push(receiver);
    }

    for zone in registry.zones() {
        tracing::info!(
            "Zone {} ({}) -> {}",
            zone.name,
            zone.address,
            registry.load(&zone.address).unwrap_or_default()
        );
    }

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                for snapshot in Receiver::poll_all(&receivers).await {
                    let name = &snapshot.identity.display_name;
                    if snapshot.power_state == PowerState::Unknown {
                        tracing::warn!("{} is not responding", name);
                        continue;
                    }

                    tracing::info!("{}: {:?}", name, snapshot.power_state);
                    if !snapshot.zones_complete {
                        tracing::info!("{}: zone data unavailable this pass", name);
                    }
                    for zone in &snapshot.zones {
                        tracing::info!(
                            "  {} active={} source={:?} volume={}% muted={}",
                            zone.uri,
                            zone.active,
                            zone.source_index,
                            zone.volume_percent,
                            zone.muted
                        );
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
