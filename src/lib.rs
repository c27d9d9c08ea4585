//! Rust library for discovering and controlling ScalarWebAPI audio/video receivers
//!
//! This library provides an async API for finding receivers on the local network
//! and controlling their zones over the receivers' JSON-RPC interface. It supports:
//!
//! - Discovery via SSDP and UPnP device descriptors
//! - Power, zone activation, source selection, volume and mute control
//! - Stateless reconciliation of device state into per-zone snapshots
//! - Registration of receivers and zones with a host node registry
//!
//! # Quick Start
//!
//! ```no_run
//! use scalar_avr::{discover, ClientConfig, MemoryRegistry, Receiver};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Find receivers
//!     let devices = discover(Duration::from_secs(5)).await?;
//!
//!     let mut registry = MemoryRegistry::new();
//!     for identity in devices {
//!         println!("Found {} ({})", identity.display_name, identity.model);
//!
//!         let receiver = Receiver::new(identity, &ClientConfig::default())?;
//!         receiver.register_zones(&mut registry).await?;
//!
//!         // Read the current state
//!         let snapshot = receiver.poll().await;
//!         println!("Power: {:?}", snapshot.power_state);
//!         for zone in &snapshot.zones {
//!             println!("  {} at {}%", zone.uri, zone.volume_percent);
//!         }
//!
//!         // Control the receiver
//!         receiver.mute_all().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Direct Connection
//!
//! If you know a receiver's control URL, you can talk to it directly:
//!
//! ```no_run
//! use scalar_avr::{AvrClient, ClientConfig, DeviceApi, VolumeChange};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AvrClient::connect("http://192.168.1.20:10000/sony", "1.0", &ClientConfig::default())?;
//!     client.set_volume("extOutput:zone?zone=1", VolumeChange::Relative(2)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Discovery**: SSDP search and descriptor evaluation
//! - **Receiver**: Zone-level commands, polling and host registration
//! - **Reconcile**: Projection of device responses into snapshots
//! - **Client**: Typed JSON-RPC calls (`DeviceApi`)
//! - **Connection**: Low-level HTTP transport
//! - **Protocol**: JSON-RPC message structures
//! - **Types**: Domain types and data structures

mod client;
mod config;
mod connection;
mod description;
mod discovery;
mod error;
mod protocol;
mod receiver;
mod reconcile;
mod registry;
mod source;
mod ssdp;
mod types;

// Public exports
pub use client::{AvrClient, DeviceApi};
pub use config::{ClientConfig, DiscoveryConfig, SEARCH_TARGET};
pub use connection::Connection;
pub use description::{device_id_from_udn, DeviceDescription, ScalarApiInfo};
pub use discovery::{discover, Discovery};
pub use error::{ApiError, ApiResult, AvrError, Result};
pub use protocol::{ApiCall, Reply, Request, Response, Service, REQUEST_ID};
pub use receiver::Receiver;
pub use reconcile::{project_zones, reconcile};
pub use registry::{
    sanitize_address, sanitize_name, zone_address, zone_node_address, MemoryRegistry, NodeRegistry,
    ZoneNode, MAX_ADDRESS_LEN,
};
pub use source::{source_index, source_uri, SOURCE_URIS};
pub use ssdp::SsdpResponse;
pub use types::{
    native_volume, volume_percent, Activity, ContentInfo, DeviceIdentity, DeviceSnapshot,
    InterfaceInfo, MuteSetting, PowerCommand, PowerState, PowerStatus, SystemInfo, Terminal,
    TerminalKind, VolumeChange, VolumeInfo, ZoneSnapshot, ZONE_OUTPUT_META,
};
