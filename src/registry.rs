//! Host node registry.
//!
//! Home automation hosts keep a tree of nodes with short addresses and a small
//! key/value store for custom data. Receivers and zones are registered there so
//! they survive restarts without a new discovery pass.

use std::collections::BTreeMap;

/// Characters hosts do not accept in node names or addresses
const INVALID_CHARS: &[char] = &[
    '<', '>', '`', '~', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '{', '}', '[', ']',
    '?', '/', '\\', ';', ':', '"', '\'',
];

/// Longest node address hosts accept
pub const MAX_ADDRESS_LEN: usize = 14;

/// Storage for zone nodes and per-node custom data
pub trait NodeRegistry {
    /// Host-side handle of a zone node
    type Zone;

    /// Get the zone node at `address`, creating it with `name` if it does not exist
    fn lookup_or_create_zone(&mut self, address: &str, name: &str) -> Self::Zone;

    /// Store a custom data blob under `address`, replacing any previous one
    fn persist(&mut self, address: &str, blob: &str);

    /// Load the custom data blob stored under `address`
    fn load(&self, address: &str) -> Option<String>;
}

/// Zone node kept by [`MemoryRegistry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneNode {
    pub address: String,
    pub name: String,
}

/// In-process [`NodeRegistry`], for tests and hosts without persistence
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    zones: BTreeMap<String, ZoneNode>,
    data: BTreeMap<String, String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a zone node without creating it
    pub fn zone(&self, address: &str) -> Option<&ZoneNode> {
        self.zones.get(address)
    }

    /// All zone nodes, ordered by address
    pub fn zones(&self) -> impl Iterator<Item = &ZoneNode> {
        self.zones.values()
    }
}

impl NodeRegistry for MemoryRegistry {
    type Zone = ZoneNode;

    fn lookup_or_create_zone(&mut self, address: &str, name: &str) -> ZoneNode {
        self.zones
            .entry(address.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating zone node {} ({})", address, name);
                ZoneNode {
                    address: address.to_string(),
                    name: name.to_string(),
                }
            })
            .clone()
    }

    fn persist(&mut self, address: &str, blob: &str) {
        self.data.insert(address.to_string(), blob.to_string());
    }

    fn load(&self, address: &str) -> Option<String> {
        self.data.get(address).cloned()
    }
}

/// Node address of a zone: receiver id, `_`, then the zone query of the uri
///
/// `("4e2a2e", "extOutput:zone?zone=1")` becomes `4e2a2e_zone_1`. A uri without a
/// zone query is used whole.
pub fn zone_address(receiver_id: &str, uri: &str) -> String {
    let zone = uri
        .find("zone?")
        .map_or(uri, |pos| &uri[pos + "zone?".len()..]);
    format!("{}_{}", receiver_id, zone.replace('=', "_"))
}

/// Strip characters hosts reject in node names
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| !INVALID_CHARS.contains(c)).collect()
}

/// Host node address of a zone: [`zone_address`] without rejected characters, lowercased
///
/// Not truncated, so outputs whose uris share a long common prefix keep distinct
/// addresses.
pub fn zone_node_address(receiver_id: &str, uri: &str) -> String {
    sanitize_name(&zone_address(receiver_id, uri)).to_lowercase()
}

/// Strip rejected characters, truncate and lowercase a node address
pub fn sanitize_address(address: &str) -> String {
    sanitize_name(address)
        .chars()
        .take(MAX_ADDRESS_LEN)
        .collect::<String>()
        .to_lowercase()
}
