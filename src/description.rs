//! UPnP device descriptor parsing.
//!
//! Receivers describe themselves with a standard UPnP device description plus a
//! vendor block:
//!
//! ```xml
//! <av:X_ScalarWebAPI_DeviceInfo xmlns:av="urn:schemas-sony-com:av">
//!   <av:X_ScalarWebAPI_Version>1.0</av:X_ScalarWebAPI_Version>
//!   <av:X_ScalarWebAPI_BaseURL>http://192.168.1.20:10000/sony</av:X_ScalarWebAPI_BaseURL>
//!   <av:X_ScalarWebAPI_ServiceList>
//!     <av:X_ScalarWebAPI_ServiceType>system</av:X_ScalarWebAPI_ServiceType>
//!     ...
//!   </av:X_ScalarWebAPI_ServiceList>
//! </av:X_ScalarWebAPI_DeviceInfo>
//! ```
//!
//! Elements are matched by local name so namespace prefixes do not matter.

use crate::error::{AvrError, Result};
use crate::protocol::Service;
use crate::types::DeviceIdentity;
use quick_xml::events::Event;
use quick_xml::Reader;

const DEVICE_INFO: &str = "X_ScalarWebAPI_DeviceInfo";
const SERVICE_LIST: &str = "X_ScalarWebAPI_ServiceList";

/// Vendor extension block of a device descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarApiInfo {
    pub version: Option<String>,
    pub base_url: Option<String>,
    pub services: Vec<String>,
}

impl ScalarApiInfo {
    /// Whether every service family needed for control is advertised
    pub fn supports_required_services(&self) -> bool {
        Service::REQUIRED
            .iter()
            .all(|required| self.services.iter().any(|s| s == required.as_str()))
    }
}

/// Fields of a device descriptor relevant to discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescription {
    pub udn: Option<String>,
    pub friendly_name: Option<String>,
    pub model_name: Option<String>,

    /// `None` when the descriptor has no vendor block, i.e. the device is not controllable
    pub scalar_api: Option<ScalarApiInfo>,
}

impl DeviceDescription {
    /// Parse a device descriptor document
    ///
    /// Only the first occurrence of each field counts, which is the root device's.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut description = DeviceDescription::default();
        let mut path: Vec<String> = Vec::new();
        let mut info: Option<ScalarApiInfo> = None;
        let mut info_done = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if name == DEVICE_INFO && !info_done {
                        info = Some(ScalarApiInfo::default());
                    }
                    path.push(name);
                }
                Event::End(_) => {
                    if path.pop().as_deref() == Some(DEVICE_INFO) && !info_done {
                        description.scalar_api = info.take();
                        info_done = true;
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape()?.trim().to_string();
                    description.record(&path, text, info.as_mut());
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).trim().to_string();
                    description.record(&path, text, info.as_mut());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !path.is_empty() {
            return Err(AvrError::InvalidDescriptor(format!(
                "document ended inside <{}>",
                path.join("/")
            )));
        }

        Ok(description)
    }

    fn record(&mut self, path: &[String], text: String, info: Option<&mut ScalarApiInfo>) {
        if text.is_empty() {
            return;
        }
        let Some(element) = path.last() else {
            return;
        };

        if let Some(info) = info {
            match element.as_str() {
                "X_ScalarWebAPI_Version" if info.version.is_none() => info.version = Some(text),
                "X_ScalarWebAPI_BaseURL" if info.base_url.is_none() => info.base_url = Some(text),
                "X_ScalarWebAPI_ServiceType"
                    if path.len() >= 2 && path[path.len() - 2] == SERVICE_LIST =>
                {
                    info.services.push(text)
                }
                _ => {}
            }
            return;
        }

        match element.as_str() {
            "UDN" if self.udn.is_none() => self.udn = Some(text),
            "friendlyName" if self.friendly_name.is_none() => self.friendly_name = Some(text),
            "modelName" if self.model_name.is_none() => self.model_name = Some(text),
            _ => {}
        }
    }

    /// Whether this is a receiver we can control
    pub fn is_controllable(&self) -> bool {
        self.scalar_api
            .as_ref()
            .is_some_and(ScalarApiInfo::supports_required_services)
    }

    /// Build the device identity, failing if a required field is missing
    pub fn to_identity(&self) -> Result<DeviceIdentity> {
        let info = self
            .scalar_api
            .as_ref()
            .ok_or_else(|| missing("X_ScalarWebAPI_DeviceInfo"))?;
        let udn = self.udn.as_deref().ok_or_else(|| missing("UDN"))?;
        let id = device_id_from_udn(udn)
            .ok_or_else(|| AvrError::InvalidDescriptor(format!("malformed UDN {}", udn)))?;

        Ok(DeviceIdentity {
            id,
            display_name: self
                .friendly_name
                .clone()
                .ok_or_else(|| missing("friendlyName"))?,
            model: self.model_name.clone().ok_or_else(|| missing("modelName"))?,
            api_version: info
                .version
                .clone()
                .ok_or_else(|| missing("X_ScalarWebAPI_Version"))?,
            base_url: info
                .base_url
                .clone()
                .ok_or_else(|| missing("X_ScalarWebAPI_BaseURL"))?,
        })
    }
}

fn missing(field: &str) -> AvrError {
    AvrError::InvalidDescriptor(format!("missing {}", field))
}

/// Short device id: the last 6 hex characters of the UDN
///
/// `uuid:5f9ec1b3-ed59-1900-4530-d8d43c4e2a2e` becomes `4e2a2e`. The UDN must carry
/// a well-formed UUID; anything else yields `None`.
pub fn device_id_from_udn(udn: &str) -> Option<String> {
    let udn = udn.trim();
    let raw = udn
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("uuid:"))
        .map_or(udn, |_| &udn[5..]);

    let uuid = match uuid::Uuid::parse_str(raw) {
        Ok(uuid) => uuid,
        Err(e) => {
            tracing::debug!("UDN {} is not a UUID: {}", udn, e);
            return None;
        }
    };

    let simple = uuid.simple().to_string();
    Some(simple[simple.len() - 6..].to_string())
}
