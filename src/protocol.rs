use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Request id sent with every call. The devices echo it back but do not care about its value.
pub const REQUEST_ID: u32 = 50;

/// JSON-RPC service family, which is also the last path segment of the endpoint URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "avContent")]
    AvContent,
}

impl Service {
    /// Service families a receiver must advertise to be controllable
    pub const REQUIRED: [Service; 3] = [Service::System, Service::Audio, Service::AvContent];

    /// Name used in URLs and in the device descriptor's service list
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::System => "system",
            Service::Audio => "audio",
            Service::AvContent => "avContent",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed service/method/version triplet of one API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiCall {
    pub service: Service,
    pub method: &'static str,
    pub version: &'static str,
}

impl ApiCall {
    const fn new(service: Service, method: &'static str, version: &'static str) -> Self {
        Self {
            service,
            method,
            version,
        }
    }

    pub const GET_SYSTEM_INFO: ApiCall = ApiCall::new(Service::System, "getSystemInformation", "1.4");
    pub const GET_INTERFACE_INFO: ApiCall =
        ApiCall::new(Service::System, "getInterfaceInformation", "1.0");
    pub const GET_POWER_STATUS: ApiCall = ApiCall::new(Service::System, "getPowerStatus", "1.1");
    pub const SET_POWER_STATUS: ApiCall = ApiCall::new(Service::System, "setPowerStatus", "1.1");
    pub const GET_TERMINAL_STATUS: ApiCall =
        ApiCall::new(Service::AvContent, "getCurrentExternalTerminalsStatus", "1.0");
    pub const GET_PLAYING_CONTENT_INFO: ApiCall =
        ApiCall::new(Service::AvContent, "getPlayingContentInfo", "1.2");
    pub const SET_ACTIVE_TERMINAL: ApiCall =
        ApiCall::new(Service::AvContent, "setActiveTerminal", "1.0");
    pub const SET_PLAY_CONTENT: ApiCall = ApiCall::new(Service::AvContent, "setPlayContent", "1.2");
    pub const GET_VOLUME_INFO: ApiCall = ApiCall::new(Service::Audio, "getVolumeInformation", "1.1");
    pub const SET_AUDIO_VOLUME: ApiCall = ApiCall::new(Service::Audio, "setAudioVolume", "1.1");
    pub const SET_AUDIO_MUTE: ApiCall = ApiCall::new(Service::Audio, "setAudioMute", "1.1");
}

/// JSON-RPC request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u32,
    pub method: String,
    pub params: Vec<Value>,
    pub version: String,
}

impl Request {
    /// Create a new request for the given method and version
    pub fn new(method: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: REQUEST_ID,
            method: method.into(),
            params: Vec::new(),
            version: version.into(),
        }
    }

    /// Set the request id
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Set the request parameters
    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

/// JSON-RPC response envelope
///
/// Devices answer either `{"result": [...]}` or `{"error": [code, "message"]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Vec<Value>>,
}

/// Successful call outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// First element of the `result` array
    Payload(Value),
    /// The call succeeded without returning data
    Empty,
}

impl Reply {
    /// The payload, or an error naming the call that returned nothing
    pub fn into_payload(self, method: &str) -> Result<Value, ApiError> {
        match self {
            Reply::Payload(value) => Ok(value),
            Reply::Empty => Err(ApiError::InvalidResponse(format!(
                "{} returned no payload",
                method
            ))),
        }
    }
}

impl Response {
    /// Check if the response carries a JSON-RPC error
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Convert the envelope into a call outcome
    pub fn into_reply(self) -> Result<Reply, ApiError> {
        if let Some(error) = self.error {
            let code = error.first().and_then(Value::as_i64).unwrap_or_default();
            let message = error
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(ApiError::Rejected { code, message });
        }

        Ok(self
            .result
            .and_then(|result| result.into_iter().next())
            .map(Reply::Payload)
            .unwrap_or(Reply::Empty))
    }
}
