use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{ApiError, ApiResult, Result};
use crate::protocol::{ApiCall, Reply};
use crate::types::{
    Activity, ContentInfo, InterfaceInfo, MuteSetting, PowerCommand, PowerStatus, SystemInfo,
    Terminal, VolumeChange, VolumeInfo,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Operations supported on a receiver
///
/// Reconciliation depends on this trait rather than on [`AvrClient`], so it can be
/// driven by any implementation. An empty `output` addresses every output.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Current power status of the receiver
    async fn get_power_status(&self) -> ApiResult<PowerStatus>;

    /// All input and output terminals with their activation state
    async fn get_terminals(&self) -> ApiResult<Vec<Terminal>>;

    /// Volume and mute state of one output, or all outputs for `""`
    async fn get_volume_info(&self, output: &str) -> ApiResult<Vec<VolumeInfo>>;

    /// Selected content of one output, or all outputs for `""`
    async fn get_playing_content(&self, output: &str) -> ApiResult<Vec<ContentInfo>>;

    /// Activate or deactivate an output terminal
    async fn set_active_terminal(&self, uri: &str, activity: Activity) -> ApiResult<()>;

    /// Select the source input of an output
    async fn set_play_content(&self, output: &str, uri: &str) -> ApiResult<()>;

    /// Set or step the volume of an output
    async fn set_volume(&self, output: &str, change: VolumeChange) -> ApiResult<()>;

    /// Mute, unmute or toggle an output
    async fn set_mute(&self, output: &str, mute: MuteSetting) -> ApiResult<()>;

    /// Change the power status of the receiver
    async fn set_power(&self, command: PowerCommand) -> ApiResult<()>;
}

/// Client for one ScalarWebAPI receiver
///
/// A thin typed surface over [`Connection`]: each method is one JSON-RPC call with
/// its parameters shaped the way the device expects. Failures are passed through
/// untouched; nothing is retried or cached.
///
/// # Example
///
/// ```no_run
/// use scalar_avr::{AvrClient, ClientConfig, DeviceApi, MuteSetting};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = AvrClient::connect("http://192.168.1.20:10000/sony", "1.0", &ClientConfig::default())?;
///     let power = client.get_power_status().await?;
///     println!("Power: {:?}", power.state());
///     client.set_mute("", MuteSetting::On).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AvrClient {
    connection: Connection,
    api_version: String,
}

impl AvrClient {
    /// Create a client for the given base URL and API version
    ///
    /// No request is made; the receiver may well be asleep.
    pub fn connect(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self> {
        Ok(Self {
            connection: Connection::new(base_url, config)?,
            api_version: api_version.into(),
        })
    }

    /// Base control URL
    pub fn base_url(&self) -> &str {
        self.connection.base_url()
    }

    /// API version advertised by the device descriptor
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// MAC address, firmware version and model of the device
    pub async fn get_system_information(&self) -> ApiResult<SystemInfo> {
        self.query(&ApiCall::GET_SYSTEM_INFO, Vec::new()).await
    }

    /// Model and product names of the device
    pub async fn get_interface_information(&self) -> ApiResult<InterfaceInfo> {
        self.query(&ApiCall::GET_INTERFACE_INFO, Vec::new()).await
    }

    async fn query<T: DeserializeOwned>(&self, call: &ApiCall, params: Vec<Value>) -> ApiResult<T> {
        let payload = self
            .connection
            .invoke(call, params)
            .await?
            .into_payload(call.method)?;

        serde_json::from_value(payload).map_err(|e| {
            tracing::warn!("Unexpected {} payload: {}", call.method, e);
            ApiError::InvalidResponse(format!("{}: {}", call.method, e))
        })
    }

    async fn command(&self, call: &ApiCall, params: Value) -> ApiResult<()> {
        match self.connection.invoke(call, vec![params]).await? {
            Reply::Empty => Ok(()),
            Reply::Payload(payload) => {
                tracing::debug!("{} returned {}", call.method, payload);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl DeviceApi for AvrClient {
    async fn get_power_status(&self) -> ApiResult<PowerStatus> {
        self.query(&ApiCall::GET_POWER_STATUS, Vec::new()).await
    }

    async fn get_terminals(&self) -> ApiResult<Vec<Terminal>> {
        self.query(&ApiCall::GET_TERMINAL_STATUS, Vec::new()).await
    }

    async fn get_volume_info(&self, output: &str) -> ApiResult<Vec<VolumeInfo>> {
        self.query(&ApiCall::GET_VOLUME_INFO, vec![json!({ "output": output })])
            .await
    }

    async fn get_playing_content(&self, output: &str) -> ApiResult<Vec<ContentInfo>> {
        self.query(
            &ApiCall::GET_PLAYING_CONTENT_INFO,
            vec![json!({ "output": output })],
        )
        .await
    }

    async fn set_active_terminal(&self, uri: &str, activity: Activity) -> ApiResult<()> {
        self.command(
            &ApiCall::SET_ACTIVE_TERMINAL,
            json!({ "uri": uri, "active": activity.as_str() }),
        )
        .await
    }

    async fn set_play_content(&self, output: &str, uri: &str) -> ApiResult<()> {
        self.command(
            &ApiCall::SET_PLAY_CONTENT,
            json!({ "output": output, "uri": uri }),
        )
        .await
    }

    async fn set_volume(&self, output: &str, change: VolumeChange) -> ApiResult<()> {
        self.command(
            &ApiCall::SET_AUDIO_VOLUME,
            json!({ "output": output, "volume": change.to_string() }),
        )
        .await
    }

    async fn set_mute(&self, output: &str, mute: MuteSetting) -> ApiResult<()> {
        self.command(
            &ApiCall::SET_AUDIO_MUTE,
            json!({ "output": output, "mute": mute.as_str() }),
        )
        .await
    }

    async fn set_power(&self, command: PowerCommand) -> ApiResult<()> {
        self.command(
            &ApiCall::SET_POWER_STATUS,
            json!({ "status": command.as_str() }),
        )
        .await
    }
}
