//! SSDP M-SEARCH client.
//!
//! Sends the search to the standard multicast group and collects unicast replies
//! on the same socket until the timeout elapses.

use crate::config::DiscoveryConfig;
use crate::error::Result;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

/// Standard SSDP multicast address and port
const MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// Relevant headers of an SSDP search response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsdpResponse {
    pub location: String,
    pub search_target: Option<String>,
    pub usn: Option<String>,
    pub server: Option<String>,
}

/// Build the M-SEARCH message
pub fn build_msearch(search_target: &str, mx: u64) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: 239.255.255.250:1900\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\r\n",
        mx, search_target
    )
}

/// Parse a search response; `None` if it is not a `200 OK` with a `LOCATION` header
pub fn parse_response(response: &str) -> Option<SsdpResponse> {
    let mut lines = response.lines();
    let status = lines.next()?;
    if !status.starts_with("HTTP/") || !status.contains(" 200") {
        return None;
    }

    let mut location = None;
    let mut search_target = None;
    let mut usn = None;
    let mut server = None;

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim().to_ascii_uppercase().as_str() {
            "LOCATION" => location = Some(value),
            "ST" => search_target = Some(value),
            "USN" => usn = Some(value),
            "SERVER" => server = Some(value),
            _ => {}
        }
    }

    Some(SsdpResponse {
        location: location.filter(|l| !l.is_empty())?,
        search_target,
        usn,
        server,
    })
}

/// Search for devices and collect every matching response until the timeout
///
/// Fails only if the socket cannot be set up or the first search cannot be sent.
pub async fn search(config: &DiscoveryConfig) -> Result<Vec<SsdpResponse>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    if let Err(e) = socket.set_broadcast(true) {
        tracing::warn!("Failed to set SO_BROADCAST: {}", e);
    }
    if let Err(e) = socket.set_multicast_ttl_v4(4) {
        tracing::warn!("Failed to set multicast TTL: {}", e);
    }

    let message = build_msearch(&config.search_target, config.mx);
    let deadline = Instant::now() + config.timeout;
    let mut responses = Vec::new();
    let mut buffer = [0u8; 4096];
    let mut sent = 0;
    let mut next_send = Instant::now();

    loop {
        if sent < config.send_count && Instant::now() >= next_send {
            match socket.send_to(message.as_bytes(), MULTICAST_ADDR).await {
                Ok(_) => tracing::debug!("Sent M-SEARCH for {}", config.search_target),
                Err(e) if sent == 0 => return Err(e.into()),
                Err(e) => tracing::warn!("Failed to resend M-SEARCH: {}", e),
            }
            sent += 1;
            next_send = Instant::now() + config.retry_delay;
        }

        let wake = if sent < config.send_count {
            next_send.min(deadline)
        } else {
            deadline
        };

        match timeout_at(wake, socket.recv_from(&mut buffer)).await {
            Ok(Ok((len, src))) => {
                let text = String::from_utf8_lossy(&buffer[..len]);
                match parse_response(&text) {
                    Some(response) if matches_target(&response, &config.search_target) => {
                        tracing::debug!("SSDP response from {}: {}", src, response.location);
                        responses.push(response);
                    }
                    Some(response) => {
                        tracing::debug!(
                            "Ignoring SSDP response from {} for {:?}",
                            src,
                            response.search_target
                        );
                    }
                    None => tracing::debug!("Ignoring malformed SSDP packet from {}", src),
                }
            }
            Ok(Err(e)) => tracing::debug!("SSDP receive error: {}", e),
            Err(_) => {
                if Instant::now() >= deadline {
                    break;
                }
            }
        }
    }

    tracing::debug!("SSDP search collected {} response(s)", responses.len());
    Ok(responses)
}

fn matches_target(response: &SsdpResponse, search_target: &str) -> bool {
    response
        .search_target
        .as_deref()
        .map_or(true, |st| st == search_target)
}
