//! WHOIS over TCP port 43 (RFC 3912)

use super::{WhoisEndpoint, WhoisResponse};
use async_trait::async_trait;
use carrierscope_core::{Error, Result};
use std::net::Ipv4Addr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Default WHOIS port
pub const WHOIS_PORT: u16 = 43;

/// Responses larger than this are truncated before parsing
const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Plain-text WHOIS client
#[derive(Debug, Clone)]
pub struct Port43Endpoint {
    name: String,
    host: String,
    port: u16,
}

impl Port43Endpoint {
    /// Create an endpoint for a registry host on the standard port
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            name: host.clone(),
            host,
            port: WHOIS_PORT,
        }
    }

    /// Override the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the name reported as the record source
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl WhoisEndpoint for Port43Endpoint {
    async fn query(&self, address: Ipv4Addr) -> Result<WhoisResponse> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| Error::network(format!("connect {}:{}: {}", self.host, self.port, e)))?;

        stream
            .write_all(format!("{}\r\n", address).as_bytes())
            .await
            .map_err(|e| Error::network(format!("send query to {}: {}", self.host, e)))?;

        let mut raw = Vec::new();
        stream
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut raw)
            .await
            .map_err(|e| Error::network(format!("read response from {}: {}", self.host, e)))?;

        debug!(endpoint = %self.name, bytes = raw.len(), "WHOIS response received");

        parse_whois_text(&String::from_utf8_lossy(&raw))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Extract ownership fields from a `key: value` WHOIS response.
///
/// Understands both ARIN (`OrgName`, `NetName`) and RIPE/APNIC
/// (`org-name`, `netname`, `descr`) field names. The first occurrence of each
/// field wins.
pub fn parse_whois_text(text: &str) -> Result<WhoisResponse> {
    let mut response = WhoisResponse::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "orgname" | "org-name" | "owner" => &mut response.organization_name,
            "netname" => &mut response.network_name,
            "descr" => &mut response.description,
            "country" => &mut response.country,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    if response.is_empty() {
        return Err(Error::malformed("no ownership fields in WHOIS response"));
    }
    Ok(response)
}
