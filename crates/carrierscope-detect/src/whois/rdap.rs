//! RDAP (JSON over HTTPS) registry endpoint

use super::{WhoisEndpoint, WhoisResponse};
use async_trait::async_trait;
use carrierscope_core::{Error, Result};
use serde_json::Value;
use std::net::Ipv4Addr;
use tracing::debug;

/// RDAP client for one registry base URL (e.g. `https://rdap.arin.net/registry`)
#[derive(Debug, Clone)]
pub struct RdapEndpoint {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl RdapEndpoint {
    /// Create an endpoint; the per-query timeout is enforced by the resolver
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("carrierscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build RDAP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, address: Ipv4Addr) -> String {
        format!("{}/ip/{}", self.base_url, address)
    }
}

#[async_trait]
impl WhoisEndpoint for RdapEndpoint {
    async fn query(&self, address: Ipv4Addr) -> Result<WhoisResponse> {
        let url = self.url_for(address);
        debug!(endpoint = %self.name, %url, "RDAP query");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/rdap+json")
            .send()
            .await
            .map_err(|e| Error::network(format!("{}: {}", url, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::no_record(format!("{} has no record for {}", self.name, address)));
        }

        let body: Value = response
            .error_for_status()
            .map_err(|e| Error::network(format!("{}: {}", url, e)))?
            .json()
            .await
            .map_err(|e| Error::malformed(format!("{}: {}", url, e)))?;

        parse_rdap_response(&body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Extract ownership fields from an RDAP IP network object.
///
/// The organization is the vCard `fn` of the registrant entity (falling back
/// to the first entity); the description is the first remark line.
pub fn parse_rdap_response(body: &Value) -> Result<WhoisResponse> {
    if body.get("objectClassName").and_then(Value::as_str) != Some("ip network") {
        return Err(Error::malformed("RDAP response is not an ip network object"));
    }

    let text = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let description = body
        .get("remarks")
        .and_then(Value::as_array)
        .and_then(|remarks| remarks.first())
        .and_then(|remark| remark.get("description"))
        .and_then(Value::as_array)
        .and_then(|lines| text(lines.first()));

    let response = WhoisResponse {
        organization_name: registrant_name(body),
        network_name: text(body.get("name")),
        description,
        country: text(body.get("country")),
    };

    if response.is_empty() {
        return Err(Error::malformed("RDAP response carried no ownership fields"));
    }
    Ok(response)
}

fn registrant_name(body: &Value) -> Option<String> {
    let entities = body.get("entities")?.as_array()?;

    let has_role = |entity: &&Value, role: &str| {
        entity
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
            .unwrap_or(false)
    };

    let entity = entities
        .iter()
        .find(|e| has_role(e, "registrant"))
        .or_else(|| entities.first())?;

    // vcardArray: ["vcard", [[name, params, type, value], ...]]
    entity
        .get("vcardArray")?
        .as_array()?
        .get(1)?
        .as_array()?
        .iter()
        .filter_map(Value::as_array)
        .find(|prop| prop.first().and_then(Value::as_str) == Some("fn"))
        .and_then(|prop| prop.get(3))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn arin_network() -> Value {
        json!({
            "objectClassName": "ip network",
            "handle": "NET-174-192-0-0-1",
            "name": "WIRELESSDATANETWORK",
            "country": "US",
            "remarks": [
                { "description": ["Addresses in this block are dynamically assigned."] }
            ],
            "entities": [
                {
                    "objectClassName": "entity",
                    "roles": ["abuse"],
                    "vcardArray": ["vcard", [["fn", {}, "text", "Abuse Desk"]]]
                },
                {
                    "objectClassName": "entity",
                    "roles": ["registrant"],
                    "vcardArray": ["vcard", [
                        ["version", {}, "text", "4.0"],
                        ["fn", {}, "text", "Cellco Partnership DBA Verizon Wireless"]
                    ]]
                }
            ]
        })
    }

    #[test]
    fn test_parse_registrant() {
        let response = parse_rdap_response(&arin_network()).unwrap();
        assert_eq!(
            response.organization_name.as_deref(),
            Some("Cellco Partnership DBA Verizon Wireless")
        );
        assert_eq!(response.network_name.as_deref(), Some("WIRELESSDATANETWORK"));
        assert_eq!(response.country.as_deref(), Some("US"));
        assert!(response.description.unwrap().starts_with("Addresses"));
    }

    #[test]
    fn test_parse_falls_back_to_first_entity() {
        let body = json!({
            "objectClassName": "ip network",
            "entities": [
                { "vcardArray": ["vcard", [["fn", {}, "text", "T-Mobile USA, Inc."]]] }
            ]
        });
        let response = parse_rdap_response(&body).unwrap();
        assert_eq!(response.organization_name.as_deref(), Some("T-Mobile USA, Inc."));
        assert_eq!(response.network_name, None);
    }

    #[test]
    fn test_parse_rejects_other_objects() {
        let body = json!({ "objectClassName": "entity", "name": "x" });
        assert_eq!(parse_rdap_response(&body).unwrap_err().kind(), "malformed");

        let empty = json!({ "objectClassName": "ip network" });
        assert!(parse_rdap_response(&empty).is_err());
    }

    #[test]
    fn test_url_building() {
        let endpoint = RdapEndpoint::new("arin-rdap", "https://rdap.arin.net/registry/").unwrap();
        assert_eq!(
            endpoint.url_for(Ipv4Addr::new(174, 200, 1, 2)),
            "https://rdap.arin.net/registry/ip/174.200.1.2"
        );
        assert_eq!(endpoint.name(), "arin-rdap");
    }
}
