//! NetBox IPAM backend.
//!
//! Parent lookup:
//!   `GET  {url}/api/ipam/prefixes/?q=<base>&mask_length=<len>`
//! Child reservation:
//!   `POST {url}/api/ipam/prefixes/{id}/available-prefixes/`  `{"prefix_length": N}`
//!
//! NetBox serializes the reservation itself, so concurrent callers never get
//! overlapping prefixes.

use crate::error::{IpamError, IpamResult};
use crate::traits::{BlockHandle, IpamAuthority, RegisteredBlock};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;
use vpcalloc_core::AddressBlock;

/// Upper bound on result pages followed during a lookup.
const MAX_LOOKUP_PAGES: usize = 20;

/// NetBox REST client.
#[derive(Clone)]
pub struct NetBoxIpam {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl NetBoxIpam {
    /// Create a client for the NetBox instance at `base_url`.
    pub fn new(base_url: &str, token: &str, timeout: Option<Duration>) -> IpamResult<Self> {
        // Keep any path prefix (e.g. "https://host/netbox") when joining.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| IpamError::Config(format!("invalid NetBox URL {base_url:?}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let token_prefix: String = token.chars().take(7).collect();
        tracing::debug!(url = %base_url, token = %format!("{token_prefix}..."), "NetBox client configured");

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> IpamResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| IpamError::Config(format!("failed to build NetBox URL for {path}: {e}")))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> IpamResult<T> {
        let response = req
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(IpamError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| IpamError::InvalidResponse(format!("failed to decode NetBox response: {e}")))
    }
}

#[async_trait]
impl IpamAuthority for NetBoxIpam {
    #[instrument(skip(self), fields(backend = "netbox"))]
    async fn find_block(&self, block: &AddressBlock) -> IpamResult<Option<RegisteredBlock>> {
        let mut url = self.url("api/ipam/prefixes/")?;
        url.query_pairs_mut()
            .append_pair("q", &block.network().to_string())
            .append_pair("mask_length", &block.prefix_len().to_string());

        let mut matches = Vec::new();
        let mut next = Some(url);
        let mut pages = 0;
        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_LOOKUP_PAGES {
                return Err(IpamError::InvalidResponse(format!(
                    "prefix lookup for {block} exceeded {MAX_LOOKUP_PAGES} pages"
                )));
            }

            let page: PrefixPage = self.send_json(self.http.get(url)).await?;
            tracing::debug!(count = page.results.len(), "NetBox prefix page received");

            // `q` is a substring search; keep exact matches only.
            matches.extend(
                page.results
                    .into_iter()
                    .filter(|record| AddressBlock::parse(&record.prefix).ok() == Some(*block)),
            );

            next = match page.next {
                Some(link) => Some(Url::parse(&link).map_err(|e| {
                    IpamError::InvalidResponse(format!("invalid pagination link {link:?}: {e}"))
                })?),
                None => None,
            };
        }

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches.remove(0).into_registered()?)),
            _ => Err(IpamError::Ambiguous(*block)),
        }
    }

    #[instrument(skip(self, parent), fields(backend = "netbox", parent = %parent.block))]
    async fn reserve_child_block(
        &self,
        parent: &RegisteredBlock,
        prefix_len: u8,
    ) -> IpamResult<RegisteredBlock> {
        let url = self.url(&format!(
            "api/ipam/prefixes/{}/available-prefixes/",
            parent.handle
        ))?;
        let created: CreatedPrefixes = self
            .send_json(
                self.http
                    .post(url)
                    .json(&AvailablePrefixRequest { prefix_length: prefix_len }),
            )
            .await?;

        let record = match created {
            CreatedPrefixes::One(record) => record,
            CreatedPrefixes::Many(mut records) if records.len() == 1 => records.remove(0),
            CreatedPrefixes::Many(records) => {
                return Err(IpamError::InvalidResponse(format!(
                    "expected one created prefix, got {}",
                    records.len()
                )));
            }
        };
        let reserved = record.into_registered()?;
        tracing::debug!(block = %reserved.block, id = %reserved.handle, "NetBox prefix created");
        Ok(reserved)
    }
}

// =============================================================================
// NetBox wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct PrefixPage {
    #[serde(default)]
    next: Option<String>,
    results: Vec<PrefixRecord>,
}

#[derive(Debug, Deserialize)]
struct PrefixRecord {
    id: u64,
    prefix: String,
}

impl PrefixRecord {
    fn into_registered(self) -> IpamResult<RegisteredBlock> {
        let block = AddressBlock::parse(&self.prefix).map_err(|e| {
            IpamError::InvalidResponse(format!("prefix {} has invalid CIDR: {e}", self.id))
        })?;
        Ok(RegisteredBlock {
            handle: BlockHandle::new(self.id.to_string()),
            block,
        })
    }
}

#[derive(Debug, Serialize)]
struct AvailablePrefixRequest {
    prefix_length: u8,
}

/// NetBox answers a single-object POST with an object and a list POST with a
/// list; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedPrefixes {
    One(PrefixRecord),
    Many(Vec<PrefixRecord>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let ipam = NetBoxIpam::new("https://netbox.example.com/netbox", "token", None).unwrap();
        assert_eq!(
            ipam.url("api/ipam/prefixes/").unwrap().as_str(),
            "https://netbox.example.com/netbox/api/ipam/prefixes/"
        );
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(matches!(
            NetBoxIpam::new("not a url", "token", None),
            Err(IpamError::Config(_))
        ));
    }

    #[test]
    fn test_created_prefixes_accepts_object_or_list() {
        let one: CreatedPrefixes =
            serde_json::from_str(r#"{"id": 7, "prefix": "10.1.0.0/16", "status": {}}"#).unwrap();
        assert!(matches!(one, CreatedPrefixes::One(PrefixRecord { id: 7, .. })));

        let many: CreatedPrefixes =
            serde_json::from_str(r#"[{"id": 7, "prefix": "10.1.0.0/16"}]"#).unwrap();
        assert!(matches!(many, CreatedPrefixes::Many(ref v) if v.len() == 1));
    }
}
