//! IPFS HTTP RPC client.
//!
//! Talks to a Kubo daemon's `/api/v0` endpoints with a blocking `reqwest`
//! client. Content is pinned when added.

use crate::error::{CidSignError, Result};
use crate::net::content_store::ContentStore;
use reqwest::blocking::{multipart, Client, Response};
use serde::Deserialize;
use std::io::Write;
use std::time::Duration;

/// API address of a local IPFS daemon.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response body of `/api/v0/add`.
#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Blocking client for the IPFS HTTP RPC API.
#[derive(Debug, Clone)]
pub struct IpfsClient {
    api_url: String,
    timeout: Option<Duration>,
    http: Client,
}

impl IpfsClient {
    /// Build a client for the daemon listening at `api_url`.
    ///
    /// Requests have no overall deadline, so adding or fetching large files
    /// runs as long as the daemon keeps the connection alive.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use cidsign::net::client::{IpfsClient, DEFAULT_API_URL};
    /// use cidsign::net::content_store::ContentStore;
    ///
    /// # fn example() -> cidsign::error::Result<()> {
    /// let ipfs = IpfsClient::new(DEFAULT_API_URL)?;
    /// let cid = ipfs.put(b"hello")?;
    /// assert_eq!(ipfs.get(&cid)?, b"hello");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_url: &str) -> Result<Self> {
        Self::with_timeout(api_url, None)
    }

    /// Build a client whose requests fail after `timeout` in total.
    ///
    /// `None` disables the deadline; only connecting is bounded.
    pub fn with_timeout(api_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| CidSignError::TransportError(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    /// The API base address.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The overall request deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn endpoint(&self, command: &str) -> String {
        format!("{}/api/v0/{}", self.api_url, command)
    }

    fn cat(&self, cid: &str) -> Result<Response> {
        let response = self
            .http
            .post(self.endpoint("cat"))
            .query(&[("arg", cid)])
            .send()?;

        check_status(response)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(CidSignError::TransportError(format!(
        "IPFS API returned {}: {}",
        status,
        body.trim()
    )))
}

impl ContentStore for IpfsClient {
    fn put(&self, content: &[u8]) -> Result<String> {
        let part = multipart::Part::bytes(content.to_vec()).file_name("file");
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("add"))
            .query(&[("pin", "true")])
            .multipart(form)
            .send()?;

        let added: AddResponse = check_status(response)?.json()?;
        tracing::debug!(cid = %added.hash, bytes = content.len(), "added content to IPFS");

        Ok(added.hash)
    }

    fn get(&self, cid: &str) -> Result<Vec<u8>> {
        Ok(self.cat(cid)?.bytes()?.to_vec())
    }

    fn get_into(&self, cid: &str, writer: &mut dyn Write) -> Result<u64> {
        let mut response = self.cat(cid)?;
        Ok(response.copy_to(writer)?)
    }
}
