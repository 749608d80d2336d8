//! Identity store access: per-identity facts and secrets held by the FlagOps data store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::middleware::build_client;
use crate::VERSION;

/// Default timeout for a single data store request (5 seconds).
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Remote namespace an identity attribute lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Facts, merged into evaluation contexts.
    Fact,
    /// Secrets, only reachable through the direct accessors.
    Secret,
}

impl Namespace {
    /// Path segment used by the data store for this namespace.
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Fact => "fact",
            Namespace::Secret => "secret",
        }
    }
}

/// Interface for reading and writing identity facts and secrets.
///
/// Implementations can use any backend. [`HttpIdentityStore`] talks to the
/// FlagOps data store over HTTP.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Reads every entry stored for `identity` in `namespace`.
    async fn read(&self, namespace: Namespace, identity: &str) -> Result<HashMap<String, String>>;

    /// Stores a single `key = value` entry for `identity` in `namespace`.
    async fn write(&self, namespace: Namespace, identity: &str, key: &str, value: &str)
        -> Result<()>;

    /// Fetch the facts stored for an identity.
    async fn get_facts(&self, identity: &str) -> Result<HashMap<String, String>> {
        self.read(Namespace::Fact, identity).await
    }

    /// Store a single fact for an identity.
    async fn set_fact(&self, identity: &str, key: &str, value: &str) -> Result<()> {
        self.write(Namespace::Fact, identity, key, value).await
    }

    /// Fetch the secrets stored for an identity.
    async fn get_secrets(&self, identity: &str) -> Result<HashMap<String, String>> {
        self.read(Namespace::Secret, identity).await
    }

    /// Store a single secret for an identity.
    async fn set_secret(&self, identity: &str, key: &str, value: &str) -> Result<()> {
        self.write(Namespace::Secret, identity, key, value).await
    }
}

/// Body of a PUT request.
#[derive(Serialize)]
struct WriteRequest<'a> {
    value: &'a str,
}

/// Identity store backed by the FlagOps data store HTTP API.
pub struct HttpIdentityStore {
    client: ClientWithMiddleware,
    base_url: Url,
    timeout: Duration,
}

impl HttpIdentityStore {
    /// Create a store for the given base URL with a default HTTP client.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        Self::with_client(
            base_url,
            client,
            Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }

    /// Create a store with a custom HTTP client and per-request timeout.
    pub fn with_client(base_url: &str, client: reqwest::Client, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(client),
            base_url: parse_base_url(base_url)?,
            timeout,
        })
    }

    /// The base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base_url}/{segments...}`, encoding each segment on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Configuration(format!("base URL cannot have a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn user_agent() -> String {
        format!("flagops-datastore-provider-rust/{}", VERSION)
    }
}

#[async_trait]
impl IdentityStore for HttpIdentityStore {
    async fn read(&self, namespace: Namespace, identity: &str) -> Result<HashMap<String, String>> {
        let url = self.endpoint(&[namespace.as_str(), identity])?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, Self::user_agent())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "GET /{}/{} returned {}",
                namespace.as_str(),
                identity,
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(reqwest_middleware::Error::Reqwest)?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(
        &self,
        namespace: Namespace,
        identity: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let url = self.endpoint(&[namespace.as_str(), identity, key])?;
        let body = serde_json::to_vec(&WriteRequest { value })?;

        let response = self
            .client
            .put(url)
            .header(USER_AGENT, Self::user_agent())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(Error::Write(status.to_string())),
        }
    }
}

/// Parse and validate the data store base URL.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("invalid data store URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Configuration(format!(
            "unsupported data store URL scheme '{}'",
            url.scheme()
        )));
    }

    Ok(url)
}
