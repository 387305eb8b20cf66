//! Data types shared by the migasfree client.
//!
//! Resource bodies are never modelled locally: the API is schemaless from the
//! client's point of view, so every body is an opaque `serde_json::Value`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use crate::error::ApiError;

pub const DEFAULT_SERVER: &str = "localhost";
pub const DEFAULT_API_VERSION: u32 = 1;

/// Query string pairs sent with list requests
pub type Params = Vec<(String, String)>;

/// Transport protocol used to reach the server
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

/// Connection settings of a client instance. Immutable once the client is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server host, optionally followed by `:port`
    pub server: String,
    pub protocol: Protocol,
    pub api_version: u32,
    /// Proxy URL per scheme (`http`, `https`)
    pub proxy: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            protocol: Protocol::default(),
            api_version: DEFAULT_API_VERSION,
            proxy: BTreeMap::new(),
        }
    }

    /// `{protocol}://{server}/api/v{version}/token/{endpoint}/`
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}://{}/api/v{}/token/{}/",
            self.protocol, self.server, self.api_version, endpoint
        )
    }

    /// `{url}{id}/`
    pub fn url_id(&self, endpoint: &str, id: u64) -> String {
        format!("{}{}/", self.url(endpoint), id)
    }

    pub fn token_auth_url(&self) -> String {
        format!("{}://{}/token-auth/", self.protocol, self.server)
    }
}

/// The single credential set held by a client
#[derive(Clone, PartialEq)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Argument of [`crate::client::RestClient::get`]
///
/// `Id` fetches one resource by its primary key. `Filter` runs a list query that
/// is expected to match exactly one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Id(u64),
    Filter(Params),
}

impl Default for Param {
    fn default() -> Self {
        Param::Filter(Vec::new())
    }
}

impl From<u64> for Param {
    fn from(id: u64) -> Self {
        Param::Id(id)
    }
}

impl From<Params> for Param {
    fn from(params: Params) -> Self {
        Param::Filter(params)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Param {
    fn from(pairs: [(K, V); N]) -> Self {
        Param::Filter(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Response returned unclassified to the caller (POST, PUT, PATCH, DELETE)
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: String) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON
    pub fn json(&self) -> Result<Value, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
