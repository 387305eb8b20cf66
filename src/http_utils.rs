//! HTTP plumbing for the migasfree client.
//!
//! Wraps a blocking `reqwest` client configured with the JSON content type and
//! the proxy settings of a [`ClientConfig`], and knows how to attach the
//! `Token` authorization header.

use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Method, Proxy, StatusCode,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::{error::ApiError, model::ClientConfig};

/// Statuses treated as success by read operations
pub const ACCEPTABLE_STATUS: [StatusCode; 6] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

pub fn is_acceptable(status: StatusCode) -> bool {
    ACCEPTABLE_STATUS.contains(&status)
}

/// Blocking HTTP client shared by every operation of a `RestClient`
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client for the given connection settings
    ///
    /// With an empty proxy map no proxy is used at all, environment variables
    /// included.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .default_headers(default_headers)
            .timeout(None);

        if config.proxy.is_empty() {
            builder = builder.no_proxy();
        } else {
            for (scheme, url) in &config.proxy {
                let proxy = match scheme.as_str() {
                    "http" => Proxy::http(url)?,
                    "https" => Proxy::https(url)?,
                    _ => Proxy::all(url)?,
                };
                trace!("Using proxy for {}", scheme);
                builder = builder.proxy(proxy);
            }
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET with query parameters
    pub fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        auth_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        self.execute(self.client.get(url).query(query), Method::GET, url, auth_token)
    }

    /// Send `body` serialized as JSON with the given method
    pub fn send_json(
        &self,
        method: Method,
        url: &str,
        body: &Value,
        auth_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let request = self
            .client
            .request(method.clone(), url)
            .body(serde_json::to_vec(body)?);
        self.execute(request, method, url, auth_token)
    }

    pub fn delete(&self, url: &str, auth_token: Option<&str>) -> Result<Response, ApiError> {
        self.execute(self.client.delete(url), Method::DELETE, url, auth_token)
    }

    fn execute(
        &self,
        mut request: RequestBuilder,
        method: Method,
        url: &str,
        auth_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        if let Some(token) = auth_token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }

        debug!("{} {}", method, url);
        let response = request.send()?;
        debug!("{} {} -> {}", method, url, response.status());
        Ok(response)
    }
}

/// Decode a response body as JSON
pub fn read_json(response: Response) -> Result<Value, ApiError> {
    let text = response.text()?;
    trace!("Raw response text for deserialization: {}", text);
    Ok(serde_json::from_str(&text)?)
}

/// Decode a response body that carries a secret, without tracing its text
pub fn read_sensitive_json(response: Response) -> Result<Value, ApiError> {
    let text = response.text()?;
    Ok(serde_json::from_str(&text)?)
}
