//! Token-authenticated client for the migasfree REST API.
//!
//! A [`RestClient`] is built once with its connection settings and a single
//! token, then used for any number of blocking calls. The token comes from, in
//! order: the builder, the user's token cache file, or a password prompt followed
//! by a request to `/token-auth/`.

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::{debug, trace, warn};

use crate::{
    configuration::Configuration,
    credentials::{CredentialProvider, InteractivePrompt},
    error::ApiError,
    export,
    http_utils::{is_acceptable, read_json, read_sensitive_json, HttpClient},
    model::{ClientConfig, Credentials, Param, Params, Protocol, RawResponse, DEFAULT_SERVER},
    pagination::Pages,
    token_cache::{self, TokenCache},
};

/// Builder for [`RestClient`]
///
/// Settings left unset are taken from the configuration: the one given to
/// [`RestClientBuilder::configuration`], or else the default configuration file
/// when it exists.
pub struct RestClientBuilder {
    server: Option<String>,
    user: Option<String>,
    token: Option<String>,
    save_token: bool,
    protocol: Option<Protocol>,
    api_version: Option<u32>,
    proxy: Option<BTreeMap<String, String>>,
    configuration: Option<Configuration>,
    provider: Box<dyn CredentialProvider>,
    home: Option<PathBuf>,
}

impl Default for RestClientBuilder {
    fn default() -> Self {
        Self {
            server: None,
            user: None,
            token: None,
            save_token: false,
            protocol: None,
            api_version: None,
            proxy: None,
            configuration: None,
            provider: Box::new(InteractivePrompt),
            home: None,
        }
    }
}

impl RestClientBuilder {
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Use this token as-is; no cache lookup and no authentication request
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Persist a freshly obtained token to the user's token cache file
    pub fn save_token(mut self, save: bool) -> Self {
        self.save_token = save;
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn api_version(mut self, version: u32) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Add a proxy; any proxy set here replaces those of the configuration
    pub fn proxy(mut self, scheme: impl Into<String>, url: impl Into<String>) -> Self {
        self.proxy
            .get_or_insert_with(BTreeMap::new)
            .insert(scheme.into(), url.into());
        self
    }

    /// Use this configuration instead of reading the default configuration file
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn credential_provider(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    /// Directory holding token cache files, instead of the user's home
    pub fn home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Resolve the settings, the server and the token, then build the client
    pub fn build(self) -> Result<RestClient, ApiError> {
        let configuration = self.load_configuration()?;
        let defaults = ClientConfig::new(DEFAULT_SERVER);

        let server = match non_empty(self.server.clone()) {
            Some(server) => server,
            None => self.resolve_server(configuration.as_ref()),
        };

        let config = ClientConfig {
            server,
            protocol: self
                .protocol
                .or_else(|| configuration.as_ref().and_then(Configuration::protocol))
                .unwrap_or(defaults.protocol),
            api_version: self
                .api_version
                .or_else(|| configuration.as_ref().and_then(Configuration::api_version))
                .unwrap_or(defaults.api_version),
            proxy: self
                .proxy
                .clone()
                .or_else(|| {
                    configuration
                        .as_ref()
                        .map(|configuration| configuration.proxy().clone())
                        .filter(|proxy| !proxy.is_empty())
                })
                .unwrap_or(defaults.proxy),
        };
        let http = HttpClient::new(&config)?;

        let credentials = match non_empty(self.token.clone()) {
            Some(token) => {
                debug!("Using token supplied by the caller");
                Credentials::new(self.user.clone().unwrap_or_default(), token)
            }
            None => self.resolve_token(&config, &http)?,
        };

        Ok(RestClient {
            config,
            credentials,
            http,
            home: self.home,
        })
    }

    fn load_configuration(&self) -> Result<Option<Configuration>, ApiError> {
        if let Some(configuration) = &self.configuration {
            return Ok(Some(configuration.clone()));
        }

        match Configuration::load_default() {
            Ok(configuration) => Ok(Some(configuration)),
            Err(e) if e.is_missing() => {
                trace!("Running without configuration file: {}", e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve_server(&self, configuration: Option<&Configuration>) -> String {
        match configuration {
            Some(configuration) => {
                let server = configuration.server_or_default();
                debug!("Using server {} from configuration", server);
                server
            }
            None => {
                trace!("No configuration available, asking for the server");
                non_empty(self.provider.prompt_server())
                    .unwrap_or_else(|| DEFAULT_SERVER.to_string())
            }
        }
    }

    fn resolve_token(&self, config: &ClientConfig, http: &HttpClient) -> Result<Credentials, ApiError> {
        let user = match non_empty(self.user.clone()) {
            Some(user) => user,
            None => self.provider.prompt_username(&config.server).unwrap_or_default(),
        };

        let home = match &self.home {
            Some(home) => home.clone(),
            None => token_cache::default_home()?,
        };
        let cache = TokenCache::new(&home, &user, &config.server);

        if let Some(token) = cache.load()? {
            return Ok(Credentials::new(user, token));
        }

        let password = non_empty(self.provider.prompt_password(&config.server, &user))
            .ok_or(ApiError::Credential)?;
        let token = request_token(config, http, &user, &password)?;

        if self.save_token {
            cache.store(&token)?;
        }

        Ok(Credentials::new(user, token))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `POST /token-auth/` with the user's password, returning the issued token
fn request_token(
    config: &ClientConfig,
    http: &HttpClient,
    user: &str,
    password: &str,
) -> Result<String, ApiError> {
    debug!("Requesting a new token for {}@{}", user, config.server);
    let body = json!({"username": user, "password": password});
    let response = http.send_json(Method::POST, &config.token_auth_url(), &body, None)?;

    let status = response.status();
    if !is_acceptable(status) {
        warn!("Authentication for {} rejected with status {}", user, status);
        return Err(ApiError::Authentication {
            status: status.as_u16(),
        });
    }

    match read_sensitive_json(response)?.get("token") {
        Some(Value::String(token)) => Ok(token.clone()),
        _ => Err(ApiError::UnexpectedResponse(
            "authentication response without token".to_string(),
        )),
    }
}

/// Blocking client bound to one server and one token
pub struct RestClient {
    config: ClientConfig,
    credentials: Credentials,
    http: HttpClient,
    home: Option<PathBuf>,
}

impl RestClient {
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn url(&self, endpoint: &str) -> String {
        self.config.url(endpoint)
    }

    pub fn url_id(&self, endpoint: &str, id: u64) -> String {
        self.config.url_id(endpoint, id)
    }

    /// Path of the token cache file for this client's user and server
    pub fn token_file(&self) -> Result<PathBuf, ApiError> {
        let home = match &self.home {
            Some(home) => home.clone(),
            None => token_cache::default_home()?,
        };
        Ok(TokenCache::new(&home, self.credentials.username(), &self.config.server)
            .path()
            .to_path_buf())
    }

    fn token(&self) -> Option<&str> {
        Some(self.credentials.token())
    }

    /// Fetch exactly one resource.
    ///
    /// This method has two contracts depending on `param`:
    ///
    /// - `Param::Id(id)` fetches `{endpoint}/{id}/` and returns the body.
    /// - `Param::Filter(params)` runs a list query and expects exactly one match:
    ///   a response with `count == 1` is unwrapped to its single element,
    ///   `count == 0` is [`ApiError::NotFound`], a larger count is
    ///   [`ApiError::AmbiguousResult`]. A body that is an array, or has no
    ///   `count`, is returned unchanged.
    ///
    /// Any status outside the acceptable set is [`ApiError::Http`].
    pub fn get(&self, endpoint: &str, param: impl Into<Param>) -> Result<Value, ApiError> {
        match param.into() {
            Param::Id(id) => {
                let response = self.http.get(&self.url_id(endpoint, id), &[], self.token())?;
                let status = response.status();
                if !is_acceptable(status) {
                    return Err(ApiError::Http {
                        status: status.as_u16(),
                    });
                }
                read_json(response)
            }
            Param::Filter(params) => {
                let response = self.http.get(&self.url(endpoint), &params, self.token())?;
                let status = response.status();
                if !is_acceptable(status) {
                    return Err(ApiError::Http {
                        status: status.as_u16(),
                    });
                }
                single_result(read_json(response)?)
            }
        }
    }

    /// Iterate over every element of `endpoint` matching `params`, page by page
    pub fn filter(&self, endpoint: &str, params: Params) -> Pages<'_> {
        Pages::new(&self.http, self.credentials.token(), self.url(endpoint), params)
    }

    /// Fetch one list page and return its decoded body without checking the status
    pub fn paginate(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        read_json(self.http.get(&self.url(endpoint), params, self.token())?)
    }

    pub fn post(&self, endpoint: &str, data: &Value) -> Result<RawResponse, ApiError> {
        self.send(Method::POST, &self.url(endpoint), data)
    }

    pub fn put(&self, endpoint: &str, id: u64, data: &Value) -> Result<RawResponse, ApiError> {
        self.send(Method::PUT, &self.url_id(endpoint, id), data)
    }

    pub fn patch(&self, endpoint: &str, id: u64, data: &Value) -> Result<RawResponse, ApiError> {
        self.send(Method::PATCH, &self.url_id(endpoint, id), data)
    }

    pub fn delete(&self, endpoint: &str, id: u64) -> Result<RawResponse, ApiError> {
        let response = self.http.delete(&self.url_id(endpoint, id), self.token())?;
        let status = response.status();
        Ok(RawResponse::new(status, response.text()?))
    }

    fn send(&self, method: Method, url: &str, data: &Value) -> Result<RawResponse, ApiError> {
        let response = self.http.send_json(method, url, data, self.token())?;
        let status = response.status();
        Ok(RawResponse::new(status, response.text()?))
    }

    /// Create a resource and return its `id`; anything but `201 Created` is an error
    pub fn add(&self, endpoint: &str, data: &Value) -> Result<Value, ApiError> {
        let response = self.post(endpoint, data)?;
        if !Self::is_created(response.status()) {
            return Err(ApiError::Http {
                status: response.status().as_u16(),
            });
        }
        extract_id(response.json()?)
    }

    /// `id` field of the single resource matched by `param`
    pub fn id(&self, endpoint: &str, param: impl Into<Param>) -> Result<Value, ApiError> {
        extract_id(self.get(endpoint, param)?)
    }

    /// Write every element matching `params` to a CSV file; returns the row count
    pub fn export_csv(
        &self,
        endpoint: &str,
        params: Params,
        fields: &[String],
        output: &Path,
    ) -> Result<usize, ApiError> {
        export::export_csv(self.filter(endpoint, params), fields, output)
    }

    pub fn is_ok(status: StatusCode) -> bool {
        status == StatusCode::OK
    }

    pub fn is_created(status: StatusCode) -> bool {
        status == StatusCode::CREATED
    }

    pub fn is_forbidden(status: StatusCode) -> bool {
        status == StatusCode::FORBIDDEN
    }
}

/// Collapse a list response to its only element
fn single_result(data: Value) -> Result<Value, ApiError> {
    let count = match data.get("count") {
        Some(count) if data.is_object() => count.as_u64().ok_or_else(|| {
            ApiError::UnexpectedResponse(format!("invalid count {}", count))
        })?,
        _ => return Ok(data),
    };

    match count {
        0 => Err(ApiError::NotFound),
        1 => data
            .get("results")
            .and_then(|results| results.get(0))
            .cloned()
            .ok_or_else(|| ApiError::UnexpectedResponse("count is 1 but results is empty".to_string())),
        count => Err(ApiError::AmbiguousResult { count }),
    }
}

fn extract_id(data: Value) -> Result<Value, ApiError> {
    data.get("id")
        .cloned()
        .ok_or_else(|| ApiError::UnexpectedResponse("resource without id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use mockito::{Matcher, Server, ServerGuard};
    use std::{
        fs,
        sync::{Arc, Mutex},
    };
    use tempfile::{tempdir, TempDir};

    const TOKEN: &str = "0123456789abcdef";

    fn client_for(server: &ServerGuard) -> RestClient {
        RestClient::builder()
            .configuration(Configuration::default())
            .server(server.host_with_port())
            .user("admin")
            .token(TOKEN)
            .build()
            .unwrap()
    }

    fn authenticating_builder(server: &ServerGuard, home: &TempDir) -> RestClientBuilder {
        RestClient::builder()
            .configuration(Configuration::default())
            .server(server.host_with_port())
            .user("admin")
            .home_dir(home.path())
            .credential_provider(StaticCredentials::new().password("secret"))
    }

    #[test]
    fn test_get_by_id_issues_one_request() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/v1/token/computers/5/")
            .match_header("authorization", "Token 0123456789abcdef")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"id": 5, "name": "pc5"}"#)
            .expect(1)
            .create();

        let computer = client_for(&server).get("computers", 5u64).unwrap();

        mock.assert();
        assert_eq!(computer, json!({"id": 5, "name": "pc5"}));
    }

    #[test]
    fn test_get_by_id_rejects_unacceptable_status() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/computers/9/")
            .with_status(404)
            .with_body(r#"{"detail": "Not found."}"#)
            .create();

        let err = client_for(&server).get("computers", 9u64).unwrap_err();

        assert!(matches!(err, ApiError::Http { status: 404 }));
    }

    #[test]
    fn test_get_with_filter_unwraps_single_result() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::UrlEncoded("name".into(), "pc1".into()))
            .with_status(200)
            .with_body(r#"{"count": 1, "next": null, "results": [{"id": 1, "name": "pc1"}]}"#)
            .create();

        let computer = client_for(&server)
            .get("computers", [("name", "pc1")])
            .unwrap();

        assert_eq!(computer, json!({"id": 1, "name": "pc1"}));
    }

    #[test]
    fn test_get_with_filter_and_no_match_is_not_found() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"count": 0, "next": null, "results": []}"#)
            .create();

        let err = client_for(&server)
            .get("computers", [("name", "ghost")])
            .unwrap_err();

        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn test_get_with_filter_and_many_matches_is_ambiguous() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"count": 2, "next": null, "results": [{"id": 1}, {"id": 2}]}"#)
            .create();

        let err = client_for(&server).get("computers", Param::default()).unwrap_err();

        assert!(matches!(err, ApiError::AmbiguousResult { count: 2 }));
    }

    #[test]
    fn test_get_returns_non_list_shapes_unchanged() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/stats/")
            .with_status(200)
            .with_body(r#"{"total": 10}"#)
            .create();
        server
            .mock("GET", "/api/v1/token/platforms/")
            .with_status(200)
            .with_body(r#"[{"id": 1}, {"id": 2}]"#)
            .create();

        let client = client_for(&server);

        assert_eq!(client.get("stats", Param::default()).unwrap(), json!({"total": 10}));
        assert_eq!(
            client.get("platforms", Param::default()).unwrap(),
            json!([{"id": 1}, {"id": 2}])
        );
    }

    #[test]
    fn test_id_returns_id_of_single_match() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/projects/")
            .match_query(Matcher::UrlEncoded("name".into(), "acme".into()))
            .with_status(200)
            .with_body(r#"{"count": 1, "next": null, "results": [{"id": 12, "name": "acme"}]}"#)
            .create();

        let id = client_for(&server).id("projects", [("name", "acme")]).unwrap();

        assert_eq!(id, json!(12));
    }

    #[test]
    fn test_filter_follows_next_lazily() {
        let mut server = Server::new();
        let page2_url = format!("{}/api/v1/token/computers/?page=2&status=in", server.url());
        let page1 = server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::Exact("status=in".into()))
            .with_status(200)
            .with_body(
                json!({"count": 3, "next": page2_url, "results": [{"id": 1}, {"id": 2}]})
                    .to_string(),
            )
            .expect(1)
            .create();
        let page2 = server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::Exact("page=2&status=in".into()))
            .with_status(200)
            .with_body(r#"{"count": 3, "next": null, "results": [{"id": 3}]}"#)
            .expect(1)
            .create();

        let client = client_for(&server);
        let mut pages = client.filter("computers", vec![("status".into(), "in".into())]);

        assert_eq!(pages.next().unwrap().unwrap(), json!({"id": 1}));
        assert!(page1.matched());
        assert!(!page2.matched());
        assert!(pages.has_more());

        let rest: Vec<Value> = pages.by_ref().map(Result::unwrap).collect();
        assert_eq!(rest, vec![json!({"id": 2}), json!({"id": 3})]);
        assert!(!pages.has_more());
        assert_eq!(pages.pages_fetched(), 2);

        page1.assert();
        page2.assert();
    }

    #[test]
    fn test_filter_stops_on_error_status() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/computers/")
            .with_status(500)
            .create();

        let client = client_for(&server);
        let mut pages = client.filter("computers", vec![]);

        assert!(matches!(pages.next(), Some(Err(ApiError::Http { status: 500 }))));
        assert!(pages.next().is_none());
    }

    #[test]
    fn test_add_returns_id_on_created() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/api/v1/token/stores/")
            .match_body(Matcher::Json(json!({"name": "main", "project": 1})))
            .with_status(201)
            .with_body(r#"{"id": 33, "name": "main"}"#)
            .create();

        let id = client_for(&server)
            .add("stores", &json!({"name": "main", "project": 1}))
            .unwrap();

        mock.assert();
        assert_eq!(id, json!(33));
    }

    #[test]
    fn test_add_rejects_other_statuses() {
        let mut server = Server::new();
        server
            .mock("POST", "/api/v1/token/stores/")
            .with_status(200)
            .with_body(r#"{"id": 33}"#)
            .create();

        let err = client_for(&server).add("stores", &json!({})).unwrap_err();

        assert!(matches!(err, ApiError::Http { status: 200 }));
    }

    #[test]
    fn test_raw_operations_return_response_unclassified() {
        let mut server = Server::new();
        server
            .mock("PATCH", "/api/v1/token/computers/4/")
            .match_body(Matcher::Json(json!({"comment": "moved"})))
            .with_status(400)
            .with_body(r#"{"comment": ["too short"]}"#)
            .create();
        server
            .mock("PUT", "/api/v1/token/computers/4/")
            .with_status(200)
            .with_body(r#"{"id": 4}"#)
            .create();
        server
            .mock("DELETE", "/api/v1/token/computers/4/")
            .with_status(204)
            .create();

        let client = client_for(&server);

        let patched = client
            .patch("computers", 4, &json!({"comment": "moved"}))
            .unwrap();
        assert_eq!(patched.status(), StatusCode::BAD_REQUEST);
        assert_eq!(patched.json().unwrap(), json!({"comment": ["too short"]}));

        let put = client.put("computers", 4, &json!({"id": 4})).unwrap();
        assert!(RestClient::is_ok(put.status()));

        let deleted = client.delete("computers", 4).unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        assert_eq!(deleted.body(), "");
    }

    #[test]
    fn test_paginate_returns_raw_page() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
            .with_status(200)
            .with_body(r#"{"count": 0, "next": null, "results": []}"#)
            .create();

        let page = client_for(&server)
            .paginate("computers", &[("page".to_string(), "3".to_string())])
            .unwrap();

        assert_eq!(page["count"], json!(0));
    }

    #[test]
    fn test_export_csv_streams_all_pages() {
        let mut server = Server::new();
        let next = format!("{}/api/v1/token/computers/?page=2", server.url());
        server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body(
                json!({"count": 2, "next": next, "results": [{"a": 1, "b": {"c": 2}}]}).to_string(),
            )
            .create();
        server
            .mock("GET", "/api/v1/token/computers/")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(r#"{"count": 2, "next": null, "results": [{"a": 3, "b": {"c": 4}}]}"#)
            .create();

        let dir = tempdir().unwrap();
        let output = dir.path().join("computers.csv");
        let rows = client_for(&server)
            .export_csv(
                "computers",
                vec![],
                &["a".to_string(), "b.c".to_string()],
                &output,
            )
            .unwrap();

        assert_eq!(rows, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "a,b.c\n1,2\n3,4\n");
    }

    #[test]
    fn test_explicit_token_wins_over_cache_file() {
        let server = Server::new();
        let home = tempdir().unwrap();
        TokenCache::new(home.path(), "admin", &server.host_with_port())
            .store("cached")
            .unwrap();

        let client = authenticating_builder(&server, &home)
            .token("explicit")
            .build()
            .unwrap();

        assert_eq!(client.credentials().token(), "explicit");
    }

    #[test]
    fn test_cache_file_wins_over_authentication() {
        let mut server = Server::new();
        let auth = server.mock("POST", "/token-auth/").expect(0).create();
        let home = tempdir().unwrap();
        TokenCache::new(home.path(), "admin", &server.host_with_port())
            .store("cached")
            .unwrap();

        let client = authenticating_builder(&server, &home).build().unwrap();

        auth.assert();
        assert_eq!(client.credentials().token(), "cached");
        assert_eq!(client.credentials().username(), "admin");
    }

    #[test]
    fn test_authentication_obtains_token() {
        let mut server = Server::new();
        let auth = server
            .mock("POST", "/token-auth/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"username": "admin", "password": "secret"})))
            .with_status(200)
            .with_body(r#"{"token": "fresh"}"#)
            .create();
        let home = tempdir().unwrap();

        let client = authenticating_builder(&server, &home).build().unwrap();

        auth.assert();
        assert_eq!(client.credentials().token(), "fresh");
        // not persisted unless asked for
        assert!(!client.token_file().unwrap().exists());
    }

    #[test]
    fn test_authentication_failure_carries_status() {
        let mut server = Server::new();
        server
            .mock("POST", "/token-auth/")
            .with_status(400)
            .with_body(r#"{"non_field_errors": ["Unable to log in"]}"#)
            .create();
        let home = tempdir().unwrap();

        let err = authenticating_builder(&server, &home).build().err().unwrap();

        assert!(matches!(err, ApiError::Authentication { status: 400 }));
    }

    #[test]
    fn test_missing_password_is_credential_error() {
        let mut server = Server::new();
        let auth = server.mock("POST", "/token-auth/").expect(0).create();
        let home = tempdir().unwrap();

        let err = RestClient::builder()
            .configuration(Configuration::default())
            .server(server.host_with_port())
            .user("admin")
            .home_dir(home.path())
            .credential_provider(StaticCredentials::new().password(""))
            .build()
            .err()
            .unwrap();

        auth.assert();
        assert!(matches!(err, ApiError::Credential));
    }

    #[test]
    fn test_username_is_prompted_when_absent() {
        let mut server = Server::new();
        server
            .mock("POST", "/token-auth/")
            .match_body(Matcher::PartialJson(json!({"username": "operator"})))
            .with_status(200)
            .with_body(r#"{"token": "t"}"#)
            .create();
        let home = tempdir().unwrap();

        let client = RestClient::builder()
            .configuration(Configuration::default())
            .server(server.host_with_port())
            .home_dir(home.path())
            .credential_provider(StaticCredentials::new().username("operator").password("pw"))
            .build()
            .unwrap();

        assert_eq!(client.credentials().username(), "operator");
    }

    #[test]
    fn test_saved_token_is_reused_by_next_client() {
        let mut server = Server::new();
        let auth = server
            .mock("POST", "/token-auth/")
            .with_status(200)
            .with_body(r#"{"token": "persisted"}"#)
            .expect(1)
            .create();
        let lookup = server
            .mock("GET", "/api/v1/token/computers/1/")
            .match_header("authorization", "Token persisted")
            .with_status(200)
            .with_body(r#"{"id": 1}"#)
            .create();
        let home = tempdir().unwrap();

        let first = authenticating_builder(&server, &home)
            .save_token(true)
            .build()
            .unwrap();
        let token_file = first.token_file().unwrap();
        assert_eq!(fs::read_to_string(&token_file).unwrap(), "persisted");

        let second = authenticating_builder(&server, &home)
            .credential_provider(StaticCredentials::new())
            .build()
            .unwrap();
        second.get("computers", 1u64).unwrap();

        auth.assert();
        lookup.assert();
    }

    #[test]
    fn test_server_taken_from_configuration() {
        let mut configuration = Configuration::default();
        configuration.set_server("configured.example.org");

        let client = RestClient::builder()
            .configuration(configuration)
            .token(TOKEN)
            .build()
            .unwrap();

        assert_eq!(client.config().server, "configured.example.org");
    }

    #[test]
    fn test_configuration_supplies_unset_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            "server: configured.example.org\nprotocol: https\napi_version: 2\nproxy:\n  https: http://proxy.example.org:3128\n",
        )
        .unwrap();
        let configuration = Configuration::load_from_file(&path).unwrap();

        let client = RestClient::builder()
            .configuration(configuration)
            .token(TOKEN)
            .build()
            .unwrap();

        assert_eq!(
            client.url("computers"),
            "https://configured.example.org/api/v2/token/computers/"
        );
        assert_eq!(
            client.config().proxy.get("https").map(String::as_str),
            Some("http://proxy.example.org:3128")
        );
    }

    #[test]
    fn test_explicit_settings_win_over_configuration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            "server: configured.example.org\nprotocol: https\napi_version: 2\nproxy:\n  https: http://proxy.example.org:3128\n",
        )
        .unwrap();
        let configuration = Configuration::load_from_file(&path).unwrap();

        let client = RestClient::builder()
            .configuration(configuration)
            .server("explicit.example.org")
            .protocol(Protocol::Http)
            .api_version(3)
            .proxy("http", "http://other.example.org:8080")
            .token(TOKEN)
            .build()
            .unwrap();

        assert_eq!(
            client.url("computers"),
            "http://explicit.example.org/api/v3/token/computers/"
        );
        assert_eq!(client.config().proxy.len(), 1);
        assert!(client.config().proxy.contains_key("http"));
    }

    #[test]
    fn test_token_and_password_are_not_logged() {
        let mut server = Server::new();
        server
            .mock("POST", "/token-auth/")
            .with_status(200)
            .with_body(r#"{"token": "s3cr3t-t0k3n"}"#)
            .create();
        let home = tempdir().unwrap();

        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || CapturedLog(sink.clone()))
            .finish();

        let client = tracing::subscriber::with_default(subscriber, || {
            authenticating_builder(&server, &home).build().unwrap()
        });
        assert_eq!(client.credentials().token(), "s3cr3t-t0k3n");

        let logs = String::from_utf8(captured.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Requesting a new token"), "{}", logs);
        assert!(!logs.contains("s3cr3t-t0k3n"), "{}", logs);
        assert!(!logs.contains("secret"), "{}", logs);
    }

    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_status_helpers() {
        assert!(RestClient::is_ok(StatusCode::OK));
        assert!(RestClient::is_created(StatusCode::CREATED));
        assert!(RestClient::is_forbidden(StatusCode::FORBIDDEN));
        assert!(!RestClient::is_created(StatusCode::OK));
    }
}
