//! Lazy iteration over paginated list endpoints.
//!
//! List responses look like `{"count": n, "next": url|null, "results": [...]}`.
//! [`Pages`] fetches one page, hands out its elements, and only then follows
//! `next`. At most one page is held in memory.

use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::{
    error::ApiError,
    http_utils::{is_acceptable, read_json, HttpClient},
    model::Params,
};

/// One decoded page of a list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub results: Vec<Value>,
    pub next: Option<String>,
}

impl Page {
    /// Split a list response into its elements and the next-page cursor
    ///
    /// A bare JSON array is accepted as a single, final page.
    pub fn from_value(value: Value) -> Result<Page, ApiError> {
        match value {
            Value::Array(results) => Ok(Page {
                results,
                next: None,
            }),
            Value::Object(mut map) => {
                let results = match map.remove("results") {
                    Some(Value::Array(results)) => results,
                    _ => {
                        return Err(ApiError::UnexpectedResponse(
                            "list response without results".to_string(),
                        ))
                    }
                };
                let next = match map.remove("next") {
                    Some(Value::String(next)) if !next.is_empty() => Some(next),
                    _ => None,
                };
                Ok(Page { results, next })
            }
            _ => Err(ApiError::UnexpectedResponse(
                "list response is neither an object nor an array".to_string(),
            )),
        }
    }
}

/// Iterator over every element of a list endpoint, across pages
///
/// Yields `Err` once and then stops if a page cannot be fetched or decoded.
pub struct Pages<'a> {
    http: &'a HttpClient,
    token: &'a str,
    next_url: Option<String>,
    // sent with the first request only; `next` URLs already carry the query
    query: Params,
    current: std::vec::IntoIter<Value>,
    pages_fetched: usize,
}

impl<'a> Pages<'a> {
    pub(crate) fn new(http: &'a HttpClient, token: &'a str, url: String, query: Params) -> Self {
        Self {
            http,
            token,
            next_url: Some(url),
            query,
            current: Vec::new().into_iter(),
            pages_fetched: 0,
        }
    }

    /// True while buffered elements remain or another page is announced
    pub fn has_more(&self) -> bool {
        self.current.len() > 0 || self.next_url.is_some()
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch(&mut self, url: String) -> Result<(), ApiError> {
        let query = std::mem::take(&mut self.query);
        let response = self.http.get(&url, &query, Some(self.token))?;
        let status = response.status();
        if !is_acceptable(status) {
            debug!("Pagination aborted at {} with status {}", url, status);
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }

        let page = Page::from_value(read_json(response)?)?;
        self.pages_fetched += 1;
        trace!(
            "Page {} holds {} elements",
            self.pages_fetched,
            page.results.len()
        );

        self.next_url = match page.next {
            Some(next) => Some(resolve_next(&url, &next)?),
            None => None,
        };
        self.current = page.results.into_iter();
        Ok(())
    }
}

/// Absolute URL of the next page; relative cursors are resolved against the current page
fn resolve_next(current: &str, next: &str) -> Result<String, ApiError> {
    let base = Url::parse(current)
        .map_err(|e| ApiError::UnexpectedResponse(format!("invalid page URL {}: {}", current, e)))?;
    base.join(next)
        .map(String::from)
        .map_err(|e| ApiError::UnexpectedResponse(format!("invalid next URL {}: {}", next, e)))
}

impl Iterator for Pages<'_> {
    type Item = Result<Value, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.current.next() {
                return Some(Ok(element));
            }
            let url = self.next_url.take()?;
            if let Err(e) = self.fetch(url) {
                return Some(Err(e));
            }
        }
    }
}
