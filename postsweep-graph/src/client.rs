//! Thin wrapper around the Graph API `search` edge.
//!
//! Shapes the request (type, query, field list, token) and maps provider
//! failures onto [`SweepError`]. One call per search; the `paging` cursor in
//! the reply is never followed.
use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use postsweep_common::{Result, SweepError};
use postsweep_http::{Auth, HttpClient, HttpError, RequestOpts};

use crate::SearchRequest;
use crate::types::{GraphError, SearchResponse};

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v19.0";

/// Fields requested for every post.
pub const POST_FIELDS: &str = "message,comments,likes.summary(true),shares";

// Graph error codes that mean the token was refused or not sent at all.
const INVALID_TOKEN_CODES: &[i64] = &[102, 104, 190];

/// The one external capability the extractor needs.
#[async_trait]
pub trait PostSearch: Send + Sync {
    async fn search_posts(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

#[derive(Clone)]
pub struct GraphApi {
    http: HttpClient,
    version: String,
}

impl GraphApi {
    pub fn new(base_url: &str, version: impl Into<String>) -> Result<Self> {
        let http = HttpClient::new(base_url)
            .map_err(|e| SweepError::Config(format!("graph base url: {e}")))?;
        Ok(Self {
            http,
            version: version.into().trim_matches('/').to_string(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

#[async_trait]
impl PostSearch for GraphApi {
    async fn search_posts(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("type", "post".into()),
            ("q", request.query.as_str().into()),
            ("fields", POST_FIELDS.into()),
        ];

        let mut resp: SearchResponse = self
            .http
            .get_json(
                &format!("{}/search", self.version),
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "access_token",
                        value: request.credential.as_str().into(),
                    }),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await
            .map_err(classify_http_error)?;

        if let Some(err) = resp.error.take() {
            return Err(classify_graph_error(err));
        }

        tracing::debug!(
            results = resp.data.as_ref().map(Vec::len),
            has_next_page = resp.paging.as_ref().is_some_and(|p| p.next.is_some()),
            "graph.search.response"
        );
        Ok(resp)
    }
}

fn classify_http_error(err: HttpError) -> SweepError {
    match err {
        HttpError::Api {
            status,
            message,
            code,
            ..
        } if status.as_u16() == 401 || code.is_some_and(|c| INVALID_TOKEN_CODES.contains(&c)) => {
            SweepError::Authentication(message)
        }
        other => SweepError::Request(other.to_string()),
    }
}

fn classify_graph_error(err: GraphError) -> SweepError {
    if err.code.is_some_and(|c| INVALID_TOKEN_CODES.contains(&c)) {
        SweepError::Authentication(err.message)
    } else {
        SweepError::Request(format!(
            "graph error (type={}, code={}): {}",
            err.kind.as_deref().unwrap_or("-"),
            err.code.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
            err.message
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_body_token_errors_are_authentication() {
        let err = classify_graph_error(GraphError {
            message: "Error validating access token".into(),
            kind: Some("OAuthException".into()),
            code: Some(190),
            fbtrace_id: None,
        });
        assert!(err.is_authentication());
    }

    #[test]
    fn in_body_missing_token_is_authentication() {
        let err = classify_graph_error(GraphError {
            message: "An access token is required to request this resource.".into(),
            kind: Some("OAuthException".into()),
            code: Some(104),
            fbtrace_id: None,
        });
        assert!(err.is_authentication());
    }

    #[test]
    fn other_graph_errors_are_request_errors() {
        let err = classify_graph_error(GraphError {
            message: "(#4) Application request limit reached".into(),
            kind: Some("OAuthException".into()),
            code: Some(4),
            fbtrace_id: None,
        });
        match err {
            SweepError::Request(msg) => {
                assert!(msg.contains("code=4"));
                assert!(msg.contains("request limit"));
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }

    #[test]
    fn version_slashes_are_trimmed() {
        let api = GraphApi::new(DEFAULT_BASE_URL, "/v19.0/").unwrap();
        assert_eq!(api.version(), "v19.0");
    }
}
