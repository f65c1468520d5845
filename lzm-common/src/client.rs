//! Recommendation backend HTTP client
//!
//! Thin wrapper over the three endpoints the client consumes:
//! - `POST /api/recommend`
//! - `GET /api/species/{name}`
//! - `GET /api/species/list?q=&difficulty=&limit=`
//!
//! No timeout or cancellation is applied; failures surface as [`ApiError`].

use crate::models::{
    RecommendRequest, RecommendationResponse, SpeciesListResponse, SpeciesRecord,
};
use serde::Deserialize;
use thiserror::Error;

const USER_AGENT: &str = concat!("lizardmatch-client/", env!("CARGO_PKG_VERSION"));

/// Backend client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success status; `message` is already user-facing
    #[error("API error {status}: {message}")]
    Http {
        status: u16,
        message: String,
        code: Option<String>,
        body: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            ApiError::NotFound(what) => format!("찾을 수 없습니다: {}", what),
            ApiError::Network(msg) | ApiError::Parse(msg) => msg.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Backend error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Derive a user-facing message and error code from a failed response body
///
/// Prefers the envelope's `error.message`, then a non-empty plain-text body,
/// then a generic `서버 오류 ({status})`.
pub fn describe_error_body(status: u16, body: &str) -> (String, Option<String>) {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let code = envelope.error.code;
        if let Some(message) = envelope.error.message.filter(|m| !m.trim().is_empty()) {
            return (message, code);
        }
        return (format!("서버 오류 ({})", status), code);
    }

    let text = body.trim();
    if !text.is_empty() {
        return (text.to_string(), None);
    }

    (format!("서버 오류 ({})", status), None)
}

/// Query for `GET /api/species/list`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesListQuery {
    pub q: Option<String>,
    pub difficulty: Option<String>,
    pub limit: u32,
}

impl SpeciesListQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        if let Some(d) = self.difficulty.as_deref().filter(|d| !d.is_empty()) {
            params.push(("difficulty", d.to_string()));
        }
        params.push(("limit", self.limit.to_string()));
        params
    }
}

/// Successful recommendation: the body as received plus its parsed form
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub raw: String,
    pub response: RecommendationResponse,
}

/// Recommendation backend client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit weighted preferences
    pub async fn recommend(&self, request: &RecommendRequest) -> Result<Recommendation, ApiError> {
        let url = format!("{}/api/recommend", self.base_url);
        tracing::debug!(url = %url, top_n = request.options.top_n, "Requesting recommendations");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "Recommend request failed");
            let (message, code) = describe_error_body(status.as_u16(), &body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
                code,
                body,
            });
        }

        let parsed: RecommendationResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))?;

        tracing::info!(results = parsed.results.len(), "Received recommendations");

        Ok(Recommendation {
            raw: body,
            response: parsed,
        })
    }

    /// Fetch one species' detail record
    pub async fn species_detail(&self, name: &str) -> Result<SpeciesRecord, ApiError> {
        let url = format!("{}/api/species/{}", self.base_url, urlencoding::encode(name));
        tracing::debug!(species = %name, url = %url, "Fetching species detail");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(ApiError::NotFound(name.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (message, code) = describe_error_body(status.as_u16(), &body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
                code,
                body,
            });
        }

        response
            .json::<SpeciesRecord>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Fetch the filtered species list
    pub async fn species_list(&self, query: &SpeciesListQuery) -> Result<SpeciesListResponse, ApiError> {
        let url = format!("{}/api/species/list", self.base_url);
        tracing::debug!(url = %url, q = ?query.q, difficulty = ?query.difficulty, "Fetching species list");

        let response = self
            .http_client
            .get(&url)
            .query(&query.params())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (message, code) = describe_error_body(status.as_u16(), &body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
                code,
                body,
            });
        }

        response
            .json::<SpeciesListResponse>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error_envelope() {
        let (msg, code) = describe_error_body(500, r#"{"error":{"message":"internal","code":"INTERNAL_ERROR"}}"#);
        assert_eq!(msg, "internal");
        assert_eq!(code.as_deref(), Some("INTERNAL_ERROR"));
    }

    #[test]
    fn test_describe_plain_text() {
        let (msg, code) = describe_error_body(502, "Bad Gateway\n");
        assert_eq!(msg, "Bad Gateway");
        assert!(code.is_none());
    }

    #[test]
    fn test_describe_empty_body() {
        let (msg, _) = describe_error_body(503, "");
        assert_eq!(msg, "서버 오류 (503)");
    }

    #[test]
    fn test_describe_envelope_without_message() {
        let (msg, code) = describe_error_body(400, r#"{"error":{"code":"INVALID_INPUT"}}"#);
        assert_eq!(msg, "서버 오류 (400)");
        assert_eq!(code.as_deref(), Some("INVALID_INPUT"));
    }

    #[test]
    fn test_list_query_params_skip_empty_filters() {
        let query = SpeciesListQuery {
            q: Some(String::new()),
            difficulty: Some("2".into()),
            limit: 500,
        };
        assert_eq!(
            query.params(),
            vec![("difficulty", "2".to_string()), ("limit", "500".to_string())]
        );
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_http_error_user_message() {
        let err = ApiError::Http {
            status: 500,
            message: "internal".into(),
            code: None,
            body: String::new(),
        };
        assert_eq!(err.user_message(), "internal");
        assert_eq!(err.status(), Some(500));
    }
}
