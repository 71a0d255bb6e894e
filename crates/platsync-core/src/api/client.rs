//! Thin client for the remote configuration API
//!
//! Every verb returns the status code and parsed JSON body without
//! failing on non-2xx responses; the sync flows decide what a 404 or a
//! 409 means for them. Only transport-level problems surface as errors.

use super::credentials::Credentials;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!("platsync/", env!("CARGO_PKG_VERSION"));

/// Page size used by [`ApiClient::get_all_rows`]
const PAGE_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid API url `{url}`: {reason}")]
    Url { url: String, reason: String },
}

/// Status plus parsed body of one API call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Failure text for reporting: the body's `error`, else `message`,
    /// else the whole body
    pub fn error_message(&self) -> String {
        error_message(&self.body)
    }

    /// The `rows` envelope most list endpoints respond with
    pub fn rows(&self) -> &[Value] {
        self.body
            .get("rows")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first_row(&self) -> Option<&Value> {
        self.rows().first()
    }
}

pub fn error_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Client for the remote configuration API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    secret: String,
    bearer_token: String,
}

impl ApiClient {
    pub fn new(credentials: &Credentials) -> Result<Self, ApiError> {
        let base_url = Url::parse(&credentials.url).map_err(|e| ApiError::Url {
            url: credentials.url.clone(),
            reason: e.to_string(),
        })?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            http,
            base_url,
            secret: credentials.secret.clone(),
            bearer_token: credentials.bearer_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url {
                url: self.base_url.to_string(),
                reason: "URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse, ApiError> {
        let mut request = request.header("x-api-secret", &self.secret);
        if !self.bearer_token.is_empty() {
            request = request.bearer_auth(&self.bearer_token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.http.get(url).query(query)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.http.post(url).json(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.http.patch(url).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.http.delete(url)).await
    }

    /// Drain a paginated listing. Pages are requested sequentially with
    /// `limit`/`skip` until the reported `total` is reached or a page
    /// comes back without rows. API-level errors are logged and end the
    /// listing with whatever was collected.
    pub async fn get_all_rows(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<Value>, ApiError> {
        let mut all_rows = Vec::new();
        let mut skip = 0usize;

        loop {
            let mut page_query: Vec<(&str, String)> = query.to_vec();
            let limit = PAGE_LIMIT.to_string();
            let skip_value = skip.to_string();
            page_query.push(("limit", limit));
            page_query.push(("skip", skip_value));

            let response = self.get(path, &page_query).await?;

            if let Some(error) = response.body.get("error").and_then(Value::as_str) {
                eprintln!("API Error: {}.", error);
                tracing::error!(path, error, "listing failed");
            }

            let rows = response.rows();
            if rows.is_empty() {
                break;
            }
            all_rows.extend(rows.iter().cloned());
            skip += PAGE_LIMIT;

            let total = response
                .body
                .get("total")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;
            if all_rows.len() >= total {
                break;
            }
        }

        Ok(all_rows)
    }

    /// Ping the API root; used before any flow touches the network
    pub async fn verify_connection(&self) -> Result<(), ApiError> {
        self.send(self.http.get(self.base_url.clone())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::new(&Credentials {
            url: "http://localhost:3005".to_string(),
            secret: "s".to_string(),
            bearer_token: "t".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn endpoints_join_against_the_base_url() {
        let api = client();
        assert_eq!(
            api.endpoint("v1/common-models").unwrap().as_str(),
            "http://localhost:3005/v1/common-models"
        );
        assert_eq!(
            api.endpoint("v1/common-models/abc123").unwrap().as_str(),
            "http://localhost:3005/v1/common-models/abc123"
        );
    }

    #[test]
    fn error_message_prefers_error_then_message_then_body() {
        assert_eq!(
            error_message(&json!({ "error": "boom", "message": "other" })),
            "boom"
        );
        assert_eq!(error_message(&json!({ "message": "other" })), "other");
        assert_eq!(error_message(&json!({ "status": 500 })), r#"{"status":500}"#);
    }

    #[test]
    fn rows_envelope_is_tolerated_when_absent() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: json!({ "something": "else" }),
        };
        assert!(response.rows().is_empty());
        assert!(response.first_row().is_none());

        let response = ApiResponse {
            status: StatusCode::OK,
            body: json!({ "rows": [{ "_id": "1" }], "total": 1 }),
        };
        assert_eq!(response.rows().len(), 1);
        assert_eq!(response.first_row().unwrap()["_id"], "1");
    }
}
