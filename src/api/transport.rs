//! HTTP transport used by the API client
//!
//! [`Transport`] is the seam between the client and the network. The default
//! [`UreqTransport`] runs blocking `ureq` calls on tokio's blocking pool.

use crate::api::error::ApiError;
use async_trait::async_trait;

/// Smallest body size a response may reach before reading it fails
pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

/// Room allowed per record when sizing the body limit for a page size
pub const BODY_BYTES_PER_RECORD: u64 = 4 * 1024;

/// Body limit for pages of `limit` records
pub fn body_limit_for(limit: u64) -> u64 {
    limit
        .saturating_mul(BODY_BYTES_PER_RECORD)
        .max(DEFAULT_BODY_LIMIT)
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx success class
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues HTTP requests
///
/// Implementations return `Ok` for every response that arrived in full,
/// whatever its status; `Err` is reserved for requests that produced no
/// response, or whose body could not be read.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, ApiError>;

    /// POST `form` as `application/x-www-form-urlencoded`
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<HttpResponse, ApiError>;
}

/// `ureq`-backed transport
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_body_limit(DEFAULT_BODY_LIMIT)
    }

    pub fn with_body_limit(body_limit: u64) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            body_limit,
        }
    }

    pub fn body_limit(&self) -> u64 {
        self.body_limit
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let limit = self.body_limit;
        tokio::task::spawn_blocking(move || {
            let resp = agent
                .get(&url)
                .call()
                .map_err(|e| ApiError::request_failed(format!("GET {} failed: {}", url, e)))?;
            read_response(&url, resp, limit)
        })
        .await
        .map_err(|e| ApiError::request_failed(format!("request task failed: {}", e)))?
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let form = form.to_vec();
        let limit = self.body_limit;
        tokio::task::spawn_blocking(move || {
            let resp = agent
                .post(&url)
                .send_form(form)
                .map_err(|e| ApiError::request_failed(format!("POST {} failed: {}", url, e)))?;
            read_response(&url, resp, limit)
        })
        .await
        .map_err(|e| ApiError::request_failed(format!("request task failed: {}", e)))?
    }
}

fn read_response(
    url: &str,
    mut resp: ureq::http::Response<ureq::Body>,
    limit: u64,
) -> Result<HttpResponse, ApiError> {
    let status = resp.status().as_u16();
    let body = resp
        .body_mut()
        .with_config()
        .limit(limit)
        .read_to_string()
        .map_err(|e| {
            ApiError::request_failed(format!("reading body of {} failed: {}", url, e))
        })?;
    Ok(HttpResponse { status, body })
}

/// In-memory transport for tests
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) const MOCK_BASE: &str = "http://lg.test";

    struct MockReply {
        response: HttpResponse,
        delay: Duration,
    }

    /// Replies are queued per path-and-query and served in order
    #[derive(Default)]
    pub(crate) struct MockTransport {
        replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(self, path: &str, status: u16, body: &str) -> Self {
            self.reply_after(path, status, body, 0)
        }

        pub(crate) fn reply_after(
            self,
            path: &str,
            status: u16,
            body: &str,
            delay_ms: u64,
        ) -> Self {
            self.replies
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .push_back(MockReply {
                    response: HttpResponse::new(status, body),
                    delay: Duration::from_millis(delay_ms),
                });
            self
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, ApiError> {
            let path = url.strip_prefix(MOCK_BASE).unwrap_or(url).to_string();
            self.requests.lock().unwrap().push(path.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(&path)
                .and_then(|q| q.pop_front());
            match reply {
                Some(reply) => {
                    if !reply.delay.is_zero() {
                        tokio::time::sleep(reply.delay).await;
                    }
                    Ok(reply.response)
                }
                None => Err(ApiError::request_failed(format!("no mock reply for {}", path))),
            }
        }

        /// Logged as `POST <path> <k=v&..>`; replies are looked up by path
        async fn post_form(
            &self,
            url: &str,
            form: &[(String, String)],
        ) -> Result<HttpResponse, ApiError> {
            let path = url.strip_prefix(MOCK_BASE).unwrap_or(url).to_string();
            let encoded = form
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            self.requests
                .lock()
                .unwrap()
                .push(format!("POST {} {}", path, encoded));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(&format!("POST {}", path))
                .and_then(|q| q.pop_front());
            match reply {
                Some(reply) => Ok(reply.response),
                None => Err(ApiError::request_failed(format!(
                    "no mock reply for POST {}",
                    path
                ))),
            }
        }
    }
}
