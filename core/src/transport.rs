//! Blocking transport backed by `ureq`.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Executes requests with a shared `ureq::Agent`.
///
/// The agent has ureq's automatic status-code-as-error behavior disabled so
/// 4xx/5xx responses come back as data and the client can read the envelope.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.path.as_str();
        let body = request.body.unwrap_or_default();
        let headers = &request.headers;
        tracing::debug!(method = request.method.as_str(), url, "sending request");

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete => {
                let mut builder = match request.method {
                    HttpMethod::Post => self.agent.post(url),
                    HttpMethod::Put => self.agent.put(url),
                    _ => self.agent.delete(url).force_send_body(),
                };
                for (name, value) in headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(body.as_bytes())
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
