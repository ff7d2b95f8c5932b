use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observability::{GATEWAY_REQUEST_DURATION, GATEWAY_REQUEST_ERRORS, GATEWAY_REQUESTS};
use crate::types::Message;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Sampling temperature used when the caller does not pick one.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// The model gateway: turns a session history into a single assistant reply
/// via one chat-completion round trip.
///
/// Fits the crate's error taxonomy on the way out: 401 becomes
/// [`Error::Authentication`], 429 becomes [`Error::RateLimit`], transport
/// failures and the 60-second timeout become [`Error::Connection`], and
/// everything else becomes [`Error::Unknown`] wrapping the original detail.
/// No retries are performed; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct OpenAi {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

/// Seam between the chat layer and the hosted model, so sessions can be
/// driven by a stub gateway in tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends the full ordered history and returns the generated reply text.
    async fn generate_response(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<String>;
}

impl OpenAi {
    /// Create a new gateway with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, None, None, None)
    }

    /// Create a new gateway with custom settings.
    ///
    /// The proxy, when present, is configured directly on the HTTP client
    /// rather than through process-wide environment variables.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let mut builder = ReqwestClient::builder().timeout(timeout);
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                Error::config_invalid(format!("invalid proxy URL: {e}"), Some(Box::new(e)))
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(|e| {
            Error::unknown(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout,
        })
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .expect("API key should be valid"),
        );
        headers
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Error::unknown(format!("failed to read error response: {e}")),
        };

        let error_message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| error_body.clone());

        match status_code {
            401 => Error::authentication(error_message),
            429 => Error::rate_limit(error_message, retry_after),
            _ => Error::unknown(format!("API error {status_code}: {error_message}")),
        }
    }

    async fn send_chat_completion(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}chat/completions", self.base_url);
        let params = ChatCompletionRequest {
            model,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::connection(
                        format!(
                            "request timed out after {} seconds: {e}",
                            self.timeout.as_secs()
                        ),
                        Some(Box::new(e)),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::unknown(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let completion = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            Error::unknown(format!("failed to parse response: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::unknown("response contained no choices"))
    }

    /// Issues a minimal two-message exchange and reports whether it
    /// succeeded.  Any failure of any kind is treated as "invalid"; nothing
    /// is raised and no distinction is surfaced.
    pub async fn validate_api_key(&self) -> bool {
        let probe = [Message::system("Test"), Message::user("Hello")];
        self.generate_response(&probe, DEFAULT_MODEL, DEFAULT_TEMPERATURE)
            .await
            .is_ok()
    }
}

#[async_trait]
impl ChatModel for OpenAi {
    async fn generate_response(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<String> {
        GATEWAY_REQUESTS.click();
        let start = Instant::now();
        let result = self.send_chat_completion(messages, model, temperature).await;
        GATEWAY_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            GATEWAY_REQUEST_ERRORS.click();
        }
        result
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn client_creation() {
        let client = OpenAi::new("sk-test").unwrap();
        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = OpenAi::with_options(
            "sk-test",
            Some("https://custom-api.example.com/".to_string()),
            Some(Duration::from_secs(30)),
            None,
        )
        .unwrap();
        assert_eq!(client.base_url, "https://custom-api.example.com/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn proxy_is_validated_at_construction() {
        assert!(OpenAi::with_options("sk-test", None, None, Some("http://127.0.0.1:7890")).is_ok());
        let err =
            OpenAi::with_options("sk-test", None, None, Some("not a proxy url")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn request_serializes_history_in_order() {
        let messages = vec![
            Message::system("prompt"),
            Message::user("q"),
            Message::assistant("a"),
        ];
        let params = ChatCompletionRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            temperature: DEFAULT_TEMPERATURE,
        };
        let json: serde_json::Value = serde_json::to_value(&params).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][2]["role"], "assistant");
    }

    #[tokio::test]
    async fn connection_failures_map_to_connection_errors() {
        // Nothing listens on this port; the connect phase fails immediately.
        let client = OpenAi::with_options(
            "sk-test",
            Some("http://127.0.0.1:9/".to_string()),
            Some(Duration::from_secs(5)),
            None,
        )
        .unwrap();
        let err = client
            .generate_response(
                &[Message::new(Role::User, "Hello")],
                DEFAULT_MODEL,
                DEFAULT_TEMPERATURE,
            )
            .await
            .unwrap_err();
        assert!(err.is_connection(), "expected connection error, got: {err}");
    }

    #[tokio::test]
    async fn validate_api_key_reports_failure_without_raising() {
        let client = OpenAi::with_options(
            "sk-test",
            Some("http://127.0.0.1:9/".to_string()),
            Some(Duration::from_secs(5)),
            None,
        )
        .unwrap();
        assert!(!client.validate_api_key().await);
    }
}
