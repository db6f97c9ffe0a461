//! Telegram Bot API notifier

use async_trait::async_trait;
use careers_watch_domain::{Notifier, NotifyError};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram rejects messages longer than this many characters
const MAX_MESSAGE_CHARS: usize = 4096;

/// Sends reports to a single Telegram chat through a bot
pub struct TelegramNotifier {
    client: Client,
    token: SecretString,
    chat_id: String,
    api_base: String,
    enabled: bool,
}

impl TelegramNotifier {
    pub fn with_api_base(
        token: SecretString,
        chat_id: String,
        api_base: String,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token,
            chat_id,
            api_base: api_base.trim_end_matches('/').to_string(),
            enabled: true,
        })
    }

    /// Create a disabled notifier (notifications turned off)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            token: SecretString::new("".into()),
            chat_id: String::new(),
            api_base: String::new(),
            enabled: false,
        }
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.token.expose_secret()
        );

        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: true,
        };

        // The token is part of the URL, so errors are reported without it
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().await.ok();
        let description = body
            .as_ref()
            .and_then(|b| b.description.clone())
            .unwrap_or_else(|| status.to_string());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            return Err(NotifyError::Auth(description));
        }

        match body {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            _ => Err(NotifyError::Api(description)),
        }
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::Disabled);
        }

        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            self.send_message(chunk).await?;
            tracing::debug!(part = index + 1, total = total, "Sent Telegram message");
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn channel(&self) -> &'static str {
        "telegram"
    }
}

/// Split text into chunks of at most `max_chars` characters, on line breaks where possible
fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let mut line = line;
        let mut line_len = line.chars().count();

        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        // A single line longer than the limit is hard-split
        while line_len > max_chars {
            let split_at = line
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            chunks.push(line[..split_at].to_string());
            line = &line[split_at..];
            line_len -= max_chars;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer) -> TelegramNotifier {
        TelegramNotifier::with_api_base(
            SecretString::new("test-token".into()),
            "42".to_string(),
            server.uri(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_disabled_notifier() {
        let notifier = TelegramNotifier::disabled();

        assert!(!notifier.is_enabled());
        assert_eq!(notifier.channel(), "telegram");
        assert!(matches!(
            notifier.notify("Changes found:\n").await,
            Err(NotifyError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_notify_posts_send_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bottest-token/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "42",
                "text": "Changes found:\n"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 1}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        notifier(&mock_server)
            .notify("Changes found:\n")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized"
            })))
            .mount(&mock_server)
            .await;

        let result = notifier(&mock_server).notify("hello").await;

        assert!(matches!(result, Err(NotifyError::Auth(msg)) if msg == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_rejected_message_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&mock_server)
            .await;

        let result = notifier(&mock_server).notify("hello").await;

        assert!(matches!(result, Err(NotifyError::Api(msg)) if msg.contains("chat not found")));
    }

    #[tokio::test]
    async fn test_long_report_is_sent_in_parts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let line = format!("- {}:\n", "x".repeat(97));
        let report = line.repeat(50);

        notifier(&mock_server).notify(&report).await.unwrap();
    }

    #[test]
    fn test_split_message_short_text_untouched() {
        assert_eq!(split_message("a\nb\n", 10), vec!["a\nb\n"]);
    }

    #[test]
    fn test_split_message_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc\n", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc\n"]);
    }

    #[test]
    fn test_split_message_hard_splits_long_line() {
        let chunks = split_message("abcdefghij\n", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij\n"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
    }
}
