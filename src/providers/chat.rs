use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::Error;
use crate::providers::{HeadlineBackend, HttpTransport};
use crate::request::{GenerationRequest, GenerationResult};

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>
}

// ===== Backend =====

/// Chat-completions backend (OpenRouter and OpenAI-compatible APIs)
pub struct ChatCompletionBackend
{   transport: HttpTransport
  , model: String
}

impl ChatCompletionBackend
{   pub fn new(endpoint: String, api_token: String, model: String) -> Self
    {   debug!("Creating ChatCompletionBackend for model: {}", model);
        ChatCompletionBackend
        {   transport: HttpTransport::new(endpoint, api_token)
          , model
        }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, Error>
    {   let api_token = config.require_token()?;
        Ok(Self::new(config.endpoint(), api_token, config.model()))
    }

    /// Request body for `request`; the model falls back to the
    /// backend's own when the request carries none
    pub fn chat_body(&self, request: &GenerationRequest)
      -> ChatCompletionRequest
    {   let model = request.parameter("model")
          .and_then(|v| v.as_str())
          .unwrap_or(self.model.as_str())
          .to_string();

        ChatCompletionRequest
        {   model
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: request.formatted_prompt.clone()
              }
            ]
          , max_tokens: request.parameter("max_tokens")
              .and_then(|v| v.as_u64())
          , temperature: request.parameter("temperature")
              .and_then(|v| v.as_f64())
        }
    }
}

#[async_trait]
impl HeadlineBackend for ChatCompletionBackend
{   fn name(&self) -> &'static str
    {   "chat-completion"
    }

    async fn generate(&self, request: &GenerationRequest)
      -> GenerationResult
    {   let body = self.chat_body(request);
        trace!("Chat request: {:?}", body);
        self.transport.post_json(&body).await
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::prompt::build_request;
    use crate::request::FailureKind;
    use mockito::Matcher;
    use serde_json::json;

    fn backend_for(server: &mockito::ServerGuard) -> ChatCompletionBackend
    {   ChatCompletionBackend::new(
          format!("{}/api/v1/chat/completions", server.url()),
          "sk-test".to_string(),
          "test/model".to_string()
        )
    }

    fn request(bio: &str) -> GenerationRequest
    {   build_request(bio, &BackendConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_token_and_chat_body()
    {   let mut server = mockito::Server::new_async().await;
        let req = request("Staff engineer, distributed systems");
        let mock = server
          .mock("POST", "/api/v1/chat/completions")
          .match_header("authorization", "Bearer sk-test")
          .match_header("content-type", "application/json")
          .match_body(Matcher::PartialJson(json!({
            "model": crate::config::DEFAULT_CHAT_MODEL,
            "messages": [{ "role": "user", "content": req.formatted_prompt }]
          })))
          .with_status(200)
          .with_header("content-type", "application/json")
          .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Growth-Driven Product Leader"}}]}"#)
          .create_async()
          .await;

        let result = backend_for(&server).generate(&req).await;
        assert_eq!(result.headline(), Some("Growth-Driven Product Leader"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_provider_error_with_body()
    {   let mut server = mockito::Server::new_async().await;
        let _m = server
          .mock("POST", "/api/v1/chat/completions")
          .with_status(500)
          .with_body("rate limited")
          .create_async()
          .await;

        let result = backend_for(&server).generate(&request("bio")).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::ProviderError));
        assert!(result.display_text().contains("500"));
        assert!(result.display_text().contains("rate limited"));
    }

    #[tokio::test]
    async fn malformed_json_is_network_error()
    {   let mut server = mockito::Server::new_async().await;
        let _m = server
          .mock("POST", "/api/v1/chat/completions")
          .with_status(200)
          .with_body("{ not json")
          .create_async()
          .await;

        let result = backend_for(&server).generate(&request("bio")).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::NetworkError));
    }

    #[test]
    fn body_falls_back_to_backend_model()
    {   let backend = ChatCompletionBackend::new(
          "http://localhost".to_string(),
          "sk-test".to_string(),
          "fallback/model".to_string()
        );
        let req = build_request("bio", &BackendConfig::mock()).unwrap();
        let body = backend.chat_body(&req);
        assert_eq!(body.model, "fallback/model");
        assert_eq!(body.max_tokens, None);
        assert_eq!(body.messages.len(), 1);
    }

    #[test]
    fn configured_temperature_is_sent_unchanged()
    {   let config = BackendConfig
        {   api_token: Some("sk-test".to_string())
          , max_tokens: Some(64)
          , temperature: Some(0.7)
          , ..BackendConfig::default()
        };
        let backend = ChatCompletionBackend::from_config(&config).unwrap();
        let req = build_request("bio", &config).unwrap();

        let body = serde_json::to_value(backend.chat_body(&req)).unwrap();
        assert_eq!(body, json!({
          "model": crate::config::DEFAULT_CHAT_MODEL,
          "messages": [{ "role": "user", "content": req.formatted_prompt }],
          "max_tokens": 64,
          "temperature": 0.7
        }));
        let text = serde_json::to_string(&backend.chat_body(&req)).unwrap();
        assert!(text.contains("\"temperature\":0.7"), "body: {}", text);
    }
}
