//! Headline backends: one `HeadlineBackend` implementation per contract

pub mod chat;
pub mod mock;
pub mod text_generation;

use async_trait::async_trait;
use log::{debug, error, trace};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use crate::normalize::normalize;
use crate::request::{GenerationRequest, GenerationResult};

// Re-export for convenience
pub use chat::ChatCompletionBackend;
pub use mock::MockBackend;
pub use text_generation::TextGenerationBackend;

/// A text-generation backend.
///
/// Implementations never return errors: transport, HTTP and payload
/// problems all come back as `GenerationResult::Failure`.
#[async_trait]
pub trait HeadlineBackend: Send + Sync
{   /// Short name for logs
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest)
      -> GenerationResult;
}

/// Authenticated JSON POST shared by the remote backends
#[derive(Clone)]
pub struct HttpTransport
{   http_client: reqwest::Client
  , endpoint: String
  , api_token: String
}

impl HttpTransport
{   pub fn new(endpoint: String, api_token: String) -> Self
    {   debug!("Creating HttpTransport for {}", endpoint);
        HttpTransport
        {   http_client: reqwest::Client::new()
          , endpoint
          , api_token
        }
    }

    /// POST `body`, then classify and normalize whatever comes back
    pub async fn post_json<B: Serialize + Sync>(&self, body: &B)
      -> GenerationResult
    {   let response = match self.http_client
          .post(&self.endpoint)
          .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
          .header(CONTENT_TYPE, "application/json")
          .json(body)
          .send()
          .await
        {   Ok(response) => response
          , Err(e) => {
              error!("HTTP error: {}", e);
              return GenerationResult::network_error(e.to_string());
            }
        };

        let status = response.status();
        trace!("Response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Provider error {}: {}", status, error_text);
            return GenerationResult::provider_error(
              status.as_u16(),
              &error_text
            );
        }

        let text = match response.text().await
        {   Ok(text) => text
          , Err(e) => {
              error!("Failed to read response body: {}", e);
              return GenerationResult::network_error(e.to_string());
            }
        };
        trace!("Response body: {}", text);

        match serde_json::from_str::<serde_json::Value>(&text)
        {   Ok(body) => normalize(&body)
          , Err(e) => {
              error!("Parse error: {}", e);
              GenerationResult::network_error(
                format!("Malformed JSON response: {}", e)
              )
            }
        }
    }
}
