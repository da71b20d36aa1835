use std::collections::BTreeMap;
use async_trait::async_trait;
use log::{debug, trace};
use serde::Serialize;

use crate::config::BackendConfig;
use crate::error::Error;
use crate::providers::{HeadlineBackend, HttpTransport};
use crate::request::{GenerationRequest, GenerationResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextGenerationRequest<'a>
{   pub inputs: &'a str
  , pub parameters: &'a BTreeMap<String, serde_json::Value>
}

/// Text-generation backend (Hugging Face Inference style)
pub struct TextGenerationBackend
{   transport: HttpTransport
}

impl TextGenerationBackend
{   pub fn new(endpoint: String, api_token: String) -> Self
    {   debug!("Creating TextGenerationBackend for {}", endpoint);
        TextGenerationBackend
        {   transport: HttpTransport::new(endpoint, api_token)
        }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, Error>
    {   let api_token = config.require_token()?;
        Ok(Self::new(config.endpoint(), api_token))
    }
}

#[async_trait]
impl HeadlineBackend for TextGenerationBackend
{   fn name(&self) -> &'static str
    {   "text-generation"
    }

    async fn generate(&self, request: &GenerationRequest)
      -> GenerationResult
    {   let body = TextGenerationRequest
        {   inputs: &request.formatted_prompt
          , parameters: &request.parameters
        };
        trace!("Text generation request: {:?}", body);
        self.transport.post_json(&body).await
    }
}
