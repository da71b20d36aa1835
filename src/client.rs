//! Generation client: owns the configured backend and runs one
//! bio -> headline pipeline per call

use std::sync::Arc;
use log::{debug, info, warn};

use crate::config::BackendConfig;
use crate::error::Error;
use crate::prompt::build_request;
use crate::providers::{
  ChatCompletionBackend, HeadlineBackend, MockBackend, TextGenerationBackend
};
use crate::request::{GenerationRequest, GenerationResult};
use crate::Provider;

/// Cheap to clone; clones share the backend and its HTTP pool
#[derive(Clone)]
pub struct GenerationClient
{   config: Arc<BackendConfig>
  , backend: Arc<dyn HeadlineBackend>
}

impl GenerationClient
{   /// Build the backend selected by `config.provider`
    pub fn new(config: BackendConfig) -> Result<Self, Error>
    {   config.validate()?;
        let backend: Arc<dyn HeadlineBackend> = match config.provider
        {   Provider::ChatCompletion => {
              Arc::new(ChatCompletionBackend::from_config(&config)?)
            }
          , Provider::TextGeneration => {
              Arc::new(TextGenerationBackend::from_config(&config)?)
            }
          , Provider::Mock => Arc::new(MockBackend::from_config(&config))
        };
        info!("Generation client using {} backend", backend.name());
        Ok(GenerationClient
        {   config: Arc::new(config)
          , backend
        })
    }

    /// Use a caller-supplied backend. Only the template is checked:
    /// endpoint and token belong to the backend, but `config` still
    /// drives formatting.
    pub fn with_backend(
      config: BackendConfig
    , backend: Arc<dyn HeadlineBackend>
    ) -> Result<Self, Error>
    {   config.template.validate()?;
        debug!("Generation client with custom {} backend", backend.name());
        Ok(GenerationClient
        {   config: Arc::new(config)
          , backend
        })
    }

    pub fn backend_name(&self) -> &'static str
    {   self.backend.name()
    }

    /// Format `raw_input` for this client's backend
    pub fn prepare(&self, raw_input: &str)
      -> Result<GenerationRequest, Error>
    {   build_request(raw_input, &self.config)
    }

    /// Send an already built request
    pub async fn generate(&self, request: &GenerationRequest)
      -> GenerationResult
    {   debug!(
          "Generating via {} ({} chars of input)",
          self.backend.name(),
          request.raw_input.len()
        );
        let result = self.backend.generate(request).await;
        if let GenerationResult::Failure { kind, detail } = &result
        {   warn!("Generation failed ({}): {}", kind, detail);
        }
        result
    }

    /// Format and send. Empty input is `Err(Error::Validation)` and
    /// never reaches the backend.
    pub async fn generate_headline(&self, raw_input: &str)
      -> Result<GenerationResult, Error>
    {   let request = self.prepare(raw_input)?;
        Ok(self.generate(&request).await)
    }
}
