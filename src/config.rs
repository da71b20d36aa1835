//! Backend configuration, loaded once at process start and injected
//! into the generation client

use std::path::Path;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::prompt::HeadlineTemplate;
use crate::Provider;

pub const DEFAULT_CHAT_URL: &str
  = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str
  = "google/gemini-2.0-pro-exp-02-05:free";
pub const TEXT_GENERATION_BASE: &str
  = "https://api-inference.huggingface.co/models";
pub const DEFAULT_TEXT_GENERATION_MODEL: &str
  = "mistralai/Mistral-7B-Instruct-v0.2";

pub const ENV_PROVIDER: &str = "HEADLINE_PROVIDER";
pub const ENV_API_URL: &str = "HEADLINE_API_URL";
pub const ENV_API_TOKEN: &str = "HEADLINE_API_TOKEN";
pub const ENV_MODEL: &str = "HEADLINE_MODEL";
pub const ENV_MAX_TOKENS: &str = "HEADLINE_MAX_TOKENS";
pub const ENV_TEMPERATURE: &str = "HEADLINE_TEMPERATURE";
pub const ENV_MOCK_LATENCY_MS: &str = "HEADLINE_MOCK_LATENCY_MS";

/// Backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig
{   /// Which backend contract to speak
    pub provider: Provider
  , /// Endpoint URL; falls back to the provider default
    pub api_url: Option<String>
  , /// Bearer token; required by remote providers
    pub api_token: Option<String>
  , /// Model identifier; falls back to the provider default
    pub model: Option<String>
  , /// Max tokens to generate
    pub max_tokens: Option<usize>
  , /// Temperature for sampling
    pub temperature: Option<f64>
  , /// Artificial latency of the mock backend in milliseconds
    pub mock_latency_ms: Option<u64>
  , /// Prompt template settings
    pub template: HeadlineTemplate
}

impl Default for BackendConfig
{   fn default() -> Self
    {   BackendConfig
        {   provider: Provider::ChatCompletion
          , api_url: None
          , api_token: None
          , model: None
          , max_tokens: None
          , temperature: None
          , mock_latency_ms: None
          , template: HeadlineTemplate::default()
        }
    }
}

impl BackendConfig
{   /// Offline configuration backed by the mock provider
    pub fn mock() -> Self
    {   BackendConfig
        {   provider: Provider::Mock
          , ..BackendConfig::default()
        }
    }

    /// Load from the process environment.
    /// Call once at startup; the result is immutable afterwards.
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup (the environment, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let provider = match lookup(ENV_PROVIDER)
        {   Some(name) => Provider::from_name(&name)
              .ok_or_else(|| {
                error!("Unknown provider: {}", name);
                Error::InvalidConfiguration(
                  format!("unknown {}: {}", ENV_PROVIDER, name)
                )
              })?
          , None => Provider::ChatCompletion
        };
        debug!("Loading backend config for {:?}", provider);

        let config = BackendConfig
        {   provider
          , api_url: lookup(ENV_API_URL)
          , api_token: lookup(ENV_API_TOKEN)
          , model: lookup(ENV_MODEL)
          , max_tokens: parse_opt(&lookup, ENV_MAX_TOKENS)?
          , temperature: parse_opt(&lookup, ENV_TEMPERATURE)?
          , mock_latency_ms: parse_opt(&lookup, ENV_MOCK_LATENCY_MS)?
          , template: HeadlineTemplate::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file with the same field names
    pub fn from_json_file(path: impl AsRef<Path>)
      -> Result<Self, Error>
    {   let path = path.as_ref();
        debug!("Loading backend config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
          Error::InvalidConfiguration(
            format!("cannot read {}: {}", path.display(), e)
          )
        })?;
        let config: BackendConfig = serde_json::from_str(&text)
          .map_err(|e| {
            Error::InvalidConfiguration(
              format!("cannot parse {}: {}", path.display(), e)
            )
          })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that remote providers have an endpoint and a token
    pub fn validate(&self) -> Result<(), Error>
    {   self.template.validate()?;
        if self.provider == Provider::Mock
        {   return Ok(());
        }
        let url = self.endpoint();
        if !(url.starts_with("https://") || url.starts_with("http://"))
        {   return Err(Error::InvalidConfiguration(
              format!("endpoint is not an http(s) URL: {}", url)
            ));
        }
        self.require_token().map(|_| ())
    }

    /// The bearer token, or an error naming the missing variable
    pub fn require_token(&self) -> Result<String, Error>
    {   self.api_token
          .clone()
          .filter(|token| !token.trim().is_empty())
          .ok_or_else(|| {
            error!("No API token for {:?}", self.provider);
            Error::InvalidConfiguration(
              format!("{} is required for {:?}", ENV_API_TOKEN, self.provider)
            )
          })
    }

    /// Model identifier, falling back to the provider default
    pub fn model(&self) -> String
    {   match (&self.model, &self.provider)
        {   (Some(model), _) => model.clone()
          , (None, Provider::TextGeneration) => {
              DEFAULT_TEXT_GENERATION_MODEL.to_string()
            }
          , (None, Provider::ChatCompletion) => {
              DEFAULT_CHAT_MODEL.to_string()
            }
          , (None, Provider::Mock) => "mock".to_string()
        }
    }

    /// Endpoint URL, falling back to the provider default
    pub fn endpoint(&self) -> String
    {   if let Some(url) = &self.api_url
        {   return url.clone();
        }
        match self.provider
        {   Provider::ChatCompletion => DEFAULT_CHAT_URL.to_string()
          , Provider::TextGeneration => {
              format!("{}/{}", TEXT_GENERATION_BASE, self.model())
            }
          , Provider::Mock => String::new()
        }
    }
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> Result<Option<T>, Error>
where
  T: std::str::FromStr
, F: Fn(&str) -> Option<String>
{   match lookup(key)
    {   None => Ok(None)
      , Some(raw) => raw.trim().parse::<T>()
          .map(Some)
          .map_err(|_| Error::InvalidConfiguration(
            format!("{} is not valid: {}", key, raw)
          ))
    }
}
