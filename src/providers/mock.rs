use std::time::Duration;
use async_trait::async_trait;
use log::debug;

use crate::config::BackendConfig;
use crate::providers::HeadlineBackend;
use crate::request::{GenerationRequest, GenerationResult};

/// Words of the bio reused in the fake headline
const MOCK_KEYWORDS: usize = 3;

/// Offline backend: waits `latency`, then interpolates a fake headline
/// from the first words of the bio.
#[derive(Debug, Clone, Default)]
pub struct MockBackend
{   latency: Option<Duration>
}

impl MockBackend
{   pub fn new(latency: Option<Duration>) -> Self
    {   MockBackend { latency }
    }

    pub fn from_config(config: &BackendConfig) -> Self
    {   Self::new(config.mock_latency_ms.map(Duration::from_millis))
    }
}

/// `"product manager, fintech"` -> `"Product Manager Fintech | Turning Ideas Into Impact"`
pub fn mock_headline(raw_input: &str) -> String
{   let keywords: Vec<String> = raw_input
      .split(|c: char| !c.is_alphanumeric() && c != '-')
      .filter(|word| word.chars().any(char::is_alphanumeric))
      .take(MOCK_KEYWORDS)
      .map(capitalize)
      .collect();

    let lead = if keywords.is_empty()
    {   "Professional".to_string()
    } else
    {   keywords.join(" ")
    };
    format!("{} | Turning Ideas Into Impact", lead)
}

fn capitalize(word: &str) -> String
{   let mut chars = word.chars();
    match chars.next()
    {   Some(first) => first.to_uppercase().chain(chars).collect()
      , None => String::new()
    }
}

#[async_trait]
impl HeadlineBackend for MockBackend
{   fn name(&self) -> &'static str
    {   "mock"
    }

    async fn generate(&self, request: &GenerationRequest)
      -> GenerationResult
    {   if let Some(latency) = self.latency
        {   debug!("Mock backend sleeping {:?}", latency);
            tokio::time::sleep(latency).await;
        }
        GenerationResult::from_text(&mock_headline(&request.raw_input))
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::prompt::build_request;

    #[test]
    fn headline_uses_first_words()
    {   assert_eq!(
          mock_headline("product manager, fintech and payments"),
          "Product Manager Fintech | Turning Ideas Into Impact"
        );
    }

    #[test]
    fn punctuation_only_bio_gets_generic_lead()
    {   assert_eq!(
          mock_headline("?!"),
          "Professional | Turning Ideas Into Impact"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_configured_latency()
    {   let backend = MockBackend::new(Some(Duration::from_secs(2)));
        let request = build_request("site reliability", &BackendConfig::mock())
          .unwrap();

        let started = tokio::time::Instant::now();
        let result = backend.generate(&request).await;
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(
          result.headline(),
          Some("Site Reliability | Turning Ideas Into Impact")
        );
    }
}
