//! Request and result types for one headline generation

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Placeholder shown when a backend answers without usable text
pub const EMPTY_RESPONSE_MESSAGE: &str
  = "No response generated. Please try again.";

/// Message shown when the bio is empty
pub const VALIDATION_MESSAGE: &str = "Please enter a prompt";

/// One generation request. Built by `prompt::build_request`,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// The bio exactly as typed
    pub raw_input: String
  , /// Instruction text sent to the backend
    pub formatted_prompt: String
  , /// Backend generation options (model, max tokens, ...)
    pub parameters: BTreeMap<String, serde_json::Value>
}

impl GenerationRequest
{   pub fn parameter(&self, name: &str) -> Option<&serde_json::Value>
    {   self.parameters.get(name)
    }
}

/// Why an attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum FailureKind
{   /// Empty input, caught locally
    ValidationError
  , /// Transport failure or unreadable body
    NetworkError
  , /// Non-success HTTP status
    ProviderError
  , /// Success status but no usable text
    EmptyResponse
}

impl fmt::Display for FailureKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let name = match self
        {   FailureKind::ValidationError => "validation error"
          , FailureKind::NetworkError => "network error"
          , FailureKind::ProviderError => "provider error"
          , FailureKind::EmptyResponse => "empty response"
        };
        write!(f, "{}", name)
    }
}

/// Normalized outcome of a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationResult
{   Success
    {   headline: String
    }
  , Failure
    {   kind: FailureKind
      , detail: String
    }
}

impl GenerationResult
{   /// Success with trimmed text; empty text becomes `EmptyResponse`
    pub fn from_text(text: &str) -> Self
    {   let headline = text.trim();
        if headline.is_empty()
        {   GenerationResult::empty_response()
        } else
        {   GenerationResult::Success
            {   headline: headline.to_string()
            }
        }
    }

    pub fn empty_response() -> Self
    {   GenerationResult::Failure
        {   kind: FailureKind::EmptyResponse
          , detail: EMPTY_RESPONSE_MESSAGE.to_string()
        }
    }

    pub fn network_error(detail: impl Into<String>) -> Self
    {   GenerationResult::Failure
        {   kind: FailureKind::NetworkError
          , detail: detail.into()
        }
    }

    pub fn provider_error(status: u16, body: &str) -> Self
    {   GenerationResult::Failure
        {   kind: FailureKind::ProviderError
          , detail: format!(
              "Failed to fetch response. Status: {}. Details: {}",
              status, body
            )
        }
    }

    pub fn is_success(&self) -> bool
    {   matches!(self, GenerationResult::Success { .. })
    }

    pub fn headline(&self) -> Option<&str>
    {   match self
        {   GenerationResult::Success { headline } => Some(headline)
          , GenerationResult::Failure { .. } => None
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind>
    {   match self
        {   GenerationResult::Success { .. } => None
          , GenerationResult::Failure { kind, .. } => Some(*kind)
        }
    }

    /// Text for the result or error banner
    pub fn display_text(&self) -> &str
    {   match self
        {   GenerationResult::Success { headline } => headline
          , GenerationResult::Failure { detail, .. } => detail
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn from_text_trims()
    {   let result = GenerationResult::from_text("  Bold Builder \n");
        assert_eq!(result.headline(), Some("Bold Builder"));
    }

    #[test]
    fn whitespace_text_is_empty_response()
    {   let result = GenerationResult::from_text(" \n\t ");
        assert_eq!(result.failure_kind(), Some(FailureKind::EmptyResponse));
        assert_eq!(result.display_text(), EMPTY_RESPONSE_MESSAGE);
    }

    #[test]
    fn provider_error_carries_status_and_body()
    {   let result = GenerationResult::provider_error(503, "upstream down");
        assert_eq!(result.failure_kind(), Some(FailureKind::ProviderError));
        assert!(result.display_text().contains("503"));
        assert!(result.display_text().contains("upstream down"));
    }
}
