//! Prompt formatting: bio text -> GenerationRequest
//!
//! Pure functions only. The bio is embedded verbatim; the same input and
//! template always produce the same prompt.

use std::collections::BTreeMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::BackendConfig;
use crate::error::Error;
use crate::request::{GenerationRequest, VALIDATION_MESSAGE};
use crate::Provider;

/// Default `max_new_tokens` for text-generation backends
pub const DEFAULT_MAX_NEW_TOKENS: usize = 40;

/// Wording knobs of the headline instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlineTemplate
{   pub min_words: usize
  , pub max_words: usize
  , /// Let the model return several candidates, one per line
    pub allow_multiple: bool
}

impl Default for HeadlineTemplate
{   fn default() -> Self
    {   HeadlineTemplate
        {   min_words: 6
          , max_words: 9
          , allow_multiple: true
        }
    }
}

impl HeadlineTemplate
{   pub fn validate(&self) -> Result<(), Error>
    {   if self.min_words == 0 || self.min_words > self.max_words
        {   return Err(Error::InvalidConfiguration(
              format!(
                "headline word range {}-{} is empty",
                self.min_words, self.max_words
              )
            ));
        }
        Ok(())
    }

    /// Substitute `raw_input` into the instruction
    pub fn render(&self, raw_input: &str) -> String
    {   let mut prompt = format!(
          "Generate a professional LinkedIn headline in {}-{} words \
           based on the following input: \"{}\". \
           Reply with only the headline and nothing else.",
          self.min_words, self.max_words, raw_input
        );
        if self.allow_multiple
        {   prompt.push_str(
              " If there are several good options, give them one per line."
            );
        }
        prompt
    }
}

/// Default-template prompt for `raw_input`
pub fn format_prompt(raw_input: &str) -> String
{   HeadlineTemplate::default().render(raw_input)
}

/// Build the request for `raw_input` against the configured backend.
/// Whitespace-only input is a validation error; nothing is built.
pub fn build_request(
  raw_input: &str
, config: &BackendConfig
) -> Result<GenerationRequest, Error>
{   if raw_input.trim().is_empty()
    {   debug!("Rejecting empty bio");
        return Err(Error::Validation(VALIDATION_MESSAGE.to_string()));
    }

    let formatted_prompt = config.template.render(raw_input);
    let parameters = parameters_for(config);
    debug!(
      "Built {:?} request with {} parameters",
      config.provider,
      parameters.len()
    );
    trace!("Formatted prompt: {}", formatted_prompt);

    Ok(GenerationRequest
    {   raw_input: raw_input.to_string()
      , formatted_prompt
      , parameters
    })
}

fn parameters_for(config: &BackendConfig)
  -> BTreeMap<String, serde_json::Value>
{   let mut params = BTreeMap::new();
    match config.provider
    {   Provider::ChatCompletion => {
          params.insert("model".to_string(), json!(config.model()));
          if let Some(max_tokens) = config.max_tokens
          {   params.insert("max_tokens".to_string(), json!(max_tokens));
          }
          if let Some(temperature) = config.temperature
          {   params.insert("temperature".to_string(), json!(temperature));
          }
        }
      , Provider::TextGeneration => {
          params.insert(
            "max_new_tokens".to_string(),
            json!(config.max_tokens.unwrap_or(DEFAULT_MAX_NEW_TOKENS))
          );
          if let Some(temperature) = config.temperature
          {   params.insert("temperature".to_string(), json!(temperature));
          }
          params.insert("return_full_text".to_string(), json!(false));
        }
      , Provider::Mock => {}
    }
    params
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn prompt_contains_input_verbatim()
    {   let bios = [
          "Product manager who ships"
        , "  leading and trailing spaces  "
        , "quotes \"inside\" and a\nnewline"
        , "ünïcödé résumé ✨"
        ];
        for bio in bios
        {   let request = build_request(bio, &BackendConfig::mock()).unwrap();
            assert!(request.formatted_prompt.contains(bio));
            assert_eq!(request.raw_input, bio);
        }
    }

    #[test]
    fn prompt_names_word_range()
    {   let prompt = format_prompt("data engineer");
        assert!(prompt.contains("6-9 words"));
    }

    #[test]
    fn prompt_is_deterministic()
    {   assert_eq!(format_prompt("same bio"), format_prompt("same bio"));
    }

    #[test]
    fn single_candidate_template_drops_options_line()
    {   let template = HeadlineTemplate
        {   allow_multiple: false
          , ..HeadlineTemplate::default()
        };
        assert!(!template.render("bio").contains("one per line"));
        assert!(format_prompt("bio").contains("one per line"));
    }

    #[test]
    fn empty_input_is_validation_error()
    {   for bio in ["", "   ", "\n\t"]
        {   let err = build_request(bio, &BackendConfig::mock()).unwrap_err();
            assert_eq!(err, Error::Validation(VALIDATION_MESSAGE.to_string()));
        }
    }

    #[test]
    fn chat_parameters_include_model()
    {   let config = BackendConfig
        {   temperature: Some(0.7)
          , ..BackendConfig::default()
        };
        let request = build_request("bio", &config).unwrap();
        assert_eq!(
          request.parameter("model"),
          Some(&json!(crate::config::DEFAULT_CHAT_MODEL))
        );
        assert_eq!(request.parameter("temperature"), Some(&json!(0.7)));
        assert!(request.parameter("max_tokens").is_none());
    }

    #[test]
    fn text_generation_parameters_have_defaults()
    {   let config = BackendConfig
        {   provider: Provider::TextGeneration
          , ..BackendConfig::default()
        };
        let request = build_request("bio", &config).unwrap();
        assert_eq!(
          request.parameter("max_new_tokens"),
          Some(&json!(DEFAULT_MAX_NEW_TOKENS))
        );
        assert_eq!(request.parameter("return_full_text"), Some(&json!(false)));
    }

    #[test]
    fn inverted_word_range_is_invalid()
    {   let template = HeadlineTemplate
        {   min_words: 9
          , max_words: 6
          , allow_multiple: true
        };
        assert!(template.validate().is_err());
    }
}
