//! Response normalization: provider JSON -> one headline string
//!
//! Every backend response runs through the same ordered list of
//! extractors. Supporting a new response shape means appending one
//! extractor to `EXTRACTORS`.

use log::{debug, trace};
use serde_json::Value;

use crate::request::GenerationResult;

/// Pulls candidate text out of one response shape
pub type Extractor = fn(&Value) -> Option<&str>;

/// Tried in order; the first non-empty text wins
pub const EXTRACTORS: &[(&str, Extractor)] = &[
  ("chat", chat_content as Extractor)
, ("generation", generated_text as Extractor)
];

/// `{ "choices": [ { "message": { "content": "..." } } ] }`
pub fn chat_content(body: &Value) -> Option<&str>
{   body.get("choices")?
      .get(0)?
      .get("message")?
      .get("content")?
      .as_str()
}

/// `[ { "generated_text": "..." } ]` or `{ "generated_text": "..." }`
pub fn generated_text(body: &Value) -> Option<&str>
{   let item = match body
    {   Value::Array(items) => items.first()?
      , other => other
    };
    item.get("generated_text")?.as_str()
}

/// Reduce a parsed response body to a `GenerationResult`.
/// Unrecognized or blank payloads become `EmptyResponse`.
pub fn normalize(body: &Value) -> GenerationResult
{   for (shape, extract) in EXTRACTORS
    {   if let Some(text) = extract(body)
        {   let text = text.trim();
            if !text.is_empty()
            {   debug!("Normalized {} shaped response", shape);
                return GenerationResult::from_text(text);
            }
            trace!("{} shape matched but text was blank", shape);
        }
    }
    debug!("No recognizable text in response");
    GenerationResult::empty_response()
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::request::FailureKind;
    use serde_json::json;

    #[test]
    fn chat_shape_is_trimmed()
    {   let body = json!({
          "choices": [
            { "message": { "role": "assistant", "content": "\n Growth-Driven Product Leader \n" } }
          ]
        });
        assert_eq!(
          normalize(&body).headline(),
          Some("Growth-Driven Product Leader")
        );
    }

    #[test]
    fn generation_array_is_trimmed()
    {   let body = json!([{ "generated_text": " Bold Builder " }]);
        assert_eq!(normalize(&body).headline(), Some("Bold Builder"));
    }

    #[test]
    fn generation_object_is_accepted()
    {   let body = json!({ "generated_text": "Calm Under Pressure" });
        assert_eq!(normalize(&body).headline(), Some("Calm Under Pressure"));
    }

    #[test]
    fn chat_shape_wins_over_generation()
    {   let body = json!({
          "choices": [{ "message": { "content": "From chat" } }],
          "generated_text": "From generation"
        });
        assert_eq!(normalize(&body).headline(), Some("From chat"));
    }

    #[test]
    fn blank_chat_falls_through_to_generation()
    {   let body = json!({
          "choices": [{ "message": { "content": "   " } }],
          "generated_text": "Fallback Text"
        });
        assert_eq!(normalize(&body).headline(), Some("Fallback Text"));
    }

    #[test]
    fn unrecognized_shapes_are_empty_response()
    {   let bodies = [
          json!({})
        , json!([])
        , json!(null)
        , json!({ "choices": [] })
        , json!({ "choices": [{ "message": { "content": null } }] })
        , json!([{ "generated_text": 42 }])
        , json!("just a string")
        ];
        for body in bodies
        {   assert_eq!(
              normalize(&body).failure_kind(),
              Some(FailureKind::EmptyResponse),
              "body: {}", body
            );
        }
    }
}
