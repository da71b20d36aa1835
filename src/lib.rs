pub mod error;
pub mod config;
pub mod prompt;
pub mod request;
pub mod normalize;
pub mod providers;
pub mod client;
pub mod session;

use serde::{Deserialize, Serialize};

pub use client::GenerationClient;
pub use config::BackendConfig;
pub use error::Error;
pub use prompt::{build_request, format_prompt, HeadlineTemplate};
pub use providers::HeadlineBackend;
pub use request::{FailureKind, GenerationRequest, GenerationResult};
pub use session::{FormView, HeadlineSession, OverlapPolicy, Phase, Submission};

/*

headliner turns a short professional bio into a LinkedIn-style
headline. One request pipeline, several interchangeable backends:

headliner/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports, Provider
│   ├── error.rs        # Crate error type
│   ├── config.rs       # Backend configuration (env / JSON)
│   ├── prompt.rs       # Bio -> GenerationRequest
│   ├── request.rs      # GenerationRequest / GenerationResult
│   ├── normalize.rs    # Provider JSON -> headline text
│   ├── client.rs       # GenerationClient (backend selection)
│   ├── session.rs      # Form state actor, last-request-wins
│   └── providers/
│       ├── mod.rs      # HeadlineBackend trait, shared HTTP POST
│       ├── chat.rs     # chat-completions endpoints
│       ├── text_generation.rs
│       └── mock.rs     # offline string interpolation
└── tests/

*/

/// Backend contracts the generation client can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Provider
{ /// Chat-completions style (OpenRouter, OpenAI-compatible):
  /// `choices[0].message.content`
  ChatCompletion
  ,
  /// Text-generation style (Hugging Face Inference):
  /// `[{ "generated_text": ... }]`
  TextGeneration
  ,
  /// Local mock, no network
  Mock
}

impl Provider
{   /// Parse a provider name as written in configuration
    pub fn from_name(name: &str) -> Option<Provider>
    {   match name.trim().to_ascii_lowercase().as_str()
        {   "chat" | "chat-completion" | "openrouter" => {
              Some(Provider::ChatCompletion)
            }
          , "text-generation" | "text" | "huggingface" => {
              Some(Provider::TextGeneration)
            }
          , "mock" => Some(Provider::Mock)
          , _ => None
        }
    }
}
