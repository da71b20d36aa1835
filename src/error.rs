use std::fmt;

/// Custom error type for headliner operations.
/// Implements Clone for sending through channels.
///
/// Backend failures are not errors: they come back as
/// `GenerationResult::Failure` so the form can render them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Input rejected before any request was built
    Validation(String)
  , /// Invalid or incomplete configuration
    InvalidConfiguration(String)
  , /// The session loop is no longer running
    SessionClosed
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(msg) => {
              write!(f, "{}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::SessionClosed => {
              write!(f, "Headline session is closed")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
