use std::{
  io,
  path::PathBuf,
};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building matchers, rewriters and pipelines.
///
/// Applying a built [`Rewriter`](crate::Rewriter) to a buffer never fails;
/// only construction, configuration parsing and file loading do.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
  #[error("literal pattern must not be empty")]
  EmptyLiteral,
  #[error("regular expression must not be empty")]
  EmptyPattern,
  #[error("invalid regular expression {pattern:?}: {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source:  Box<regex_automata::meta::BuildError>,
  },
  #[error("rewriter sequence must contain at least one stage")]
  EmptyPipeline,
  #[error("pipeline stage {index}: {reason}")]
  InvalidStage { index: usize, reason: String },
  #[error("failed to parse pipeline config: {0}")]
  ParseConfig(#[from] toml::de::Error),
  #[error("failed to read '{}': {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

impl Error {
  /// Whether the error was raised while building a matcher or rewriter, as
  /// opposed to while loading input or configuration from disk.
  pub fn is_configuration(&self) -> bool {
    !matches!(self, Error::Read { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_offending_argument() {
    let err = crate::Matcher::pattern("(unclosed").unwrap_err();
    assert!(err.to_string().contains("(unclosed"), "{err}");
    assert!(err.is_configuration());

    let err = Error::InvalidStage {
      index:  3,
      reason: "missing `with`".into(),
    };
    assert_eq!(err.to_string(), "pipeline stage 3: missing `with`");
  }

  #[test]
  fn read_errors_are_not_configuration_errors() {
    let err = Error::Read {
      path:   PathBuf::from("missing.txt"),
      source: io::Error::from(io::ErrorKind::NotFound),
    };
    assert!(!err.is_configuration());
    assert!(err.to_string().starts_with("failed to read 'missing.txt'"));
  }
}
