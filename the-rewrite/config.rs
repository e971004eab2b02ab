//! TOML description of a rewriting pipeline.
//!
//! ```toml
//! [[stage]]
//! op      = "delete"
//! literal = "Some"
//! limit   = 1
//!
//! [[stage]]
//! op      = "replace"
//! pattern = "[[:space:]]+"
//! with    = " "
//!
//! [[stage]]
//! op       = "expand"
//! pattern  = "_([^_]+)_"
//! template = "<i>${1}</i>"
//! ```
//!
//! `delete` and `replace` stages search for exactly one of `literal` or
//! `pattern`, optionally bounded by `limit` (negative means unbounded).

use std::path::Path;

use serde::Deserialize;

use crate::{
  Error,
  Matcher,
  Result,
  Rewriter,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
  #[serde(default, rename = "stage")]
  pub stages: Vec<StageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum StageConfig {
  Delete {
    literal: Option<String>,
    pattern: Option<String>,
    limit:   Option<isize>,
  },
  Replace {
    literal: Option<String>,
    pattern: Option<String>,
    limit:   Option<isize>,
    with:    String,
  },
  Expand {
    pattern:  String,
    template: String,
  },
}

impl PipelineConfig {
  pub fn from_toml(source: &str) -> Result<Self> {
    Ok(toml::from_str(source)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| {
      Error::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    Self::from_toml(&source)
  }

  /// Builds the described pipeline, validating every stage.
  pub fn build(&self) -> Result<Rewriter> {
    let stages = self
      .stages
      .iter()
      .enumerate()
      .map(|(index, stage)| stage.build(index))
      .collect::<Result<Vec<_>>>()?;
    Rewriter::sequence(stages)
  }
}

impl StageConfig {
  fn build(&self, index: usize) -> Result<Rewriter> {
    match self {
      StageConfig::Delete {
        literal,
        pattern,
        limit,
      } => {
        let matcher = matcher(index, literal.as_deref(), pattern.as_deref(), *limit)?;
        Ok(Rewriter::delete(matcher))
      },
      StageConfig::Replace {
        literal,
        pattern,
        limit,
        with,
      } => {
        let matcher = matcher(index, literal.as_deref(), pattern.as_deref(), *limit)?;
        Ok(Rewriter::replace(matcher, with.as_str()))
      },
      StageConfig::Expand { pattern, template } => Rewriter::expand(pattern, template),
    }
  }
}

fn matcher(
  index: usize,
  literal: Option<&str>,
  pattern: Option<&str>,
  limit: Option<isize>,
) -> Result<Matcher> {
  let matcher = match (literal, pattern) {
    (Some(literal), None) => Matcher::literal(literal)?,
    (None, Some(pattern)) => Matcher::pattern(pattern)?,
    (Some(_), Some(_)) => {
      return Err(Error::InvalidStage {
        index,
        reason: "`literal` and `pattern` are mutually exclusive".into(),
      });
    },
    (None, None) => {
      return Err(Error::InvalidStage {
        index,
        reason: "expected one of `literal` or `pattern`".into(),
      });
    },
  };
  Ok(match limit {
    Some(limit) => matcher.with_limit(limit),
    None => matcher,
  })
}
