//! Composable byte-level text rewriting.
//!
//! A [`Rewriter`] deletes, replaces or template-expands the regions found by a
//! [`Matcher`]. Rewriters chain into a pipeline with [`Rewriter::sequence`],
//! and a whole pipeline runs with at most one buffer allocated beyond the
//! input, no matter how many stages it has.
//!
//! ```ignore
//! use the_rewrite::{Matcher, Rewriter};
//!
//! let rewriter = Rewriter::sequence([
//!   Rewriter::delete(Matcher::literal("Some")?.with_limit(1)),
//!   Rewriter::replace(Matcher::pattern("[[:space:]]+")?, " "),
//!   Rewriter::expand("_([^_]+)_", "<i>${1}</i>")?,
//!   Rewriter::expand(r"\*([^\*]+)\*", "<b>${1}</b>")?,
//! ])?;
//!
//! let out = rewriter.apply(b"*SomeSome*  example    _text_".to_vec());
//! assert_eq!(out, b"<b>Some</b> example <i>text</i>");
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod rewriter;

pub use config::PipelineConfig;
pub use error::{
  Error,
  Result,
};
pub use matcher::{
  Match,
  Matcher,
  Matches,
  Pattern,
};
pub use rewriter::Rewriter;
