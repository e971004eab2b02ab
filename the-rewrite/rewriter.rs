//! Rewriting operations over owned byte buffers.
//!
//! Every [`Rewriter`] works on a pair of buffers passed by value: `current`,
//! holding the data to transform, and `spare`, an allocation it may reuse as
//! a destination (its contents are ignored). It hands back a new
//! `(result, spare)` pair. Which buffer ends up holding the result depends on
//! the operation:
//!
//! - **Delete** compacts `current` in place and never allocates.
//! - **Replace** works in place when no substitution is longer than the
//!   region it replaces, and otherwise writes into `spare` (growing it only
//!   when too small). `current` then becomes the next spare.
//! - **Expand** always writes into `spare`, since the expanded length is only
//!   known after expanding.
//!
//! When the matcher finds nothing, every operation returns `current`
//! untouched without copying.

use std::path::Path;

use crate::{
  Error,
  Result,
  buffer::{
    Compactor,
    ensure_capacity,
  },
  matcher::{
    Match,
    Matcher,
    Pattern,
  },
  pipeline,
};

/// A composable text rewriting operation.
///
/// Rewriters are built once, validated at construction time, and can then be
/// applied any number of times. Applying a rewriter never fails.
#[derive(Debug, Clone)]
pub struct Rewriter {
  pub(crate) kind: Kind,
}

#[derive(Debug, Clone)]
pub(crate) enum Kind {
  Delete(Matcher),
  Replace {
    matcher:      Matcher,
    substitution: Box<[u8]>,
  },
  Expand {
    pattern:  Pattern,
    template: Box<[u8]>,
  },
  Sequence(Box<[Rewriter]>),
}

impl Rewriter {
  /// Removes every region found by `matcher`.
  pub fn delete(matcher: Matcher) -> Self {
    Self {
      kind: Kind::Delete(matcher),
    }
  }

  /// Substitutes every region found by `matcher` with `substitution`.
  ///
  /// An empty substitution is a [`Rewriter::delete`].
  pub fn replace(matcher: Matcher, substitution: impl Into<Vec<u8>>) -> Self {
    let substitution = substitution.into();
    if substitution.is_empty() {
      return Self::delete(matcher);
    }
    Self {
      kind: Kind::Replace {
        matcher,
        substitution: substitution.into_boxed_slice(),
      },
    }
  }

  /// Substitutes every match of `pattern` with `template`, where `$N`,
  /// `${N}`, `$name` and `${name}` refer to capture groups of the match and
  /// `$$` is a literal `$`. Groups that did not participate in the match
  /// expand to nothing.
  ///
  /// An empty template deletes the matches.
  pub fn expand(pattern: &str, template: &str) -> Result<Self> {
    let pattern = Pattern::new(pattern)?;
    if template.is_empty() {
      return Ok(Self::delete(pattern.into()));
    }
    Ok(Self {
      kind: Kind::Expand {
        pattern,
        template: template.as_bytes().into(),
      },
    })
  }

  /// Transforms `current`, reusing `spare` as a destination if needed.
  ///
  /// Returns `(result, spare)`. The returned spare is either the input spare,
  /// the exhausted `current`, or (when a stage had to grow) the buffer it
  /// replaced; its contents are unspecified.
  pub fn rewrite(&self, current: Vec<u8>, spare: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
    match &self.kind {
      Kind::Delete(matcher) => delete(matcher, current, spare),
      Kind::Replace {
        matcher,
        substitution,
      } => replace(matcher, substitution, current, spare),
      Kind::Expand { pattern, template } => expand(pattern, template, current, spare),
      Kind::Sequence(stages) => pipeline::run(stages, current, spare),
    }
  }

  /// Applies the rewriter to `input`.
  pub fn apply(&self, input: Vec<u8>) -> Vec<u8> {
    self.rewrite(input, Vec::new()).0
  }

  /// Reads the file at `path` and applies the rewriter to its contents.
  pub fn apply_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let input = std::fs::read(path).map_err(|source| {
      Error::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    Ok(self.apply(input))
  }
}

fn delete(matcher: &Matcher, mut current: Vec<u8>, spare: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
  let matches = matcher.find_all(&current);
  if matches.is_empty() {
    return (current, spare);
  }

  tracing::trace!("delete: {} matches in {} bytes", matches.len(), current.len());
  replace_in_place(&mut current, &matches, &[]);
  (current, spare)
}

fn replace(
  matcher: &Matcher,
  substitution: &[u8],
  mut current: Vec<u8>,
  spare: Vec<u8>,
) -> (Vec<u8>, Vec<u8>) {
  let matches = matcher.find_all(&current);
  if matches.is_empty() {
    return (current, spare);
  }

  let in_place = matches.iter().all(|m| substitution.len() <= m.len());
  tracing::trace!(
    "replace: {} matches in {} bytes, in place: {in_place}",
    matches.len(),
    current.len()
  );

  if in_place {
    replace_in_place(&mut current, &matches, substitution);
    return (current, spare);
  }

  let spans: usize = matches.iter().map(Match::len).sum();
  let size = current.len() - spans + matches.len() * substitution.len();
  let mut dest = ensure_capacity(spare, size);
  replace_into(&current, &mut dest, &matches, substitution);
  debug_assert_eq!(dest.len(), size);
  (dest, current)
}

/// Replaces `matches` in `buf` without a second buffer.
///
/// Every substitution must be at most as long as the match it replaces;
/// otherwise the write cursor would overtake unread input and this panics.
pub(crate) fn replace_in_place(buf: &mut Vec<u8>, matches: &[Match], substitution: &[u8]) {
  let mut compactor = Compactor::new(buf);
  for m in matches {
    compactor.keep_until(m.start());
    compactor.skip_until(m.end());
    compactor.write(substitution);
  }
  compactor.finish();
}

/// Writes `src` with `matches` replaced into the end of `dest`.
pub(crate) fn replace_into(src: &[u8], dest: &mut Vec<u8>, matches: &[Match], substitution: &[u8]) {
  let mut last = 0;
  for m in matches {
    dest.extend_from_slice(&src[last..m.start()]);
    dest.extend_from_slice(substitution);
    last = m.end();
  }
  dest.extend_from_slice(&src[last..]);
}

fn expand(
  pattern: &Pattern,
  template: &[u8],
  current: Vec<u8>,
  spare: Vec<u8>,
) -> (Vec<u8>, Vec<u8>) {
  let mut captures = pattern.captures_iter(&current).peekable();
  if captures.peek().is_none() {
    drop(captures);
    return (current, spare);
  }

  let mut dest = ensure_capacity(spare, current.len());
  let mut last = 0;
  let mut count = 0usize;
  for caps in captures {
    let Some(m) = caps.get_match() else {
      continue;
    };
    dest.extend_from_slice(&current[last..m.start()]);
    caps.interpolate_bytes_into(&current, template, &mut dest);
    last = m.end();
    count += 1;
  }
  dest.extend_from_slice(&current[last..]);

  tracing::trace!(
    "expand: {count} matches, {} -> {} bytes",
    current.len(),
    dest.len()
  );
  (dest, current)
}
