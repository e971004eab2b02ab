//! Locating the regions a rewriter operates on.
//!
//! A [`Matcher`] scans a byte buffer left to right and reports
//! non-overlapping [`Match`]es, each starting at or after the end of the
//! previous one. Two search strategies exist:
//!
//! - **literal** - exact byte sequence, found with `memchr::memmem`
//! - **pattern** - regular expression, found with `regex_automata::meta`
//!
//! Either can carry a count limit (see [`Matcher::with_limit`]). The limit is
//! configuration, not state: each scan starts with a fresh budget held by the
//! returned [`MatchIter`], so a matcher can be reused across buffers and
//! threads freely.
//!
//! ```ignore
//! use the_rewrite::Matcher;
//!
//! let m = Matcher::literal("aa")?;
//! // "aaa" holds one non-overlapping "aa"
//! assert_eq!(m.find_all(b"aaa").len(), 1);
//!
//! let m = Matcher::pattern(r"\d+")?.with_limit(2);
//! let spans: Vec<_> = m.find_iter(b"1 22 333").map(|m| m.range()).collect();
//! assert_eq!(spans, vec![0..1, 2..4]);
//! ```

use std::{
  fmt,
  ops::Range,
};

use memchr::memmem;
use regex_automata::meta::{
  self,
  Regex,
};
use smallvec::SmallVec;

use crate::{
  Error,
  Result,
};

/// A half-open byte interval `[start, end)` located by a [`Matcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
  start: usize,
  end:   usize,
}

impl Match {
  /// # Panics
  ///
  /// Panics if `start > end`.
  pub fn new(start: usize, end: usize) -> Self {
    assert!(start <= end, "match start {start} is after end {end}");
    Self { start, end }
  }

  pub fn start(&self) -> usize {
    self.start
  }

  pub fn end(&self) -> usize {
    self.end
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  pub fn range(&self) -> Range<usize> {
    self.start..self.end
  }
}

impl From<regex_automata::Match> for Match {
  fn from(m: regex_automata::Match) -> Self {
    Self::new(m.start(), m.end())
  }
}

/// Ordered, non-overlapping matches from one scan of one buffer.
pub type Matches = SmallVec<[Match; 8]>;

/// A compiled regular expression together with its source text.
#[derive(Clone)]
pub struct Pattern {
  regex:  Regex,
  source: Box<str>,
}

impl Pattern {
  pub fn new(pattern: &str) -> Result<Self> {
    if pattern.is_empty() {
      return Err(Error::EmptyPattern);
    }
    let regex = Regex::new(pattern).map_err(|source| {
      Error::InvalidPattern {
        pattern: pattern.to_owned(),
        source:  Box::new(source),
      }
    })?;
    Ok(Self {
      regex,
      source: pattern.into(),
    })
  }

  pub fn as_str(&self) -> &str {
    &self.source
  }

  /// Iterates over successive leftmost matches with their capture groups.
  pub fn captures_iter<'p, 'h>(&'p self, haystack: &'h [u8]) -> meta::CapturesMatches<'p, 'h> {
    self.regex.captures_iter(haystack)
  }
}

impl fmt::Debug for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Pattern").field(&self.source).finish()
  }
}

#[derive(Clone)]
enum Search {
  Literal(memmem::Finder<'static>),
  Pattern(Pattern),
}

impl fmt::Debug for Search {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Search::Literal(finder) => {
        f.debug_tuple("Literal")
          .field(&String::from_utf8_lossy(finder.needle()))
          .finish()
      },
      Search::Pattern(pattern) => fmt::Debug::fmt(pattern, f),
    }
  }
}

/// Finds the regions of a buffer a rewriter should act on.
#[derive(Debug, Clone)]
pub struct Matcher {
  search: Search,
  /// Maximum number of matches per scan, `None` for unbounded.
  limit:  Option<usize>,
}

impl Matcher {
  /// Matches exact occurrences of `needle`.
  ///
  /// Occurrences never overlap: after a match the scan resumes at its end,
  /// so `"aa"` is found once in `"aaa"`.
  pub fn literal(needle: impl AsRef<[u8]>) -> Result<Self> {
    let needle = needle.as_ref();
    if needle.is_empty() {
      return Err(Error::EmptyLiteral);
    }
    Ok(Self {
      search: Search::Literal(memmem::Finder::new(needle).into_owned()),
      limit:  None,
    })
  }

  /// Matches successive leftmost occurrences of a regular expression.
  pub fn pattern(pattern: &str) -> Result<Self> {
    Ok(Self::from(Pattern::new(pattern)?))
  }

  /// Shorthand for `Matcher::literal(needle)?.with_limit(n)`.
  pub fn literal_n(needle: impl AsRef<[u8]>, n: isize) -> Result<Self> {
    Ok(Self::literal(needle)?.with_limit(n))
  }

  /// Shorthand for `Matcher::pattern(pattern)?.with_limit(n)`.
  pub fn pattern_n(pattern: &str, n: isize) -> Result<Self> {
    Ok(Self::pattern(pattern)?.with_limit(n))
  }

  /// Stops every scan after the `n`-th match.
  ///
  /// A negative `n` leaves the matcher unbounded and `0` makes it match
  /// nothing. Limiting an already limited matcher keeps the smaller bound.
  pub fn with_limit(mut self, n: isize) -> Self {
    let Ok(n) = usize::try_from(n) else {
      return self;
    };
    self.limit = Some(self.limit.map_or(n, |limit| limit.min(n)));
    self
  }

  pub fn limit(&self) -> Option<usize> {
    self.limit
  }

  /// Lazily scans `haystack`, starting with a fresh match budget.
  pub fn find_iter<'m, 'h>(&'m self, haystack: &'h [u8]) -> MatchIter<'m, 'h> {
    let search = match &self.search {
      Search::Literal(finder) => {
        SearchIter::Literal {
          iter:   finder.find_iter(haystack),
          needle: finder.needle().len(),
        }
      },
      Search::Pattern(pattern) => SearchIter::Pattern(pattern.regex.find_iter(haystack)),
    };
    MatchIter {
      search,
      remaining: self.limit,
    }
  }

  /// Collects every match in `haystack`.
  pub fn find_all(&self, haystack: &[u8]) -> Matches {
    self.find_iter(haystack).collect()
  }
}

impl From<Pattern> for Matcher {
  fn from(pattern: Pattern) -> Self {
    Self {
      search: Search::Pattern(pattern),
      limit:  None,
    }
  }
}

enum SearchIter<'m, 'h> {
  Literal {
    iter:   memmem::FindIter<'h, 'm>,
    needle: usize,
  },
  Pattern(meta::FindMatches<'m, 'h>),
}

/// Iterator returned by [`Matcher::find_iter`].
pub struct MatchIter<'m, 'h> {
  search:    SearchIter<'m, 'h>,
  remaining: Option<usize>,
}

impl Iterator for MatchIter<'_, '_> {
  type Item = Match;

  fn next(&mut self) -> Option<Match> {
    if self.remaining == Some(0) {
      return None;
    }

    let found = match &mut self.search {
      SearchIter::Literal { iter, needle } => {
        iter.next().map(|start| Match::new(start, start + *needle))
      },
      SearchIter::Pattern(iter) => iter.next().map(Match::from),
    }?;

    if let Some(remaining) = &mut self.remaining {
      *remaining -= 1;
    }
    Some(found)
  }
}
