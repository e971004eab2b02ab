//! Buffer growth policy and in-place compaction.
//!
//! Rewriters own two buffers at a time: the `current` data and a `spare` whose
//! contents are ignored. [`ensure_capacity`] decides whether the spare can be
//! reused as a destination, and [`Compactor`] rewrites `current` in place when
//! the output is known to be no longer than the input.

/// Returns `size` plus 20% headroom, rounded up.
pub fn with_headroom(size: usize) -> usize {
  size.saturating_add(size.div_ceil(5))
}

/// Prepares `buf` to receive `needed` bytes.
///
/// The buffer is always returned empty. Its allocation is kept when the
/// capacity already suffices; otherwise it is dropped and a fresh buffer of
/// [`with_headroom(needed)`](with_headroom) bytes is allocated instead, so a
/// chain of growing stages does not reallocate on every step.
pub fn ensure_capacity(mut buf: Vec<u8>, needed: usize) -> Vec<u8> {
  buf.clear();
  if buf.capacity() >= needed {
    return buf;
  }

  let capacity = with_headroom(needed);
  tracing::debug!(
    "allocating rewrite buffer: needed {needed}, capacity {capacity} (spare had {})",
    buf.capacity()
  );
  Vec::with_capacity(capacity)
}

/// Left-to-right in-place rewriter over a single buffer.
///
/// Two cursors walk the buffer: `read` marks the first byte not yet consumed
/// and `write` the end of the output produced so far. Every operation keeps
/// `write <= read`, which is what makes writing into the same buffer sound:
/// output never lands on bytes that still have to be read.
pub(crate) struct Compactor<'a> {
  buf:   &'a mut Vec<u8>,
  read:  usize,
  write: usize,
}

impl<'a> Compactor<'a> {
  pub(crate) fn new(buf: &'a mut Vec<u8>) -> Self {
    Self {
      buf,
      read: 0,
      write: 0,
    }
  }

  /// Keeps the unread bytes up to `end`, moving them down to the write cursor.
  pub(crate) fn keep_until(&mut self, end: usize) {
    debug_assert!(self.read <= end && end <= self.buf.len());
    if self.write != self.read {
      self.buf.copy_within(self.read..end, self.write);
    }
    self.write += end - self.read;
    self.read = end;
  }

  /// Drops the unread bytes up to `end`.
  pub(crate) fn skip_until(&mut self, end: usize) {
    debug_assert!(self.read <= end && end <= self.buf.len());
    self.read = end;
  }

  /// Writes `bytes` at the write cursor.
  ///
  /// # Panics
  ///
  /// Panics if the write would reach past the read cursor.
  pub(crate) fn write(&mut self, bytes: &[u8]) {
    let end = self.write + bytes.len();
    assert!(
      end <= self.read,
      "in-place write to {end} overtakes read cursor {}",
      self.read
    );
    self.buf[self.write..end].copy_from_slice(bytes);
    self.write = end;
  }

  #[cfg(test)]
  fn positions(&self) -> (usize, usize) {
    (self.write, self.read)
  }

  /// Keeps the remaining tail and truncates the buffer to the output length.
  pub(crate) fn finish(mut self) {
    let len = self.buf.len();
    self.keep_until(len);
    self.buf.truncate(self.write);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn headroom_rounds_up() {
    assert_eq!(with_headroom(0), 0);
    assert_eq!(with_headroom(1), 2);
    assert_eq!(with_headroom(5), 6);
    assert_eq!(with_headroom(10), 12);
    assert_eq!(with_headroom(11), 14);
    assert_eq!(with_headroom(usize::MAX), usize::MAX);
  }

  #[test]
  fn reuses_large_enough_spare() {
    let mut spare = Vec::with_capacity(32);
    spare.extend_from_slice(b"leftover");
    let ptr = spare.as_ptr();

    let buf = ensure_capacity(spare, 32);
    assert!(buf.is_empty());
    assert_eq!(buf.as_ptr(), ptr);
    assert_eq!(buf.capacity(), 32);
  }

  #[test]
  fn replaces_undersized_spare_with_headroom() {
    let spare = Vec::with_capacity(4);
    let buf = ensure_capacity(spare, 10);
    assert!(buf.is_empty());
    assert!(buf.capacity() >= 12);
  }

  #[test]
  fn empty_request_never_allocates() {
    let buf = ensure_capacity(Vec::new(), 0);
    assert_eq!(buf.capacity(), 0);
  }

  fn compact(input: &str, ops: &[(usize, usize, &str)]) -> String {
    let mut buf = input.as_bytes().to_vec();
    let mut compactor = Compactor::new(&mut buf);
    for &(start, end, with) in ops {
      compactor.keep_until(start);
      compactor.skip_until(end);
      compactor.write(with.as_bytes());
      let (write, read) = compactor.positions();
      assert!(write <= read);
    }
    compactor.finish();
    String::from_utf8(buf).unwrap()
  }

  #[test]
  fn compacts_runs_leftward() {
    assert_eq!(compact("aa bb cc", &[(2, 5, "")]), "aa cc");
    assert_eq!(compact("aa bb cc", &[(0, 3, ""), (6, 8, "")]), "bb ");
    assert_eq!(compact("abc", &[(0, 3, "")]), "");
    assert_eq!(compact("abc", &[]), "abc");
  }

  #[test]
  fn adjacent_and_boundary_matches() {
    // matches touching each other and both ends of the buffer
    assert_eq!(
      compact("xxyyzz", &[(0, 2, "1"), (2, 4, "22"), (4, 6, "")]),
      "122"
    );
    assert_eq!(compact("abcdef", &[(0, 1, "A"), (5, 6, "F")]), "AbcdeF");
  }

  #[test]
  #[should_panic(expected = "overtakes read cursor")]
  fn longer_write_is_rejected() {
    compact("ab", &[(0, 1, "XY")]);
  }
}
