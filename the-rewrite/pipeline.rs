//! Sequential composition of rewriters.
//!
//! A sequence threads a `(current, spare)` pair through its stages. Each
//! stage gets the previous result as `current` and whatever buffer the
//! previous stage released as `spare`, cleared but with its capacity intact.
//! Only two buffers are ever live, so a sequence of any length allocates at
//! most once beyond its input, and only when a growing stage finds the spare
//! too small.

use crate::{
  Error,
  Result,
  rewriter::{
    Kind,
    Rewriter,
  },
};

impl Rewriter {
  /// Chains `rewriters` so that each one is applied to the output of the
  /// previous one.
  ///
  /// Fails with [`Error::EmptyPipeline`] if no rewriter is given. A single
  /// rewriter is returned as is.
  pub fn sequence(rewriters: impl IntoIterator<Item = Rewriter>) -> Result<Self> {
    let mut stages: Vec<Rewriter> = rewriters.into_iter().collect();
    match stages.len() {
      0 => Err(Error::EmptyPipeline),
      1 => Ok(stages.swap_remove(0)),
      _ => {
        Ok(Self {
          kind: Kind::Sequence(stages.into_boxed_slice()),
        })
      },
    }
  }

  /// Number of stages this rewriter runs, counting nested sequences.
  pub fn stages(&self) -> usize {
    match &self.kind {
      Kind::Sequence(stages) => stages.iter().map(Rewriter::stages).sum(),
      _ => 1,
    }
  }
}

pub(crate) fn run(stages: &[Rewriter], current: Vec<u8>, spare: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
  stages
    .iter()
    .enumerate()
    .fold((current, spare), |(current, mut spare), (index, stage)| {
      spare.clear();
      tracing::trace!(
        "stage {index}: {} bytes in, spare capacity {}",
        current.len(),
        spare.capacity()
      );
      stage.rewrite(current, spare)
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Matcher;

  fn lit(needle: &str) -> Matcher {
    Matcher::literal(needle).unwrap()
  }

  fn markup() -> Rewriter {
    Rewriter::sequence([
      Rewriter::delete(lit("Some").with_limit(1)),
      Rewriter::replace(Matcher::pattern("[[:space:]]+").unwrap(), " "),
      Rewriter::expand("_([^_]+)_", "<i>${1}</i>").unwrap(),
      Rewriter::expand(r"\*([^\*]+)\*", "<b>${1}</b>").unwrap(),
    ])
    .unwrap()
  }

  fn run_str(rewriter: &Rewriter, src: &str) -> String {
    String::from_utf8(rewriter.apply(src.as_bytes().to_vec())).unwrap()
  }

  #[test]
  fn markup_pipeline() {
    let rewriter = markup();
    assert_eq!(rewriter.stages(), 4);
    assert_eq!(
      run_str(&rewriter, "*SomeSome*  example    _text_"),
      "<b>Some</b> example <i>text</i>"
    );
  }

  #[test]
  fn pipeline_is_reusable() {
    let rewriter = markup();
    for _ in 0..3 {
      assert_eq!(run_str(&rewriter, "SomeSome _x_"), "Some <i>x</i>");
    }
  }

  #[test]
  fn empty_sequence_is_rejected() {
    assert!(matches!(
      Rewriter::sequence(Vec::new()),
      Err(Error::EmptyPipeline)
    ));
  }

  #[test]
  fn single_stage_is_unwrapped() {
    let rewriter = Rewriter::sequence([Rewriter::delete(lit("a"))]).unwrap();
    assert!(matches!(rewriter.kind, Kind::Delete(_)));
  }

  #[test]
  fn delete_chains() {
    let cases: [(&str, &[&str], &str); 6] = [
      ("abc", &["a", "b"], "c"),
      ("abc", &["a", "c"], "b"),
      ("abc", &["b", "c"], "a"),
      ("abc", &["a", "z"], "bc"),
      ("abc", &["a", "b", "c"], ""),
      ("abc", &["x", "y", "z"], "abc"),
    ];
    for (src, needles, expected) in cases {
      let rewriter =
        Rewriter::sequence(needles.iter().map(|n| Rewriter::delete(lit(n)))).unwrap();
      assert_eq!(run_str(&rewriter, src), expected, "{src:?} - {needles:?}");
    }
  }

  #[test]
  fn replace_chains() {
    let cases: [(&str, &[(&str, &str)], &str); 7] = [
      ("abc", &[("a", "X"), ("b", "Y"), ("c", "Z")], "XYZ"),
      ("abc", &[("a", ""), ("b", "Y"), ("c", "Z")], "YZ"),
      (
        "aa bb cc aa bb cc",
        &[("aa", "XXX"), ("bb", "YYY"), ("cc", "ZZZ")],
        "XXX YYY ZZZ XXX YYY ZZZ",
      ),
      (
        "aa bb cc aa bb cc",
        &[("aa ", ""), ("bb", "YYY"), ("cc", "ZZZ")],
        "YYY ZZZ YYY ZZZ",
      ),
      (
        "aa bb cc aa bb cc",
        &[("aa", "XXX"), (" bb", ""), ("cc", "ZZZ")],
        "XXX ZZZ XXX ZZZ",
      ),
      (
        "aa bb cc aa bb cc",
        &[("aa", "XXX"), ("bb", "YYY"), (" cc", "")],
        "XXX YYY XXX YYY",
      ),
      (
        "aa bb cc aa bb cc",
        &[("bb", "XXX"), ("XXX", "Y"), ("Y", "ZZZ")],
        "aa ZZZ cc aa ZZZ cc",
      ),
    ];
    for (src, substs, expected) in cases {
      let rewriter = Rewriter::sequence(
        substs
          .iter()
          .map(|(needle, with)| Rewriter::replace(lit(needle), *with)),
      )
      .unwrap();
      assert_eq!(run_str(&rewriter, src), expected, "{src:?}");
    }
  }

  #[test]
  fn pattern_replace_chains() {
    let rewriter = Rewriter::sequence([
      Rewriter::replace(Matcher::pattern("a+[[:space:]]+").unwrap(), ""),
      Rewriter::replace(Matcher::pattern("b+").unwrap(), "YYY"),
      Rewriter::replace(Matcher::pattern("c+").unwrap(), "ZZZ"),
    ])
    .unwrap();
    assert_eq!(run_str(&rewriter, "aa bb cc aa bb cc"), "YYY ZZZ YYY ZZZ");
  }

  #[test]
  fn expand_chains() {
    let cases: [(&[(&str, &str)], &str); 5] = [
      (
        &[("aa", "X${0}X"), ("bb", "Y${0}Y"), ("cc", "Z${0}Z")],
        "XaaX YbbY ZccZ XaaX YbbY ZccZ",
      ),
      (
        &[("aa ", ""), ("bb", "Y${0}Y"), ("cc", "Z${0}Z")],
        "YbbY ZccZ YbbY ZccZ",
      ),
      (
        &[("aa", "X${0}X"), (" bb", ""), ("cc", "Z${0}Z")],
        "XaaX ZccZ XaaX ZccZ",
      ),
      (
        &[("aa", "X${0}X"), ("bb", "Y${0}Y"), (" cc", "")],
        "XaaX YbbY XaaX YbbY",
      ),
      (
        &[("bb", "X${0}X"), ("XbbX", "Y"), ("Y", "ZZZ")],
        "aa ZZZ cc aa ZZZ cc",
      ),
    ];
    for (substs, expected) in cases {
      let rewriter = Rewriter::sequence(
        substs
          .iter()
          .map(|(pattern, template)| Rewriter::expand(pattern, template).unwrap()),
      )
      .unwrap();
      assert_eq!(run_str(&rewriter, "aa bb cc aa bb cc"), expected);
    }
  }

  #[test]
  fn nested_sequences_compose() {
    let inner = Rewriter::sequence([
      Rewriter::replace(lit("a"), "aa"),
      Rewriter::replace(lit("b"), "bb"),
    ])
    .unwrap();
    let outer = Rewriter::sequence([inner, Rewriter::delete(lit("ab"))]).unwrap();
    assert_eq!(outer.stages(), 3);
    assert_eq!(run_str(&outer, "ab"), "ab");
  }

  #[test]
  fn adequate_spare_means_no_new_buffers() {
    // every stage grows the text; a roomy spare must absorb all of it
    let rewriter = Rewriter::sequence([
      Rewriter::replace(lit("a"), "aaa"),
      Rewriter::expand("b", "<$0>").unwrap(),
      Rewriter::replace(lit("c"), "ccc"),
      Rewriter::expand("(a+)", "[$1]").unwrap(),
    ])
    .unwrap();

    let mut input = Vec::with_capacity(256);
    input.extend_from_slice(b"abc abc");
    let spare = Vec::with_capacity(256);
    let owned = [input.as_ptr(), spare.as_ptr()];

    let (result, spare) = rewriter.rewrite(input, spare);
    assert_eq!(result, b"[aaa]<b>ccc [aaa]<b>ccc");
    assert!(owned.contains(&result.as_ptr()));
    assert!(owned.contains(&spare.as_ptr()));
    assert_ne!(result.as_ptr(), spare.as_ptr());
  }

  #[test]
  fn at_most_one_allocation_beyond_input() {
    // stage 1 outgrows an empty spare and allocates; stage 2 grows into the
    // roomy input buffer released by stage 1; stage 3 shrinks in place
    let rewriter = Rewriter::sequence([
      Rewriter::replace(lit("a"), "ab"),
      Rewriter::replace(lit("b"), "xy"),
      Rewriter::replace(lit("x"), "z"),
    ])
    .unwrap();

    let mut input = Vec::with_capacity(64);
    input.extend_from_slice(b"aaaaaaaaaa");
    let input_ptr = input.as_ptr();

    let (result, spare) = rewriter.rewrite(input, Vec::new());
    assert_eq!(result, "azy".repeat(10).as_bytes());
    assert_eq!(result.as_ptr(), input_ptr);
    assert_ne!(spare.as_ptr(), input_ptr);
    assert!(spare.capacity() >= crate::buffer::with_headroom(20));
  }

  fn composition_stage(selector: u8) -> Rewriter {
    match selector % 4 {
      0 => Rewriter::delete(lit("a")),
      1 => Rewriter::replace(lit("b"), "BBB"),
      2 => Rewriter::replace(Matcher::pattern("[c-e]+").unwrap(), "-"),
      _ => Rewriter::expand("([a-z])([0-9])", "$2$1$2").unwrap(),
    }
  }

  quickcheck::quickcheck! {
    fn sequence_is_composition(src: Vec<u8>, first: u8, second: u8) -> bool {
      let (a, b) = (composition_stage(first), composition_stage(second));
      let expected = b.apply(a.apply(src.clone()));
      let sequence = Rewriter::sequence([a, b]).unwrap();
      sequence.apply(src) == expected
    }
  }
}
