#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_rewrite::{
  Matcher,
  Rewriter,
};

use crate::common::{
  StageOp,
  decode_scenario,
  reference_replace,
};

// Replace must agree with a plain copying implementation whether it runs in
// place, into a reused spare, or into a fresh allocation.
fuzz_target!(|data: &[u8]| {
  let scenario = decode_scenario(data);
  let Some(StageOp::ReplaceLiteral { needle, with }) = scenario
    .stages
    .iter()
    .find(|op| matches!(op, StageOp::ReplaceLiteral { .. }))
  else {
    return;
  };

  let matcher = Matcher::literal(needle).unwrap();
  let matches = matcher.find_all(&scenario.text);
  let expected = reference_replace(&scenario.text, &matches, with);

  let rewriter = Rewriter::replace(matcher, with.clone());
  let spare = Vec::with_capacity(scenario.spare_bytes);
  let (result, _) = rewriter.rewrite(scenario.text.clone(), spare);
  assert_eq!(result, expected);
  assert_eq!(rewriter.apply(scenario.text), expected);
});
