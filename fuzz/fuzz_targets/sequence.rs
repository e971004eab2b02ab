#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use the_rewrite::Rewriter;

use crate::common::{
  build_stage,
  decode_scenario,
};

// A sequence must produce what applying its stages one after another does,
// regardless of how much spare capacity it starts with.
fuzz_target!(|data: &[u8]| {
  let scenario = decode_scenario(data);
  let stages: Vec<Rewriter> = scenario.stages.iter().map(build_stage).collect();

  let expected = stages
    .iter()
    .fold(scenario.text.clone(), |text, stage| stage.apply(text));

  let sequence = Rewriter::sequence(stages).unwrap();
  let spare = Vec::with_capacity(scenario.spare_bytes);
  let (result, _) = sequence.rewrite(scenario.text, spare);
  assert_eq!(result, expected);
});
