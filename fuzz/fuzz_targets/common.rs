use the_rewrite::{
  Match,
  Matcher,
  Rewriter,
};

const MAX_TEXT_BYTES: usize = 4 * 1024;
const MAX_NEEDLE_BYTES: usize = 8;
const MAX_SUBST_BYTES: usize = 16;
const MAX_STAGES: usize = 8;

/// Characters patterns are built from; small so that matches are frequent.
const PATTERN_ATOMS: &[&str] = &["a", "b", "[ab]", "a+", "b*", r"\s+", ".", "(a)(b)?"];

#[derive(Debug, Clone)]
pub enum StageOp {
  DeleteLiteral { needle: Vec<u8>, limit: i8 },
  ReplaceLiteral { needle: Vec<u8>, with: Vec<u8> },
  ReplacePattern { atom: u8, with: Vec<u8> },
  Expand { atom: u8, template: u8 },
}

pub struct Scenario {
  pub text:        Vec<u8>,
  pub spare_bytes: usize,
  pub stages:      Vec<StageOp>,
}

pub fn decode_scenario(data: &[u8]) -> Scenario {
  let mut cursor = ByteCursor::new(data);
  let spare_bytes = cursor.next_usize(MAX_TEXT_BYTES);
  let stage_count = cursor.next_usize(MAX_STAGES).max(1);
  let mut stages = Vec::with_capacity(stage_count);
  for _ in 0..stage_count {
    let op = match cursor.next_u8() % 4 {
      0 => {
        StageOp::DeleteLiteral {
          needle: cursor.next_nonempty(MAX_NEEDLE_BYTES),
          limit:  cursor.next_u8() as i8,
        }
      },
      1 => {
        StageOp::ReplaceLiteral {
          needle: cursor.next_nonempty(MAX_NEEDLE_BYTES),
          with:   cursor.next_sized(MAX_SUBST_BYTES),
        }
      },
      2 => {
        StageOp::ReplacePattern {
          atom: cursor.next_u8(),
          with: cursor.next_sized(MAX_SUBST_BYTES),
        }
      },
      _ => {
        StageOp::Expand {
          atom:     cursor.next_u8(),
          template: cursor.next_u8(),
        }
      },
    };
    stages.push(op);
  }
  let text_len = cursor.next_usize(MAX_TEXT_BYTES);
  let text = cursor.next_bytes(text_len).to_vec();

  Scenario {
    text,
    spare_bytes,
    stages,
  }
}

pub fn build_stage(op: &StageOp) -> Rewriter {
  match op {
    StageOp::DeleteLiteral { needle, limit } => {
      Rewriter::delete(Matcher::literal_n(needle, *limit as isize).unwrap())
    },
    StageOp::ReplaceLiteral { needle, with } => {
      Rewriter::replace(Matcher::literal(needle).unwrap(), with.clone())
    },
    StageOp::ReplacePattern { atom, with } => {
      Rewriter::replace(Matcher::pattern(pattern_atom(*atom)).unwrap(), with.clone())
    },
    StageOp::Expand { atom, template } => {
      const TEMPLATES: &[&str] = &["", "<$0>", "${1}${2}", "$2-$1", "$$", "[${9}]"];
      let template = TEMPLATES[*template as usize % TEMPLATES.len()];
      Rewriter::expand(pattern_atom(*atom), template).unwrap()
    },
  }
}

fn pattern_atom(atom: u8) -> &'static str {
  PATTERN_ATOMS[atom as usize % PATTERN_ATOMS.len()]
}

/// Straightforward copy-based replacement used as the expected output.
pub fn reference_replace(src: &[u8], matches: &[Match], with: &[u8]) -> Vec<u8> {
  let mut out = Vec::new();
  let mut last = 0;
  for m in matches {
    out.extend_from_slice(&src[last..m.start()]);
    out.extend_from_slice(with);
    last = m.end();
  }
  out.extend_from_slice(&src[last..]);
  out
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }

  fn next_bytes(&mut self, len: usize) -> &'a [u8] {
    let start = self.pos.min(self.data.len());
    let end = start.saturating_add(len).min(self.data.len());
    self.pos = end;
    &self.data[start..end]
  }

  fn next_sized(&mut self, max: usize) -> Vec<u8> {
    let len = self.next_usize(max);
    self.next_bytes(len).to_vec()
  }

  fn next_nonempty(&mut self, max: usize) -> Vec<u8> {
    let mut bytes = self.next_sized(max);
    if bytes.is_empty() {
      bytes.push(b'a');
    }
    bytes
  }
}
