//! Command line front end for the-rewrite.
//!
//! Builds a pipeline from a TOML config and applies it to each input file (or
//! stdin), writing the rewritten bytes to stdout or `--output`.

mod config;

use std::{
  fs::File,
  io::{
    self,
    BufWriter,
    Read,
    Write,
  },
  path::PathBuf,
};

use clap::{
  ArgAction,
  Parser,
};
use eyre::{
  Result,
  WrapErr,
};
use the_rewrite::Rewriter;

#[derive(Debug, Parser)]
#[command(name = "the-rewrite")]
#[command(about = "Apply a delete/replace/expand pipeline to text")]
struct Cli {
  /// Pipeline configuration (defaults to $THE_REWRITE_CONFIG, then
  /// <config dir>/the-rewrite/pipeline.toml)
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  config: Option<PathBuf>,

  /// Write output to FILE instead of stdout
  #[arg(short = 'o', long = "output", value_name = "FILE")]
  output: Option<PathBuf>,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count)]
  verbosity: u8,

  /// Input files; reads stdin when none are given
  #[arg(value_name = "FILES")]
  inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbosity);

  let config_path = config::resolve(cli.config)?;
  log::info!("loading pipeline from {}", config_path.display());
  let rewriter = config::load(&config_path)?;
  log::debug!("pipeline has {} stages", rewriter.stages());

  let mut out: Box<dyn Write> = match &cli.output {
    Some(path) => {
      let file = File::create(path)
        .wrap_err_with(|| format!("failed to create '{}'", path.display()))?;
      Box::new(BufWriter::new(file))
    },
    None => Box::new(BufWriter::new(io::stdout().lock())),
  };

  run(&rewriter, &cli.inputs, &mut out)?;
  out.flush().wrap_err("failed to flush output")?;
  Ok(())
}

fn setup_logging(verbosity: u8) {
  let level = match verbosity {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    2 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };
  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .init();
}

/// Rewrites every input into `out`, carrying the spare buffer from one input
/// to the next.
fn run(rewriter: &Rewriter, inputs: &[PathBuf], out: &mut dyn Write) -> Result<()> {
  let mut spare = Vec::new();

  if inputs.is_empty() {
    let mut input = Vec::new();
    io::stdin()
      .read_to_end(&mut input)
      .wrap_err("failed to read stdin")?;
    let (result, _) = rewriter.rewrite(input, spare);
    out.write_all(&result).wrap_err("failed to write output")?;
    return Ok(());
  }

  for path in inputs {
    let input =
      std::fs::read(path).wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
    log::debug!("rewriting {} ({} bytes)", path.display(), input.len());
    let (result, next) = rewriter.rewrite(input, spare);
    out.write_all(&result).wrap_err("failed to write output")?;
    spare = next;
  }

  Ok(())
}
