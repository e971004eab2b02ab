//! Locating and loading the pipeline config.

use std::path::{
  Path,
  PathBuf,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};
use eyre::{
  Result,
  WrapErr,
};
use the_rewrite::{
  PipelineConfig,
  Rewriter,
};

pub const CONFIG_ENV: &str = "THE_REWRITE_CONFIG";

/// Directory holding user configuration for the-rewrite.
pub fn config_dir() -> Result<PathBuf> {
  let strategy = choose_base_strategy().wrap_err("unable to find the config directory")?;
  let mut path = strategy.config_dir();
  path.push("the-rewrite");
  Ok(path)
}

/// Picks the config file: the explicit path, then `$THE_REWRITE_CONFIG`, then
/// `pipeline.toml` in the config directory.
pub fn resolve(explicit: Option<PathBuf>) -> Result<PathBuf> {
  if let Some(path) = explicit {
    return Ok(path);
  }
  if let Some(path) = std::env::var_os(CONFIG_ENV) {
    return Ok(PathBuf::from(path));
  }
  Ok(config_dir()?.join("pipeline.toml"))
}

pub fn load(path: &Path) -> Result<Rewriter> {
  let config = PipelineConfig::load(path)?;
  config
    .build()
    .wrap_err_with(|| format!("invalid pipeline in '{}'", path.display()))
}
