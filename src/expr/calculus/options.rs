
use crate::error::Error;

use serde::{Serialize, Deserialize};

/// Tunable limits for the differentiator.
///
/// Every field has a default, so a configuration document only needs
/// to name the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivativeOptions {
  /// Deepest expression tree the differentiator accepts. The
  /// differentiator recurses through several frames per tree level,
  /// so this bounds its stack usage. The default fits in a 2 MiB
  /// thread stack for every node kind.
  pub max_depth: usize,
}

impl DerivativeOptions {
  pub const DEFAULT_MAX_DEPTH: usize = 256;

  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  pub fn from_json(json: &str) -> Result<Self, Error> {
    Ok(serde_json::from_str(json)?)
  }
}

impl Default for DerivativeOptions {
  fn default() -> Self {
    Self { max_depth: Self::DEFAULT_MAX_DEPTH }
  }
}
