
use crate::expr::calculus::DifferentiationFailure;
use crate::expr::evaluator::EvalError;
use crate::expr::number::ParseNumberError;
use crate::expr::var::TryFromStringError;

use thiserror::Error;

/// Any error this crate can produce.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
  #[error("{0}")]
  Differentiation(#[from] DifferentiationFailure),
  #[error("{0}")]
  Eval(#[from] EvalError),
  #[error("{0}")]
  InvalidName(#[from] TryFromStringError),
  #[error("{0}")]
  ParseNumber(#[from] ParseNumberError),
  #[error("Invalid configuration: {0}")]
  Config(#[from] serde_json::Error),
}
