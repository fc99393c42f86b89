
use super::number::Number;
use super::function::MathFunction;
use crate::util::stricteq::StrictEq;

use std::fmt::{self, Display, Formatter};

/// A literal leaf of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
  Number(Number),
  /// A function name token, used as the callee of a call.
  Function(MathFunction),
}

impl From<Number> for Constant {
  fn from(n: Number) -> Self {
    Self::Number(n)
  }
}

impl From<MathFunction> for Constant {
  fn from(f: MathFunction) -> Self {
    Self::Function(f)
  }
}

impl From<i64> for Constant {
  fn from(n: i64) -> Self {
    Self::Number(Number::from(n))
  }
}

impl From<f64> for Constant {
  fn from(n: f64) -> Self {
    Self::Number(Number::from(n))
  }
}

impl StrictEq for Constant {
  fn strict_eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Constant::Number(a), Constant::Number(b)) => a.strict_eq(b),
      (a, b) => a == b,
    }
  }
}

impl Display for Constant {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Constant::Number(n) => write!(f, "{n}"),
      Constant::Function(func) => write!(f, "{func}"),
    }
  }
}
