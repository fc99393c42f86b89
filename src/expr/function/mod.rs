
//! The closed set of named math-library functions that expressions
//! can call and that the default derivative table knows about.

use crate::expr::Expr;
use crate::expr::atom::Constant;

use phf::phf_map;
use serde::{Serialize, Deserialize};

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathFunction {
  Sin,
  Cos,
  Tan,
  /// Natural logarithm.
  Log,
  Exp,
}

/// Names under which each function is bound in the math library.
static FUNCTION_NAMES: phf::Map<&'static str, MathFunction> = phf_map! {
  "sin" => MathFunction::Sin,
  "cos" => MathFunction::Cos,
  "tan" => MathFunction::Tan,
  "log" => MathFunction::Log,
  "ln" => MathFunction::Log,
  "exp" => MathFunction::Exp,
};

impl MathFunction {
  pub fn name(self) -> &'static str {
    match self {
      MathFunction::Sin => "sin",
      MathFunction::Cos => "cos",
      MathFunction::Tan => "tan",
      MathFunction::Log => "log",
      MathFunction::Exp => "exp",
    }
  }

  pub fn from_name(name: &str) -> Option<MathFunction> {
    FUNCTION_NAMES.get(name).copied()
  }

  /// Resolves the callee of a call node to a known function.
  ///
  /// A callee resolves if it is a function token constant, or a bare
  /// variable whose name is bound in the math library. Any other
  /// callee (including user-defined names) is a free symbolic
  /// function and does not resolve.
  pub fn resolve(callee: &Expr) -> Option<MathFunction> {
    match callee {
      Expr::Constant(Constant::Function(f)) => Some(*f),
      Expr::Var(v) => MathFunction::from_name(v.as_str()),
      _ => None,
    }
  }

  /// The callee expression for this function, as a constant token.
  pub fn callee(self) -> Expr {
    Expr::Constant(Constant::Function(self))
  }

  /// Builds a call to this function.
  pub fn call(self, args: Vec<Expr>) -> Expr {
    Expr::call(self.callee(), args)
  }

  pub fn apply(self, arg: f64) -> f64 {
    match self {
      MathFunction::Sin => arg.sin(),
      MathFunction::Cos => arg.cos(),
      MathFunction::Tan => arg.tan(),
      MathFunction::Log => arg.ln(),
      MathFunction::Exp => arg.exp(),
    }
  }
}

impl Display for MathFunction {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}
