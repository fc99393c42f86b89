
//! Symbolic differentiation of algebraic expression trees.
//!
//! The heart of the crate is [`expr::calculus`], which rewrites an
//! [`Expr`](expr::Expr) into the tree of its derivative. The rest of
//! [`expr`] is the tree itself and the collaborators the
//! differentiator leans on: dependency queries, best-effort constant
//! folding, numeric evaluation and printing. Nothing here simplifies
//! a derivative; the output keeps every `* 1` factor and nested sum
//! the rules produce.

pub mod error;
pub mod expr;
pub mod util;

pub use error::Error;

use expr::Expr;
use expr::calculus::differentiate;
use expr::evaluator::{Bindings, evaluate};
use expr::number::Number;
use expr::var::Var;

/// Differentiates `expr` with respect to the variable named
/// `variable`, then evaluates the derivative at `variable = value`.
///
/// `value` is parsed as a [`Number`], so `"2"` and `"1:3"` evaluate
/// exactly wherever the derivative allows it.
pub fn derivative_at(expr: Expr, variable: &str, value: &str) -> Result<Number, Error> {
  let var = Var::try_from(variable)?;
  let value: Number = value.parse()?;
  let derivative = differentiate(expr, &Expr::from(var.clone()), &[])?;
  let bindings = Bindings::from([(var, value)]);
  Ok(evaluate(&derivative, &bindings)?)
}
