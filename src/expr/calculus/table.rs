
//! Derivative rules for named functions.

use super::derivative::DifferentiationError;
use crate::expr::Expr;
use crate::expr::function::MathFunction;

use num::pow::Pow;

/// A source of derivative rules for call nodes.
///
/// `derivative_rule(i, callee, args)` returns the partial derivative
/// of `callee(args...)` with respect to its `i`th argument, already
/// expressed in terms of the actual arguments. The differentiator
/// multiplies it by the derivative of the argument itself (the chain
/// rule).
///
/// This is the extension point for supporting more functions. Any
/// closure with the right signature is a table, so a caller can
/// handle a few extra functions and fall back to
/// [`MathDerivativeTable`] for the rest.
pub trait DerivativeTable {
  fn derivative_rule(&self, index: usize, callee: &Expr, args: &[Expr]) -> Result<Expr, DifferentiationError>;
}

/// The default table, covering the unary functions of
/// [`MathFunction`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MathDerivativeTable;

impl DerivativeTable for MathDerivativeTable {
  fn derivative_rule(&self, _index: usize, callee: &Expr, args: &[Expr]) -> Result<Expr, DifferentiationError> {
    let Some(function) = MathFunction::resolve(callee) else {
      return Err(DifferentiationError::unsupported_function(callee, args.len()));
    };
    let [arg] = args else {
      return Err(DifferentiationError::unsupported_function(callee, args.len()));
    };
    let arg = arg.clone();
    let rule = match function {
      MathFunction::Sin => MathFunction::Cos.call(vec![arg]),
      MathFunction::Cos => -MathFunction::Sin.call(vec![arg]),
      MathFunction::Tan => MathFunction::Tan.call(vec![arg]).pow(Expr::from(2)) + Expr::one(),
      MathFunction::Log => Expr::one() / arg,
      MathFunction::Exp => MathFunction::Exp.call(vec![arg]),
    };
    Ok(rule)
  }
}

impl<F> DerivativeTable for F
where F: Fn(usize, &Expr, &[Expr]) -> Result<Expr, DifferentiationError> {
  fn derivative_rule(&self, index: usize, callee: &Expr, args: &[Expr]) -> Result<Expr, DifferentiationError> {
    self(index, callee, args)
  }
}
