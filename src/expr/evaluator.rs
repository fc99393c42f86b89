
//! Numeric evaluation of expression trees, and the best-effort
//! constant folding used by the differentiator.

use super::Expr;
use super::atom::Constant;
use super::number::Number;
use super::var::Var;
use super::function::MathFunction;

use num::BigInt;
use thiserror::Error;

use std::collections::HashMap;

/// Values for the free variables of an expression.
pub type Bindings = HashMap<Var, Number>;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EvalError {
  #[error("Unbound variable '{0}'")]
  UnboundVariable(String),
  #[error("Cannot evaluate function '{0}'")]
  UnknownFunction(String),
  #[error("Function '{name}' expects {expected} argument(s), got {actual}")]
  WrongArity { name: &'static str, expected: usize, actual: usize },
  #[error("Function token '{0}' is not a value")]
  NotAValue(MathFunction),
  #[error("Division by zero")]
  DivisionByZero,
}

/// Evaluates `expr` to a real number, looking up free variables in
/// `bindings`.
///
/// Exact inputs produce exact outputs wherever the operations allow.
/// Calls to transcendental functions are computed in floating point.
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<Number, EvalError> {
  Evaluator { bindings, evaluate_calls: true }.eval(expr)
}

/// Attempts to reduce `expr` to a literal constant. If the expression
/// cannot be evaluated on its own (for instance, because it mentions
/// a variable), the original expression is returned unchanged.
///
/// Folding sees no function library, so calls such as `exp(1)` stay
/// symbolic rather than collapsing to a float.
pub fn fold_constant(expr: &Expr) -> Expr {
  let evaluator = Evaluator { bindings: &Bindings::new(), evaluate_calls: false };
  match evaluator.eval(expr) {
    Ok(value) => Expr::from(value),
    Err(err) => {
      tracing::trace!(expr = %expr, error = %err, "keeping subexpression unevaluated");
      expr.clone()
    }
  }
}

struct Evaluator<'a> {
  bindings: &'a Bindings,
  evaluate_calls: bool,
}

impl<'a> Evaluator<'a> {
  fn eval(&self, expr: &Expr) -> Result<Number, EvalError> {
    match expr {
      Expr::Constant(Constant::Number(n)) => Ok(n.clone()),
      Expr::Constant(Constant::Function(f)) => Err(EvalError::NotAValue(*f)),
      Expr::Var(v) => {
        self.bindings.get(v).cloned().ok_or_else(|| EvalError::UnboundVariable(v.to_string()))
      }
      Expr::Subscript(_, _) => Err(EvalError::UnboundVariable(expr.to_string())),
      Expr::Call(callee, args) => self.eval_call(callee, args),
      Expr::Negation(child) => Ok(- self.eval(child)?),
      Expr::Sum(children) => {
        children.iter().try_fold(Number::from(0), |acc, child| Ok(acc + self.eval(child)?))
      }
      Expr::Product(children) => {
        children.iter().try_fold(Number::from(1), |acc, child| Ok(acc * self.eval(child)?))
      }
      Expr::Quotient(numer, denom) => {
        let numer = self.eval(numer)?;
        let denom = self.eval(denom)?;
        numer.checked_div(&denom).ok_or(EvalError::DivisionByZero)
      }
      Expr::Power(base, exponent) => {
        let base = self.eval(base)?;
        let exponent = self.eval(exponent)?;
        base.pow_real(&exponent).ok_or(EvalError::DivisionByZero)
      }
      Expr::Polynomial(poly) => {
        let base = self.eval(&poly.base)?;
        poly.terms.iter().try_fold(Number::from(0), |acc, term| {
          let coefficient = self.eval(&term.coefficient)?;
          let power = base.powi(BigInt::from(term.exponent)).ok_or(EvalError::DivisionByZero)?;
          Ok(acc + coefficient * power)
        })
      }
    }
  }

  fn eval_call(&self, callee: &Expr, args: &[Expr]) -> Result<Number, EvalError> {
    let f = MathFunction::resolve(callee)
      .filter(|_| self.evaluate_calls)
      .ok_or_else(|| EvalError::UnknownFunction(callee.to_string()))?;
    let [arg] = args else {
      return Err(EvalError::WrongArity { name: f.name(), expected: 1, actual: args.len() });
    };
    let arg = self.eval(arg)?;
    Ok(Number::from(f.apply(arg.to_f64())))
  }
}

/// Evaluates `expr` in floating point, binding each name in
/// `bindings` to the given value.
pub fn evaluate_f64(expr: &Expr, bindings: &[(&str, f64)]) -> Result<f64, EvalError> {
  let bindings = bindings.iter()
    .map(|(name, value)| {
      let var = Var::new(*name).ok_or_else(|| EvalError::UnboundVariable(name.to_string()))?;
      Ok((var, Number::from(*value)))
    })
    .collect::<Result<Bindings, EvalError>>()?;
  evaluate(expr, &bindings).map(|n| n.to_f64())
}
