
use super::options::DerivativeOptions;
use super::table::{DerivativeTable, MathDerivativeTable};
use crate::expr::Expr;
use crate::expr::function::MathFunction;
use crate::expr::evaluator::fold_constant;
use crate::expr::predicates::is_constant;
use crate::expr::walker;

use num::pow::Pow;
use thiserror::Error;

/// Differentiates expression trees with respect to a single variable.
///
/// The engine holds no state beyond its configuration, so one engine
/// can differentiate any number of trees.
pub struct DerivativeEngine<'a> {
  variable: &'a Expr,
  parameters: &'a [Expr],
  table: &'a dyn DerivativeTable,
}

#[derive(Debug, Clone, Error)]
#[error("Cannot differentiate {original_expr}: {error}")]
pub struct DifferentiationFailure {
  pub original_expr: Expr,
  #[source]
  pub error: DifferentiationError,
  _priv: (), // Prevent construction outside of this module
}

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum DifferentiationError {
  #[error("Derivative of function '{name}' with {arity} argument(s) is not known")]
  UnsupportedFunction { name: String, arity: usize },
  #[error("Cannot differentiate a {0} node")]
  UnsupportedNode(&'static str),
  #[error("Expression depth {depth} exceeds the limit of {limit}")]
  DepthLimitExceeded { depth: usize, limit: usize },
}

impl DifferentiationFailure {
  fn new(original_expr: Expr, error: DifferentiationError) -> Self {
    tracing::debug!(%error, "differentiation failed");
    Self { original_expr, error, _priv: () }
  }
}

impl DifferentiationError {
  pub fn unsupported_function(callee: &Expr, arity: usize) -> Self {
    DifferentiationError::UnsupportedFunction { name: callee.to_string(), arity }
  }
}

impl<'a> DerivativeEngine<'a> {
  /// An engine for `d/d(variable)`. Members of `parameters`
  /// differentiate to themselves; every other free identifier is a
  /// constant.
  pub fn new(variable: &'a Expr, parameters: &'a [Expr], table: &'a dyn DerivativeTable) -> Self {
    Self { variable, parameters, table }
  }

  pub fn differentiate(&self, expr: &Expr) -> Result<Expr, DifferentiationError> {
    tracing::trace!(kind = expr.kind_name(), "differentiating node");
    match expr {
      Expr::Constant(_) => Ok(self.map_constant()),
      Expr::Var(_) | Expr::Subscript(_, _) => Ok(self.map_variable(expr)),
      Expr::Call(callee, args) => self.map_call(callee, args),
      Expr::Negation(child) => self.map_negation(child),
      Expr::Sum(children) => self.map_sum(children),
      Expr::Product(children) => self.map_product(children),
      Expr::Quotient(numer, denom) => self.map_quotient(numer, denom),
      Expr::Power(base, exponent) => self.map_power(base, exponent),
      Expr::Polynomial(_) => Err(DifferentiationError::UnsupportedNode(expr.kind_name())),
    }
  }

  pub fn map_constant(&self) -> Expr {
    Expr::zero()
  }

  pub fn map_variable(&self, expr: &Expr) -> Expr {
    if expr == self.variable {
      Expr::one()
    } else if self.parameters.contains(expr) {
      expr.clone()
    } else {
      Expr::zero()
    }
  }

  /// Chain rule. Arguments which do not depend on the variable are
  /// skipped, so a call with no such arguments differentiates to the
  /// empty sum.
  pub fn map_call(&self, callee: &Expr, args: &[Expr]) -> Result<Expr, DifferentiationError> {
    let mut terms = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
      if self.is_constant(arg) {
        continue;
      }
      let outer = self.table.derivative_rule(i, callee, args)?;
      terms.push(outer * self.differentiate(arg)?);
    }
    Ok(Expr::sum(terms))
  }

  pub fn map_negation(&self, child: &Expr) -> Result<Expr, DifferentiationError> {
    Ok(- self.differentiate(child)?)
  }

  pub fn map_sum(&self, children: &[Expr]) -> Result<Expr, DifferentiationError> {
    let terms = children.iter()
      .filter(|child| !self.is_constant(child))
      .map(|child| self.differentiate(child))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::sum(terms))
  }

  /// Product rule over `n` factors: one term per non-constant factor,
  /// in which that factor is replaced by its derivative.
  pub fn map_product(&self, children: &[Expr]) -> Result<Expr, DifferentiationError> {
    let mut terms = Vec::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
      if self.is_constant(child) {
        continue;
      }
      let mut factors = children.to_vec();
      factors[i] = self.differentiate(child)?;
      terms.push(Expr::product(factors));
    }
    Ok(Expr::sum(terms))
  }

  pub fn map_quotient(&self, f: &Expr, g: &Expr) -> Result<Expr, DifferentiationError> {
    let two = || Expr::from(2);
    match (self.is_constant(f), self.is_constant(g)) {
      (true, true) => {
        Ok(Expr::zero())
      }
      (true, false) => {
        let f = fold_constant(f);
        Ok(-f * self.differentiate(g)? / g.clone().pow(two()))
      }
      (false, true) => {
        let g = fold_constant(g);
        Ok(self.differentiate(f)? / g)
      }
      (false, false) => {
        let df = self.differentiate(f)?;
        let dg = self.differentiate(g)?;
        Ok((df * g.clone() - dg * f.clone()) / g.clone().pow(two()))
      }
    }
  }

  pub fn map_power(&self, f: &Expr, g: &Expr) -> Result<Expr, DifferentiationError> {
    match (self.is_constant(f), self.is_constant(g)) {
      (true, true) => {
        Ok(Expr::zero())
      }
      (true, false) => {
        let f = fold_constant(f);
        self.exponential_term(&f, g)
      }
      (false, true) => {
        let g = fold_constant(g);
        self.power_term(f, &g)
      }
      (false, false) => {
        Ok(self.exponential_term(f, g)? + self.power_term(f, g)?)
      }
    }
  }

  /// `ln(f) * f^g * g'`
  fn exponential_term(&self, f: &Expr, g: &Expr) -> Result<Expr, DifferentiationError> {
    Ok(Expr::product(vec![
      MathFunction::Log.call(vec![f.clone()]),
      f.clone().pow(g.clone()),
      self.differentiate(g)?,
    ]))
  }

  /// `g * f^(g - 1) * f'`
  fn power_term(&self, f: &Expr, g: &Expr) -> Result<Expr, DifferentiationError> {
    Ok(Expr::product(vec![
      g.clone(),
      f.clone().pow(g.clone() - Expr::one()),
      self.differentiate(f)?,
    ]))
  }

  fn is_constant(&self, expr: &Expr) -> bool {
    is_constant(expr, self.variable)
  }
}

/// Differentiates `expr` with respect to `variable`, using the
/// default derivative table and options.
pub fn differentiate(expr: Expr, variable: &Expr, parameters: &[Expr]) -> Result<Expr, DifferentiationFailure> {
  differentiate_with(expr, variable, parameters, &MathDerivativeTable, &DerivativeOptions::default())
}

/// Differentiates `expr` with respect to `variable`, consulting
/// `table` for the derivatives of named functions.
///
/// Trees deeper than `options.max_depth` are rejected before any
/// recursion happens. On failure, `expr` is handed back inside the
/// [`DifferentiationFailure`].
pub fn differentiate_with(
  expr: Expr,
  variable: &Expr,
  parameters: &[Expr],
  table: &dyn DerivativeTable,
  options: &DerivativeOptions,
) -> Result<Expr, DifferentiationFailure> {
  let depth = walker::depth(&expr);
  if depth > options.max_depth {
    let error = DifferentiationError::DepthLimitExceeded { depth, limit: options.max_depth };
    return Err(DifferentiationFailure::new(expr, error));
  }
  tracing::debug!(%variable, %expr, depth, "differentiating expression");
  let engine = DerivativeEngine::new(variable, parameters, table);
  match engine.differentiate(&expr) {
    Ok(derivative) => Ok(derivative),
    Err(error) => Err(DifferentiationFailure::new(expr, error)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_strict_eq;
  use crate::expr::{Polynomial, PolynomialTerm};
  use crate::expr::evaluator::evaluate_f64;

  use approx::assert_relative_eq;
  use quickcheck::{QuickCheck, TestResult};

  fn var(s: &str) -> Expr {
    Expr::var(s).unwrap()
  }

  fn d(expr: &Expr) -> Expr {
    differentiate(expr.clone(), &var("x"), &[]).unwrap()
  }

  fn at(expr: &Expr, x: f64) -> f64 {
    evaluate_f64(expr, &[("x", x)]).unwrap()
  }

  fn sin(arg: Expr) -> Expr {
    MathFunction::Sin.call(vec![arg])
  }

  #[test]
  fn test_constants_differentiate_to_zero() {
    assert_strict_eq!(d(&Expr::from(7)), Expr::zero());
    assert_strict_eq!(d(&Expr::from(-2.5)), Expr::zero());
    assert_strict_eq!(d(&MathFunction::Log.callee()), Expr::zero());
  }

  #[test]
  fn test_variables() {
    assert_strict_eq!(d(&var("x")), Expr::one());
    assert_strict_eq!(d(&var("y")), Expr::zero());
    let p = var("p");
    assert_strict_eq!(differentiate(p.clone(), &var("x"), &[p.clone()]).unwrap(), p);
  }

  #[test]
  fn test_subscripts_as_variables() {
    let x0 = Expr::subscript(var("x"), Expr::from(0));
    let x1 = Expr::subscript(var("x"), Expr::from(1));
    assert_strict_eq!(differentiate(x0.clone(), &x0, &[]).unwrap(), Expr::one());
    assert_strict_eq!(differentiate(x1.clone(), &x0, &[]).unwrap(), Expr::zero());
    assert_strict_eq!(differentiate(x1.clone(), &x0, &[x1.clone()]).unwrap(), x1);
    // x[0] is opaque, so it does not depend on x.
    assert_strict_eq!(d(&x0), Expr::zero());
  }

  #[test]
  fn test_sum_skips_constant_terms() {
    assert_strict_eq!(d(&(var("x") + Expr::from(3))), Expr::one());
    assert_strict_eq!(d(&(var("y") + Expr::from(3))), Expr::zero());
    assert_strict_eq!(
      d(&Expr::Sum(vec![var("x"), var("y"), var("x")])),
      Expr::Sum(vec![Expr::one(), Expr::one()]),
    );
  }

  #[test]
  fn test_negation() {
    assert_strict_eq!(d(&-var("x")), -Expr::one());
    assert_strict_eq!(d(&(var("y") - var("x"))), -Expr::one());
  }

  #[test]
  fn test_product_rule() {
    let expr = var("x") * var("x");
    assert_strict_eq!(
      d(&expr),
      Expr::Sum(vec![
        Expr::Product(vec![Expr::one(), var("x")]),
        Expr::Product(vec![var("x"), Expr::one()]),
      ]),
    );
    assert_relative_eq!(at(&d(&expr), 3.0), 6.0);
  }

  #[test]
  fn test_product_rule_keeps_constant_factors() {
    let expr = Expr::Product(vec![Expr::from(2), var("x"), var("y")]);
    assert_strict_eq!(d(&expr), Expr::Product(vec![Expr::from(2), Expr::one(), var("y")]));
    let expr = Expr::Product(vec![var("x"), var("x"), var("x")]);
    assert_relative_eq!(at(&d(&expr), 2.0), 12.0);
  }

  #[test]
  fn test_quotient_rule() {
    let expr = Expr::one() / var("x");
    assert_strict_eq!(
      d(&expr),
      Expr::quotient(
        Expr::Product(vec![-Expr::one(), Expr::one()]),
        Expr::power(var("x"), Expr::from(2)),
      ),
    );
    assert_relative_eq!(at(&d(&expr), 2.0), -0.25);
  }

  #[test]
  fn test_quotient_folds_constant_side() {
    let expr = (Expr::from(2) + Expr::from(3)) / var("x");
    assert_strict_eq!(
      d(&expr),
      Expr::quotient(
        Expr::Product(vec![-Expr::from(5), Expr::one()]),
        Expr::power(var("x"), Expr::from(2)),
      ),
    );
    let expr = var("x") / (Expr::from(1) + Expr::from(1));
    assert_strict_eq!(d(&expr), Expr::quotient(Expr::one(), Expr::from(2)));
    // Symbolic constants stay as they are.
    let expr = var("x") / (var("a") + Expr::from(1));
    assert_strict_eq!(d(&expr), Expr::quotient(Expr::one(), var("a") + Expr::from(1)));
  }

  #[test]
  fn test_full_quotient_rule() {
    let expr = var("x") / (var("x") + Expr::from(1));
    // 1 / (x + 1)^2
    assert_relative_eq!(at(&d(&expr), 1.0), 0.25);
    assert_relative_eq!(at(&d(&expr), 3.0), 1.0 / 16.0);
    assert_strict_eq!(d(&(var("a") / var("b"))), Expr::zero());
  }

  #[test]
  fn test_power_rule_constant_exponent() {
    let expr = Expr::power(var("x"), Expr::from(3));
    assert_strict_eq!(
      d(&expr),
      Expr::Product(vec![
        Expr::from(3),
        Expr::power(var("x"), Expr::from(3) - Expr::one()),
        Expr::one(),
      ]),
    );
    assert_relative_eq!(at(&d(&expr), 2.0), 12.0);
  }

  #[test]
  fn test_power_rule_symbolic_exponent() {
    let expr = Expr::power(var("x"), var("n"));
    assert_strict_eq!(
      d(&expr),
      Expr::Product(vec![var("n"), Expr::power(var("x"), var("n") - Expr::one()), Expr::one()]),
    );
  }

  #[test]
  fn test_exponential_rule() {
    let expr = Expr::power(Expr::from(2), var("x"));
    assert_strict_eq!(
      d(&expr),
      Expr::Product(vec![
        MathFunction::Log.call(vec![Expr::from(2)]),
        Expr::power(Expr::from(2), var("x")),
        Expr::one(),
      ]),
    );
    assert_relative_eq!(at(&d(&expr), 1.0), 2.0 * 2f64.ln(), epsilon = 1e-12);
  }

  #[test]
  fn test_exponential_rule_keeps_symbolic_base() {
    let e = MathFunction::Exp.call(vec![Expr::one()]);
    let expr = Expr::power(e.clone(), var("x"));
    assert_strict_eq!(
      d(&expr),
      Expr::Product(vec![
        MathFunction::Log.call(vec![e.clone()]),
        Expr::power(e, var("x")),
        Expr::one(),
      ]),
    );
  }

  #[test]
  fn test_general_power_rule() {
    // d/dx x^x = x^x * (ln(x) + 1)
    let expr = Expr::power(var("x"), var("x"));
    assert_relative_eq!(at(&d(&expr), 2.0), 4.0 * (2f64.ln() + 1.0), epsilon = 1e-12);
    assert_strict_eq!(d(&Expr::power(var("a"), var("b"))), Expr::zero());
  }

  #[test]
  fn test_chain_rule() {
    let expr = sin(var("x") * var("x"));
    assert_relative_eq!(at(&d(&expr), 0.0), 0.0);
    assert_relative_eq!(at(&d(&expr), 1.0), 1f64.cos() * 2.0, epsilon = 1e-12);
  }

  #[test]
  fn test_chain_rule_for_each_function() {
    let x: f64 = 0.7;
    let cases = [
      (MathFunction::Sin, (2.0 * x).cos() * 2.0),
      (MathFunction::Cos, -(2.0 * x).sin() * 2.0),
      (MathFunction::Tan, ((2.0 * x).tan().powi(2) + 1.0) * 2.0),
      (MathFunction::Log, 1.0 / x),
      (MathFunction::Exp, (2.0 * x).exp() * 2.0),
    ];
    for (function, expected) in cases {
      let expr = function.call(vec![Expr::from(2) * var("x")]);
      assert_relative_eq!(at(&d(&expr), x), expected, epsilon = 1e-12);
    }
  }

  #[test]
  fn test_call_with_constant_arguments_is_zero() {
    assert_strict_eq!(d(&sin(var("y"))), Expr::zero());
    // Unknown functions are never consulted for constant arguments.
    assert_strict_eq!(d(&Expr::call(var("f"), vec![var("y")])), Expr::zero());
  }

  #[test]
  fn test_chain_rule_structure() {
    let expr = sin(var("x") * Expr::from(2));
    assert_strict_eq!(
      d(&expr),
      Expr::Product(vec![
        MathFunction::Cos.call(vec![var("x") * Expr::from(2)]),
        Expr::Product(vec![Expr::one(), Expr::from(2)]),
      ]),
    );
  }

  #[test]
  fn test_unsupported_function() {
    let expr = var("x") + Expr::from(2) * Expr::call(var("f"), vec![var("x")]);
    let failure = differentiate(expr.clone(), &var("x"), &[]).unwrap_err();
    assert_eq!(
      failure.error,
      DifferentiationError::UnsupportedFunction { name: String::from("f"), arity: 1 },
    );
    assert_strict_eq!(failure.original_expr, expr);
  }

  #[test]
  fn test_unsupported_arity() {
    let expr = MathFunction::Sin.call(vec![var("x"), var("x")]);
    let failure = differentiate(expr, &var("x"), &[]).unwrap_err();
    assert_eq!(
      failure.error,
      DifferentiationError::UnsupportedFunction { name: String::from("sin"), arity: 2 },
    );
  }

  #[test]
  fn test_polynomial_is_unsupported() {
    let poly = Expr::from(Polynomial::new(var("x"), vec![
      PolynomialTerm { exponent: 2, coefficient: Expr::one() },
    ]));
    let failure = differentiate(poly.clone(), &var("x"), &[]).unwrap_err();
    assert_eq!(failure.error, DifferentiationError::UnsupportedNode("polynomial"));
    let failure = differentiate(poly * var("y"), &var("x"), &[]).unwrap_err();
    assert_eq!(failure.error, DifferentiationError::UnsupportedNode("polynomial"));
  }

  #[test]
  fn test_failure_message() {
    let expr = Expr::call(var("f"), vec![var("x")]);
    let failure = differentiate(expr, &var("x"), &[]).unwrap_err();
    assert_eq!(
      failure.to_string(),
      "Cannot differentiate f(x): Derivative of function 'f' with 1 argument(s) is not known",
    );
  }

  #[test]
  fn test_parameters() {
    let p = var("p");
    let params = [p.clone()];
    // Parameters never count as the varying factor of a product.
    assert_strict_eq!(
      differentiate(p.clone() * var("x"), &var("x"), &params).unwrap(),
      Expr::Product(vec![p.clone(), Expr::one()]),
    );
    assert_strict_eq!(
      differentiate(p.clone() + var("x"), &var("x"), &params).unwrap(),
      Expr::one(),
    );
  }

  #[test]
  fn test_custom_table() {
    let square = |index: usize, callee: &Expr, args: &[Expr]| -> Result<Expr, DifferentiationError> {
      if callee == &var("sq") && args.len() == 1 {
        Ok(Expr::from(2) * args[0].clone())
      } else {
        MathDerivativeTable.derivative_rule(index, callee, args)
      }
    };
    let expr = Expr::call(var("sq"), vec![sin(var("x"))]);
    let result = differentiate_with(expr, &var("x"), &[], &square, &DerivativeOptions::default()).unwrap();
    // 2 sin(x) cos(x)
    assert_relative_eq!(at(&result, 0.4), 2.0 * 0.4f64.sin() * 0.4f64.cos(), epsilon = 1e-12);
    let failure = differentiate_with(Expr::call(var("g"), vec![var("x")]), &var("x"), &[], &square, &DerivativeOptions::default());
    assert!(failure.is_err());
  }

  #[test]
  fn test_multiple_argument_function() {
    // hyp(a, b) = sqrt(a^2 + b^2), with partials a / hyp and b / hyp.
    let table = |index: usize, callee: &Expr, args: &[Expr]| -> Result<Expr, DifferentiationError> {
      if callee != &var("hyp") || args.len() != 2 {
        return Err(DifferentiationError::unsupported_function(callee, args.len()));
      }
      Ok(args[index].clone() / Expr::call(var("hyp"), args.to_vec()))
    };
    let args = vec![var("x"), var("x") * Expr::from(2)];
    let hyp = Expr::call(var("hyp"), args.clone());
    let result = differentiate_with(hyp.clone(), &var("x"), &[], &table, &DerivativeOptions::default()).unwrap();
    assert_strict_eq!(
      result,
      Expr::Sum(vec![
        Expr::Product(vec![Expr::quotient(args[0].clone(), hyp.clone()), Expr::one()]),
        Expr::Product(vec![
          Expr::quotient(args[1].clone(), hyp.clone()),
          Expr::Product(vec![Expr::one(), Expr::from(2)]),
        ]),
      ]),
    );
  }

  #[test]
  fn test_input_is_not_modified() {
    let expr = Expr::quotient(sin(var("x")), Expr::power(var("x"), Expr::from(2))) + var("x") * var("y");
    let before = expr.clone();
    let _ = d(&expr);
    assert_strict_eq!(expr, before);
  }

  #[test]
  fn test_depth_limit() {
    let mut expr = var("x");
    for _ in 0..20 {
      expr = -expr;
    }
    let options = DerivativeOptions::new().with_max_depth(10);
    let failure = differentiate_with(expr.clone(), &var("x"), &[], &MathDerivativeTable, &options).unwrap_err();
    assert_eq!(failure.error, DifferentiationError::DepthLimitExceeded { depth: 21, limit: 10 });
    let options = DerivativeOptions::new().with_max_depth(21);
    assert!(differentiate_with(expr, &var("x"), &[], &MathDerivativeTable, &options).is_ok());
  }

  #[test]
  fn test_default_depth_limit() {
    let mut expr = var("x");
    for _ in 0..300_000 {
      expr = -expr;
    }
    let failure = differentiate(expr, &var("x"), &[]).unwrap_err();
    assert_eq!(
      failure.error,
      DifferentiationError::DepthLimitExceeded { depth: 300_001, limit: DerivativeOptions::DEFAULT_MAX_DEPTH },
    );
    assert_eq!(walker::depth(&failure.original_expr), 300_001);
    // Dropping a tree this deep recursively would overflow the test
    // thread's stack.
    std::mem::forget(failure);
  }

  #[test]
  fn test_default_depth_limit_fits_in_thread_stack() {
    fn nest(levels: usize, wrap: impl Fn(Expr) -> Expr) -> Expr {
      let mut expr = var("x");
      for _ in 0..levels {
        expr = wrap(expr);
      }
      expr
    }
    let limit = DerivativeOptions::DEFAULT_MAX_DEPTH;
    let handle = std::thread::Builder::new()
      .stack_size(2 << 20)
      .spawn(move || {
        let quotients = nest(limit - 1, |e| var("x") / e);
        let powers = nest(limit - 1, |e| Expr::power(var("x"), e));
        let calls = nest(limit - 1, sin);
        for expr in [quotients, powers, calls] {
          assert_eq!(walker::depth(&expr), limit);
          assert!(differentiate(expr, &var("x"), &[]).is_ok());
        }
      })
      .unwrap();
    handle.join().unwrap();
  }

  #[test]
  fn test_concurrent_differentiation() {
    let expr = sin(var("x") * var("x")) + Expr::power(var("x"), Expr::from(3));
    let expr = &expr;
    let results: Vec<f64> = std::thread::scope(|scope| {
      let handles: Vec<_> = (0..4).map(|_| scope.spawn(move || at(&d(expr), 1.0))).collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let expected = 1f64.cos() * 2.0 + 3.0;
    for result in results {
      assert_relative_eq!(result, expected, epsilon = 1e-12);
    }
  }

  #[test]
  fn test_linearity_at_sample_points() {
    fn prop(n: i16) -> TestResult {
      let x = f64::from(n) / 1000.0;
      let a = var("x") * sin(var("x"));
      let b = Expr::power(var("x"), Expr::from(3)) / (var("x") * var("x") + Expr::from(1));
      let lhs = at(&d(&(a.clone() + b.clone())), x);
      let rhs = at(&(d(&a) + d(&b)), x);
      TestResult::from_bool(approx::relative_eq!(lhs, rhs, epsilon = 1e-9, max_relative = 1e-9))
    }
    QuickCheck::new().tests(200).quickcheck(prop as fn(i16) -> TestResult);
  }
}
