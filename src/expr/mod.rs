
pub mod arithmetic;
pub mod atom;
pub mod calculus;
pub mod display;
pub mod evaluator;
pub mod function;
pub mod number;
pub mod predicates;
pub mod var;
pub mod walker;

use atom::Constant;
use number::Number;
use var::Var;
use crate::util::stricteq::StrictEq;

use num::{Zero, One};

/// An immutable algebraic expression tree.
///
/// Trees are never mutated in place. Every transformation in this
/// crate (differentiation in particular) builds a new tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Constant(Constant),
  Var(Var),
  /// An indexed identifier, such as `x[0]`.
  Subscript(Box<Expr>, Box<Expr>),
  /// A callee applied to an ordered argument list.
  Call(Box<Expr>, Vec<Expr>),
  Negation(Box<Expr>),
  Sum(Vec<Expr>),
  Product(Vec<Expr>),
  /// Numerator and denominator.
  Quotient(Box<Expr>, Box<Expr>),
  /// Base and exponent.
  Power(Box<Expr>, Box<Expr>),
  Polynomial(Polynomial),
}

/// A sparse univariate polynomial `sum(c_i * base^e_i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
  pub base: Box<Expr>,
  pub terms: Vec<PolynomialTerm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialTerm {
  pub exponent: u32,
  pub coefficient: Expr,
}

impl Expr {
  pub fn zero() -> Expr {
    Expr::from(Number::zero())
  }

  pub fn one() -> Expr {
    Expr::from(Number::one())
  }

  /// Constructs a variable, or returns `None` if the name is not a
  /// valid identifier.
  pub fn var(name: &str) -> Option<Expr> {
    Var::new(name).map(Expr::Var)
  }

  pub fn subscript(aggregate: impl Into<Expr>, index: impl Into<Expr>) -> Expr {
    Expr::Subscript(Box::new(aggregate.into()), Box::new(index.into()))
  }

  pub fn call(callee: impl Into<Expr>, args: Vec<Expr>) -> Expr {
    Expr::Call(Box::new(callee.into()), args)
  }

  pub fn quotient(numerator: impl Into<Expr>, denominator: impl Into<Expr>) -> Expr {
    Expr::Quotient(Box::new(numerator.into()), Box::new(denominator.into()))
  }

  pub fn power(base: impl Into<Expr>, exponent: impl Into<Expr>) -> Expr {
    Expr::Power(Box::new(base.into()), Box::new(exponent.into()))
  }

  /// Sums a list of expressions. The empty sum is the constant `0`,
  /// and a sum of one term is that term.
  pub fn sum(mut terms: Vec<Expr>) -> Expr {
    match terms.len() {
      0 => Expr::zero(),
      1 => terms.swap_remove(0),
      _ => Expr::Sum(terms),
    }
  }

  /// Multiplies a list of expressions. The empty product is the
  /// constant `1`, and a product of one factor is that factor.
  pub fn product(mut factors: Vec<Expr>) -> Expr {
    match factors.len() {
      0 => Expr::one(),
      1 => factors.swap_remove(0),
      _ => Expr::Product(factors),
    }
  }

  /// The direct subtrees of this node, in order. A call yields its
  /// callee before its arguments.
  pub fn children(&self) -> Vec<&Expr> {
    match self {
      Expr::Constant(_) | Expr::Var(_) => vec![],
      Expr::Subscript(a, b) | Expr::Quotient(a, b) | Expr::Power(a, b) => vec![&**a, &**b],
      Expr::Call(callee, args) => {
        let mut children = Vec::with_capacity(args.len() + 1);
        children.push(&**callee);
        children.extend(args);
        children
      }
      Expr::Negation(child) => vec![&**child],
      Expr::Sum(children) | Expr::Product(children) => children.iter().collect(),
      Expr::Polynomial(poly) => {
        let mut children = vec![&*poly.base];
        children.extend(poly.terms.iter().map(|t| &t.coefficient));
        children
      }
    }
  }

  /// A short name for the kind of node at the root of this tree.
  pub fn kind_name(&self) -> &'static str {
    match self {
      Expr::Constant(_) => "constant",
      Expr::Var(_) => "variable",
      Expr::Subscript(_, _) => "subscript",
      Expr::Call(_, _) => "call",
      Expr::Negation(_) => "negation",
      Expr::Sum(_) => "sum",
      Expr::Product(_) => "product",
      Expr::Quotient(_, _) => "quotient",
      Expr::Power(_, _) => "power",
      Expr::Polynomial(_) => "polynomial",
    }
  }
}

impl Polynomial {
  pub fn new(base: impl Into<Expr>, terms: Vec<PolynomialTerm>) -> Self {
    Polynomial { base: Box::new(base.into()), terms }
  }

  /// Builds a dense polynomial from coefficients in increasing degree.
  pub fn dense(base: impl Into<Expr>, coefficients: Vec<Expr>) -> Self {
    let terms = coefficients.into_iter().enumerate().map(|(i, coefficient)| {
      PolynomialTerm { exponent: i as u32, coefficient }
    }).collect();
    Polynomial::new(base, terms)
  }
}

impl From<Constant> for Expr {
  fn from(c: Constant) -> Expr {
    Expr::Constant(c)
  }
}

impl From<Number> for Expr {
  fn from(n: Number) -> Expr {
    Expr::Constant(Constant::Number(n))
  }
}

impl From<i64> for Expr {
  fn from(n: i64) -> Expr {
    Expr::from(Number::from(n))
  }
}

impl From<f64> for Expr {
  fn from(n: f64) -> Expr {
    Expr::from(Number::from(n))
  }
}

impl From<Var> for Expr {
  fn from(v: Var) -> Expr {
    Expr::Var(v)
  }
}

impl From<Polynomial> for Expr {
  fn from(p: Polynomial) -> Expr {
    Expr::Polynomial(p)
  }
}

/// Structural equality which also distinguishes numeric
/// representations, so `x * 2` is not strictly equal to `x * 2.0`.
impl StrictEq for Expr {
  fn strict_eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Expr::Constant(a), Expr::Constant(b)) => a.strict_eq(b),
      (Expr::Var(a), Expr::Var(b)) => a == b,
      (Expr::Subscript(a1, b1), Expr::Subscript(a2, b2)) |
      (Expr::Quotient(a1, b1), Expr::Quotient(a2, b2)) |
      (Expr::Power(a1, b1), Expr::Power(a2, b2)) => a1.strict_eq(a2) && b1.strict_eq(b2),
      (Expr::Call(f1, args1), Expr::Call(f2, args2)) => f1.strict_eq(f2) && args1.strict_eq(args2),
      (Expr::Negation(a), Expr::Negation(b)) => a.strict_eq(b),
      (Expr::Sum(a), Expr::Sum(b)) | (Expr::Product(a), Expr::Product(b)) => a.strict_eq(b),
      (Expr::Polynomial(a), Expr::Polynomial(b)) => {
        a.base.strict_eq(&b.base) &&
          a.terms.len() == b.terms.len() &&
          a.terms.iter().zip(&b.terms).all(|(s, t)| {
            s.exponent == t.exponent && s.coefficient.strict_eq(&t.coefficient)
          })
      }
      _ => false,
    }
  }
}
