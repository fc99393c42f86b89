
//! Operator overloads for building expression trees.
//!
//! These operators are purely structural. `a + b` always builds a
//! [`Expr::Sum`] node, even when both sides are literal numbers or
//! when one side is zero. Cleaning up redundant terms is the job of a
//! downstream simplifier, not of the tree builders.

use super::Expr;

use num::pow::Pow;

use std::ops::{Add, Sub, Mul, Div, Neg};

impl Add for Expr {
  type Output = Expr;

  fn add(self, rhs: Expr) -> Expr {
    Expr::Sum(vec![self, rhs])
  }
}

/// `a - b` is represented as `a + (-b)`.
impl Sub for Expr {
  type Output = Expr;

  fn sub(self, rhs: Expr) -> Expr {
    Expr::Sum(vec![self, -rhs])
  }
}

impl Mul for Expr {
  type Output = Expr;

  fn mul(self, rhs: Expr) -> Expr {
    Expr::Product(vec![self, rhs])
  }
}

impl Div for Expr {
  type Output = Expr;

  fn div(self, rhs: Expr) -> Expr {
    Expr::quotient(self, rhs)
  }
}

impl Neg for Expr {
  type Output = Expr;

  fn neg(self) -> Expr {
    Expr::Negation(Box::new(self))
  }
}

impl Pow<Expr> for Expr {
  type Output = Expr;

  fn pow(self, rhs: Expr) -> Expr {
    Expr::power(self, rhs)
  }
}

macro_rules! impl_mixed_arith {
  (impl $trait: ident for Expr { fn $method: ident };) => {
    impl $trait<i64> for Expr {
      type Output = Expr;

      fn $method(self, rhs: i64) -> Self::Output {
        $trait::$method(self, Expr::from(rhs))
      }
    }

    impl $trait<Expr> for i64 {
      type Output = Expr;

      fn $method(self, rhs: Expr) -> Self::Output {
        $trait::$method(Expr::from(self), rhs)
      }
    }
  }
}

impl_mixed_arith! { impl Add for Expr { fn add }; }
impl_mixed_arith! { impl Sub for Expr { fn sub }; }
impl_mixed_arith! { impl Mul for Expr { fn mul }; }
impl_mixed_arith! { impl Div for Expr { fn div }; }
impl_mixed_arith! { impl Pow for Expr { fn pow }; }
