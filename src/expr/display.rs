
//! Infix printing of expression trees.
//!
//! The printer inserts the parentheses needed to read the tree back
//! unambiguously, and a few more: nested sums and products keep
//! their grouping, since the tree structure is exactly what a
//! consumer of an unsimplified derivative wants to see.

use super::Expr;
use super::atom::Constant;

use itertools::Itertools;

use std::fmt::{self, Display, Formatter};

const SUM: u8 = 1;
const PRODUCT: u8 = 2;
const NEGATION: u8 = 3;
const POWER: u8 = 4;
const ATOM: u8 = 5;

fn precedence(expr: &Expr) -> u8 {
  match expr {
    Expr::Sum(_) => SUM,
    Expr::Product(_) | Expr::Quotient(_, _) => PRODUCT,
    Expr::Negation(_) => NEGATION,
    Expr::Power(_, _) => POWER,
    Expr::Constant(Constant::Number(n)) if n.to_f64().is_sign_negative() => NEGATION,
    Expr::Constant(_) | Expr::Var(_) | Expr::Subscript(_, _) | Expr::Call(_, _) | Expr::Polynomial(_) => ATOM,
  }
}

/// Displays an expression, parenthesized if it binds less tightly
/// than `min_prec`.
struct Operand<'a>(&'a Expr, u8);

impl<'a> Display for Operand<'a> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let Operand(expr, min_prec) = *self;
    if precedence(expr) < min_prec {
      write!(f, "({expr})")
    } else {
      write!(f, "{expr}")
    }
  }
}

impl Display for Expr {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Expr::Constant(c) => write!(f, "{c}"),
      Expr::Var(v) => write!(f, "{v}"),
      Expr::Subscript(aggregate, index) => {
        write!(f, "{}[{}]", Operand(aggregate, ATOM), index)
      }
      Expr::Call(callee, args) => {
        write!(f, "{}({})", Operand(callee, ATOM), args.iter().join(", "))
      }
      Expr::Negation(child) => {
        write!(f, "-{}", Operand(child, POWER))
      }
      Expr::Sum(children) => {
        write!(f, "{}", children.iter().map(|c| Operand(c, PRODUCT)).join(" + "))
      }
      Expr::Product(children) => {
        write!(f, "{}", children.iter().map(|c| Operand(c, NEGATION)).join(" * "))
      }
      Expr::Quotient(numer, denom) => {
        write!(f, "{} / {}", Operand(numer, NEGATION), Operand(denom, NEGATION))
      }
      Expr::Power(base, exponent) => {
        write!(f, "{}^{}", Operand(base, ATOM), Operand(exponent, POWER))
      }
      Expr::Polynomial(poly) => {
        let terms = poly.terms.iter().map(|term| {
          format!("{}*{}^{}", Operand(&term.coefficient, NEGATION), Operand(&poly.base, ATOM), term.exponent)
        }).join(" + ");
        write!(f, "poly({}; {})", poly.base, terms)
      }
    }
  }
}
