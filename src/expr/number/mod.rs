
mod visitor;

use visitor::{NumberPair, int_to_float, rational_to_float};
use crate::util::stricteq::StrictEq;

use num::{BigInt, BigRational, Zero, One, FromPrimitive};
use num::traits::ToPrimitive;
use thiserror::Error;
use once_cell::sync::Lazy;
use regex::Regex;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::ops;
use std::cmp::Ordering;

/// General-purpose real number type, used for the literal constants
/// of an expression tree.
///
/// A real number can be represented as an exact (arbitrary-precision)
/// integer, a rational number, or an IEEE 754 floating point value.
/// Use [`Number::repr`] to get the number's current representation.
#[derive(Debug, Clone)]
pub struct Number {
  inner: NumberImpl,
}

#[derive(Debug, Clone)]
enum NumberImpl {
  Integer(BigInt),
  Ratio(BigRational),
  Float(f64),
}

#[derive(Error, Debug, PartialEq)]
#[error("Failed to parse number")]
#[non_exhaustive]
pub struct ParseNumberError {}

/// The different ways a number can be represented. These are ordered
/// in terms of priority, so if `a <= b`, arithmetic will try to use
/// representation `a` before resorting to representation `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NumberRepr {
  /// An integer, exact.
  Integer,
  /// A rational number, exact.
  Ratio,
  /// An inexact IEEE 754 floating-point value.
  Float,
}

impl Number {
  /// Gets the current representation of the number.
  pub fn repr(&self) -> NumberRepr {
    match &self.inner {
      NumberImpl::Integer(_) => NumberRepr::Integer,
      NumberImpl::Ratio(_) => NumberRepr::Ratio,
      NumberImpl::Float(_) => NumberRepr::Float,
    }
  }

  /// Produces a rational number. If the denominator divides evenly
  /// into the numerator, then the resulting value will have
  /// reprentation `NumberRepr::Integer`.
  ///
  /// Panics if `denom == 0`.
  pub fn ratio(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Number {
    Number::from(BigRational::new(numer.into(), denom.into()))
  }

  /// Simplify representation. If the number is stored as a rational
  /// but is in fact an integer, convert to an integer representation.
  /// Floats are never converted back to an exact representation.
  fn simplify(self) -> Number {
    if let NumberImpl::Ratio(r) = &self.inner {
      if r.denom().is_one() {
        return Number::from(r.numer().clone());
      }
    }
    self
  }

  pub fn to_f64(&self) -> f64 {
    match &self.inner {
      NumberImpl::Integer(i) => int_to_float(i),
      NumberImpl::Ratio(r) => rational_to_float(r),
      NumberImpl::Float(f) => *f,
    }
  }

  /// Division which refuses to divide an exact number by an exact
  /// zero. Division by a floating zero follows IEEE 754 and always
  /// succeeds.
  pub fn checked_div(&self, other: &Number) -> Option<Number> {
    let exact_zero = other.repr().is_exact() && other.is_zero();
    if exact_zero && self.repr().is_exact() {
      return None;
    }
    Some(self.clone() / other.clone())
  }

  /// Raises a `Number` to an integer power.
  ///
  /// The indeterminate form `0^0` is treated as 1. Returns `None` if
  /// an exact zero is raised to a negative power.
  pub fn powi(&self, exp: BigInt) -> Option<Number> {
    match exp.cmp(&BigInt::zero()) {
      Ordering::Equal => {
        Some(Number::one())
      }
      Ordering::Less => {
        Number::one().checked_div(self)?.powi(- exp)
      }
      Ordering::Greater => {
        let result = match &self.inner {
          NumberImpl::Integer(n) => Number::from(powi_by_repeated_square(n.clone(), exp)),
          NumberImpl::Ratio(r) => Number::from(powi_by_repeated_square(r.clone(), exp)),
          // Already inexact, so just use the hardware implementation.
          NumberImpl::Float(f) => Number::from(f.powf(exp.to_f64().unwrap_or(f64::NAN))),
        };
        Some(result)
      }
    }
  }

  /// Raises a `Number` to an arbitrary real power. Integer exponents
  /// preserve exactness (see [`Number::powi`]); anything else falls
  /// back to floating-point arithmetic.
  pub fn pow_real(&self, exp: &Number) -> Option<Number> {
    match &exp.inner {
      NumberImpl::Integer(n) => self.powi(n.clone()),
      _ => Some(Number::from(self.to_f64().powf(exp.to_f64()))),
    }
  }
}

// Precondition: exp > 0.
fn powi_by_repeated_square<T>(mut input: T, mut exp: BigInt) -> T
where T: One + ops::MulAssign + Clone {
  assert!(exp > BigInt::zero());
  let mut result = T::one();
  while exp > BigInt::one() {
    if exp.clone() % BigInt::from(2) == BigInt::zero() {
      input *= input.clone();
      exp /= BigInt::from(2);
    } else {
      result *= input.clone();
      exp -= BigInt::one();
    }
  }
  result *= input;
  result
}

impl NumberRepr {
  /// Returns true if the numerical representation represents exact
  /// known quantities, as opposed to approximations.
  pub fn is_exact(&self) -> bool {
    match self {
      NumberRepr::Integer => true,
      NumberRepr::Ratio => true,
      NumberRepr::Float => false,
    }
  }
}

impl From<i64> for Number {
  fn from(i: i64) -> Number {
    Number { inner: NumberImpl::Integer(i.into()) }
  }
}

impl From<BigInt> for Number {
  fn from(i: BigInt) -> Number {
    Number { inner: NumberImpl::Integer(i) }
  }
}

impl From<BigRational> for Number {
  fn from(r: BigRational) -> Number {
    Number { inner: NumberImpl::Ratio(r) }.simplify()
  }
}

impl From<f64> for Number {
  fn from(f: f64) -> Number {
    Number { inner: NumberImpl::Float(f) }
  }
}

impl Display for Number {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match &self.inner {
      NumberImpl::Integer(i) => {
        i.fmt(f)
      }
      NumberImpl::Ratio(r) => {
        write!(f, "{}:{}", r.numer(), r.denom())
      }
      NumberImpl::Float(d) => {
        // If the float is actually a (small) integer, force one decimal
        // point. Otherwise, use default printer.
        if d.fract().is_zero() && d.abs() < u64::MAX as f64 {
          write!(f, "{:.1}", d)
        } else {
          write!(f, "{}", d)
        }
      }
    }
  }
}

/// `PartialEq` impl for `Number` compares the numerical value and
/// ignores the representation. To include the representation, use
/// [`StrictEq::strict_eq`].
impl PartialEq for Number {
  fn eq(&self, other: &Number) -> bool {
    match NumberPair::promote(self.clone(), other.clone()) {
      NumberPair::Integers(left, right) => left == right,
      NumberPair::Ratios(left, right) => left == right,
      NumberPair::Floats(left, right) => left == right,
    }
  }
}

impl StrictEq for Number {
  fn strict_eq(&self, other: &Number) -> bool {
    self.repr() == other.repr() && self == other
  }
}

impl ops::Add for Number {
  type Output = Number;

  fn add(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(left, right) => Number::from(left + right),
      NumberPair::Ratios(left, right) => Number::from(left + right),
      NumberPair::Floats(left, right) => Number::from(left + right),
    }
  }
}

impl ops::Sub for Number {
  type Output = Number;

  fn sub(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(left, right) => Number::from(left - right),
      NumberPair::Ratios(left, right) => Number::from(left - right),
      NumberPair::Floats(left, right) => Number::from(left - right),
    }
  }
}

impl ops::Mul for Number {
  type Output = Number;

  fn mul(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(left, right) => Number::from(left * right),
      NumberPair::Ratios(left, right) => Number::from(left * right),
      NumberPair::Floats(left, right) => Number::from(left * right),
    }
  }
}

/// This division operation will not truncate, even if given two
/// values of representation `NumberRepr::Integer`. Given two exact
/// inputs, the output will be exact as well.
///
/// Panics on exact division by zero. Use [`Number::checked_div`] when
/// the divisor is not known to be nonzero.
impl ops::Div for Number {
  type Output = Number;

  fn div(self, other: Number) -> Number {
    match NumberPair::promote(self, other) {
      NumberPair::Integers(left, right) =>
        Number::from(BigRational::from(left) / BigRational::from(right)),
      NumberPair::Ratios(left, right) => Number::from(left / right),
      NumberPair::Floats(left, right) => Number::from(left / right),
    }
  }
}

impl ops::Neg for Number {
  type Output = Number;

  fn neg(self) -> Number {
    match self.inner {
      NumberImpl::Integer(i) => Number::from(-i),
      NumberImpl::Ratio(r) => Number::from(-r),
      NumberImpl::Float(f) => Number::from(-f),
    }
  }
}

impl Zero for Number {
  fn zero() -> Number {
    Number::from(0i64)
  }
  fn is_zero(&self) -> bool {
    match &self.inner {
      NumberImpl::Integer(i) => i.is_zero(),
      NumberImpl::Ratio(r) => r.is_zero(),
      NumberImpl::Float(f) => f.is_zero(),
    }
  }
}

impl One for Number {
  fn one() -> Number {
    Number::from(1i64)
  }
  fn is_one(&self) -> bool {
    match &self.inner {
      NumberImpl::Integer(i) => i.is_one(),
      NumberImpl::Ratio(r) => r.is_one(),
      NumberImpl::Float(f) => f.is_one(),
    }
  }
}

impl FromStr for Number {
  type Err = ParseNumberError;

  fn from_str(s: &str) -> Result<Number, ParseNumberError> {
    parse_integer(s).or_else(|| {
      parse_ratio(s)
    }).or_else(|| {
      parse_float(s)
    }).ok_or(ParseNumberError {})
  }
}

fn parse_integer(s: &str) -> Option<Number> {
  BigInt::from_str(s).map(Number::from).ok()
}

fn parse_ratio(s: &str) -> Option<Number> {
  static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-]?\d+):([+-]?\d+)$").unwrap());
  let caps = RE.captures(s)?;
  let numerator = BigInt::from_str(caps.get(1)?.as_str()).ok()?;
  let denominator = BigInt::from_str(caps.get(2)?.as_str()).ok()?;
  if denominator.is_zero() {
    return None;
  }
  Some(Number::from(BigRational::new(numerator, denominator)))
}

fn parse_float(s: &str) -> Option<Number> {
  f64::from_str(s).ok().and_then(|f| {
    // Reject "inf" and "nan" spellings; those are not literals.
    BigInt::from_f64(f.trunc()).map(|_| Number::from(f))
  })
}
