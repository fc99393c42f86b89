
//! Dependency queries on the [`Expr`] type.

use super::Expr;

/// Returns the free identifiers of `expr`, in left-to-right order,
/// without duplicates.
///
/// Variables are dependencies. A subscript such as `x[0]` is a
/// dependency as a whole; its aggregate and index are not inspected,
/// so `x[0]` does not depend on `x`.
pub fn dependencies(expr: &Expr) -> Vec<&Expr> {
  let mut result = Vec::new();
  collect_dependencies(expr, &mut result);
  result
}

fn collect_dependencies<'a>(expr: &'a Expr, acc: &mut Vec<&'a Expr>) {
  match expr {
    Expr::Var(_) | Expr::Subscript(_, _) => {
      if !acc.contains(&expr) {
        acc.push(expr);
      }
    }
    _ => {
      for child in expr.children() {
        collect_dependencies(child, acc);
      }
    }
  }
}

/// Returns true if `expr` has no free occurrence of `variable`.
pub fn is_constant(expr: &Expr, variable: &Expr) -> bool {
  match expr {
    Expr::Var(_) | Expr::Subscript(_, _) => expr != variable,
    _ => expr.children().into_iter().all(|child| is_constant(child, variable)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::Polynomial;
  use crate::expr::function::MathFunction;

  fn var(s: &str) -> Expr {
    Expr::var(s).unwrap()
  }

  #[test]
  fn test_dependencies() {
    let expr = var("x") * var("y") + var("x");
    assert_eq!(dependencies(&expr), vec![&var("x"), &var("y")]);
    assert!(dependencies(&Expr::from(3)).is_empty());
  }

  #[test]
  fn test_subscript_is_opaque_dependency() {
    let x0 = Expr::subscript(var("x"), Expr::from(0));
    let expr = x0.clone() + var("y");
    assert_eq!(dependencies(&expr), vec![&x0, &var("y")]);
    assert!(is_constant(&expr, &var("x")));
    assert!(!is_constant(&expr, &x0));
  }

  #[test]
  fn test_callee_counts_as_dependency() {
    let expr = Expr::call(var("f"), vec![Expr::from(1)]);
    assert_eq!(dependencies(&expr), vec![&var("f")]);
    assert!(!is_constant(&expr, &var("f")));
    assert!(is_constant(&MathFunction::Sin.call(vec![var("y")]), &var("x")));
  }

  #[test]
  fn test_is_constant() {
    assert!(is_constant(&Expr::from(3), &var("x")));
    assert!(is_constant(&var("y"), &var("x")));
    assert!(!is_constant(&var("x"), &var("x")));
    assert!(!is_constant(&(Expr::from(2) * -var("x")), &var("x")));
    let poly = Expr::from(Polynomial::dense(var("y"), vec![Expr::from(1), var("x")]));
    assert!(!is_constant(&poly, &var("x")));
  }
}
