
//! Utility functions for walking an expression tree.

use super::Expr;

/// The depth of the tree, where a leaf has depth 1.
///
/// Uses an explicit work stack, so this is safe to call on trees that
/// are too deep to recurse over.
pub fn depth(expr: &Expr) -> usize {
  let mut max_depth = 0;
  let mut stack = vec![(expr, 1)];
  while let Some((node, node_depth)) = stack.pop() {
    max_depth = max_depth.max(node_depth);
    stack.extend(node.children().into_iter().map(|child| (child, node_depth + 1)));
  }
  max_depth
}
