
//! Symbolic differentiation of expression trees.

mod derivative;
mod options;
mod table;

pub use derivative::{DerivativeEngine, DifferentiationFailure, DifferentiationError, differentiate, differentiate_with};
pub use options::DerivativeOptions;
pub use table::{DerivativeTable, MathDerivativeTable};
