
//! Various utility traits and macros.

pub mod stricteq;
