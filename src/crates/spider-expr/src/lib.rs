//! Expression compiler and evaluator for PiSDF rate, delay and parameter
//! expressions.
//!
//! Compiles infix arithmetic to a postfix program once and caches whether
//! the program is static (foldable to a constant) or dynamic (dependent on
//! parameters resolved at firing time), following
//! `original_source/.../Expression.h`'s static/dynamic split.

pub mod compiler;
pub mod expression;
pub mod function;
pub mod operator;
pub mod token;

pub use compiler::{compile, RpnElement};
pub use expression::{Expression, NoParams, ParamResolver};
pub use function::Function;
pub use operator::Operator;
