//! Radix-2 FFTs, evaluation domains and polynomial utilities over the
//! scalar field.

pub mod domain;
pub mod polynomial;

pub use domain::{EvaluationDomain, LagrangeEvaluations};
pub use polynomial::Polynomial;
