//! Utilities for the messaging crate.

pub mod csv;
pub mod validation;

pub use validation::Validator;
