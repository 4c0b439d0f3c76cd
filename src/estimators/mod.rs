use crate::Float;

#[cfg(test)]
mod tests;

pub mod error;
pub mod hyperparams;
pub mod linear_regression;
pub mod param_guard;
pub mod traits;
