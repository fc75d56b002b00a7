use thiserror::Error;

/// Errors from constructing foundation types out of untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("recipe id must not be empty")]
    EmptyId,
}
