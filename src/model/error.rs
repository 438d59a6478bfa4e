use thiserror::Error;

// Local validation errors, these never reach the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("required field '{0}' is empty")]
    EmptyField(&'static str),
}
