//! Shared error types for the ingestion system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid synonym: {input:?}")]
    InvalidSynonym { input: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Worker cancelled")]
    Cancelled,
}

pub type SharedResult<T> = Result<T, SharedError>;
