//! Shared types for the synonym tracking system
//!
//! Contains the domain vocabulary every component speaks (synonyms, content
//! records, worker identities), the shared error type, logging setup and the
//! restart-with-backoff supervisor used by all long-running workers.

pub mod errors;
pub mod logging;
pub mod supervision;
pub mod types;

pub use errors::*;
pub use supervision::{supervise, RestartPolicy, SupervisorExit};
pub use types::*;
