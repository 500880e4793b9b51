//! Session stores for the Epoch turn engine.
//!
//! Implementations of `SessionRepository`: an in-process store, a
//! PostgreSQL store, and a decorator that bounds every call with a timeout.

pub mod memory;
pub mod pg_session_repository;
pub mod schema;
pub mod timeout;
