//! Epoch session membership, decision ledger, and turn advancement.
//!
//! Responsible for the session lobby, recording participant decisions,
//! closing a turn once the roster has decided, and opening the next one.

pub mod application;
pub mod domain;
