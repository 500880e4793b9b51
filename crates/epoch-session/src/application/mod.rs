//! Application layer: command and query handlers over a `SessionRepository`.

pub mod ledger;
pub mod membership;
pub mod query_handlers;
pub mod turn_coordinator;
