//! Epoch core: shared domain types and collaborator contracts.
//!
//! This crate defines the documents (sessions, events, decisions), the
//! error taxonomy, and the traits that the turn engine depends on. It
//! contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod generator;
pub mod model;
pub mod repository;
pub mod rng;
pub mod world;
