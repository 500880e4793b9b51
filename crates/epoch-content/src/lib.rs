//! Epoch event content.
//!
//! Implementations of `EventGenerator`: a fixed placeholder event, and a
//! YAML catalog of templates selected by world state and a seedable RNG.

pub mod catalog;
pub mod generators;
