//! Domain layer: commands, settings, turn outcomes, and aggregation rules.

pub mod aggregation;
pub mod commands;
pub mod outcome;
pub mod settings;
