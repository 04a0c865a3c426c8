//! Domain model for assessments.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod status;
