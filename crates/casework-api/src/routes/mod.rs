//! Route modules, one per resource.

pub mod assessments;
pub mod health;
pub mod tasks;
