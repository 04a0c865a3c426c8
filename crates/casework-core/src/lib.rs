//! Shared domain abstractions for casework.
//!
//! Traits and types every casework bounded context builds on: aggregates,
//! commands, events, the event repository seam, the clock and the domain
//! error taxonomy. No infrastructure code lives here.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
