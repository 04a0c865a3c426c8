//! Shared test mocks and utilities for the casework assessment service.
//!
//! Every test constructs its own instances; nothing here is global.

mod clock;
mod repository;

pub use clock::FixedClock;
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
