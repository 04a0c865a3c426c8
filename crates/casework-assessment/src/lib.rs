//! Assessment lifecycle bounded context.
//!
//! An assessment is opened when its application is submitted and then moves
//! between `unallocated`, `in_review`, `ready_to_place`, `closed` and
//! `rejected` as assessors are allocated and decisions are recorded or
//! revisited.

pub mod application;
pub mod domain;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
