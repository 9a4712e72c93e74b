//! Dispatch engine tests.

pub mod deadlock;
