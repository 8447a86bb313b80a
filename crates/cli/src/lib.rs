//! AmlWatch CLI - command orchestration
//!
//! This crate provides the `amlwatch` binary and the screening pipeline it
//! drives.

pub mod commands;
pub mod screening;

pub use screening::{AnomalyCheck, Screener, ScreeningReport};
