//! Screening answers and profile completeness for a job board.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
