//! Logical grouping of yandagen subcommand implementations.

pub mod batch;
pub mod make;
pub mod targets;
