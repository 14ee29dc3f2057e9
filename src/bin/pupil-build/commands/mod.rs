//! Command implementations

pub mod completions;
pub mod deps;
pub mod flags;
pub mod plan;
