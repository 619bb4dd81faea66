//! CLI commands
//!
//! Command implementations for the `chapter-propagate` binary.

mod progress;
mod propagate;
pub mod style;

pub use propagate::run_propagate;
