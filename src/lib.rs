//! chapter-propagate - propagate a pull request across tutorial chapters
//!
//! A tutorial repository keeps one branch per chapter, each built on top of
//! the previous one. A fix made against one chapter has to be carried into
//! every later chapter. This crate fetches the diff of a pull request,
//! works out which chapters follow its base branch, and applies the diff to
//! each of them in order, opening one pull request per chapter.

pub mod auth;
pub mod chain;
pub mod config;
pub mod diff;
pub mod error;
pub mod platform;
pub mod propagate;
pub mod staging;
pub mod types;
