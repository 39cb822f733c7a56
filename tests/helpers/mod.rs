// Shared fixtures for integration and contract tests
//
// Every test builds its own in-memory store, so tests never share state.
//
// Usage:
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;

#![allow(dead_code)]

pub mod assertions;

pub use assertions::*;
pub use test_data::*;
