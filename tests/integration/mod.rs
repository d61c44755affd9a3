//! Integration test suite for metatree
//!
//! End-to-end tests of the analyzer against in-memory and on-disk documents,
//! and of the `metatree` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **tree_building**: metadata tree properties (cycles, duplicates, binding, ordering)
//! - **loaders**: filesystem loading and configuration
//! - **cli**: the `tree` and `deps` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod loaders;
mod tree_building;
