//! Core types for metatree
//!
//! This module holds the error taxonomy shared by every layer of the crate:
//!
//! - [`MetatreeError`] - typed failures of the resolution engine
//! - [`SyntaxError`] - parser diagnostics before an address is attached
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI rendering with suggestions

pub mod error;

pub use error::{ErrorContext, MetatreeError, SyntaxError, user_friendly_error};
