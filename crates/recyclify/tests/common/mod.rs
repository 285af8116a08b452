//! Shared test utilities for recyclify integration tests.
//!
//! This module provides:
//! - Builders for perception results and configurations
//! - In-memory fakes for the labeling and persistence collaborators

pub mod builders;
pub mod fakes;

pub use builders::*;
pub use fakes::*;
