//! Helper functions for API operations

pub mod common;

pub use common::*;
