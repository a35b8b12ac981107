//! Process runtime utilities for the procedure count API.
#![allow(missing_docs)]

pub mod health;
pub mod shutdown;
