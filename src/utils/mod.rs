//! Shared helpers.

pub mod process;
pub mod retry;
