// src/lib.rs

#![cfg_attr(not(test), no_std)] // no_std at the crate root; tests run hosted

pub mod common;
pub mod validator;

// Re-export key types for convenience
pub use common::CcnetError;
pub use common::{Command, PollResponse, Status};
pub use validator::SyncValidator;
