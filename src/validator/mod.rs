// src/validator/mod.rs

// Declare the sync driver sub-module
pub mod sync_validator;

// Re-export the public SyncValidator struct
pub use sync_validator::SyncValidator;
