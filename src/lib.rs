//! Workspace server for AI-generated single-page prototypes.
//!
//! A configured root directory holds one sub-directory per project. One
//! project at a time is *active*; generation runs an external code generation
//! tool inside it and records each successful prompt in the project ledger.

pub mod api;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod platform;
pub mod store;
