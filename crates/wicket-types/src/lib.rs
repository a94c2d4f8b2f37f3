//! Wicket Types - Shared domain types
//!
//! This crate contains domain types used across wicket services:
//! - Subject and session identifiers
//! - Persisted credential records
//! - In-memory session records

pub mod credential;
pub mod session;

pub use credential::*;
pub use session::*;
