//! Core types and utilities for the persona-chat service.
//!
//! This crate provides the identifiers and error-handling foundation shared
//! by the completion client, the listing fetcher, the conversation pipeline
//! and the HTTP server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{DEFAULT_USER_ID, ParseIdError, RequestId, UserId};
