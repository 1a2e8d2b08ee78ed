//! Core types for vaultmock
//!
//! This crate provides the error taxonomy, request ids and the caller-scoped
//! storage key shared by the backend and the dev host.

pub mod error;
pub mod request_id;
pub mod tenant;

pub use error::{BackendError, ErrorCode};
pub use request_id::RequestId;
pub use tenant::{CallerToken, StorageKey};
