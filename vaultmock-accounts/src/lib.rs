//! Accounts secrets engine for vaultmock
//!
//! Stores a placeholder key pair per caller token and logical id, and
//! answers reads with values derived from the stored keys:
//! - `account`: read / create / update by `accountId`
//! - `sign`: derive a signature-like value for a message
//! - `accounts/`: list the caller's logical ids
//! - any other path: read / write / delete keyed by the path itself

pub mod backend;
mod handlers;
pub mod http;
pub mod keygen;
pub mod record;
pub mod schema;
pub mod storage;

pub use backend::{Backend, Operation, Request, Response};
pub use http::{mount_router, MountState};
pub use keygen::{KeyGenerator, KeyPair, PlaceholderKeyGenerator};
pub use record::Account;
pub use storage::{EphemeralStorage, SqliteStorage, StorageEntry, StorageError, StorageGateway};
