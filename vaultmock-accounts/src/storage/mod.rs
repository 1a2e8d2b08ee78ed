//! Storage gateway contract and the backends shipped with vaultmock

mod ephemeral;
mod sqlite;
mod traits;


pub use ephemeral::EphemeralStorage;
pub use sqlite::SqliteStorage;
pub use traits::{StorageEntry, StorageError, StorageGateway};
