pub mod crypto;
pub mod database;

pub use crypto::CredentialCipher;
pub use database::{Database, DbConnection, DbPool};
