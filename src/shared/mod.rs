// Shared Kernel - Domain Driven Design
// Following Clean Architecture + Hexagonal Architecture patterns

pub mod application; // Shared application layer patterns
pub mod config; // Typed environment fallback configuration
pub mod errors; // Shared error types
pub mod infrastructure; // Shared infrastructure (database, crypto, logging)
pub mod utils; // Shared utilities

// Re-exports for convenience
pub use infrastructure::crypto::CredentialCipher;
pub use infrastructure::database::Database;
