/// Round and buzz-attempt storage backed by SQLite.
pub mod buzz_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
