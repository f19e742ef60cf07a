/// Database configuration and connection management
pub mod database;

/// Application settings loaded from `rental_ledger.toml` and the environment
pub mod settings;
