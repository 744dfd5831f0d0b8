/// Database connection and table creation
pub mod database;

/// Application settings and seed catalog loaded from config.toml
pub mod settings;
