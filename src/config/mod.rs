/// Application configuration loading from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Rate plan seeding from config.toml
pub mod rate_plans;
