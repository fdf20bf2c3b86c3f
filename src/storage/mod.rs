mod repository;

pub use repository::*;

/// SQL creating the entries table if it does not exist yet
pub const MIGRATION_001_ENTRIES: &str = include_str!("migrations/001_entries.sql");
