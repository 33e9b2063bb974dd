//! Configuration for the phonebook backend.
//!
//! All configuration is loaded from environment variables (optionally seeded
//! from a `.env` file by `main`). The database connection string is never
//! logged.

/// Default listening port
pub const DEFAULT_PORT: u16 = 3001;

/// Database name used when neither the URI nor `MONGODB_DATABASE` names one
pub const DEFAULT_DATABASE: &str = "phonebook";

/// Collection holding person documents
pub const DEFAULT_COLLECTION: &str = "people";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,

    /// Server port
    pub port: u16,

    // === Storage ===
    /// MongoDB connection string. When unset, records live in memory only.
    pub mongodb_uri: Option<String>,

    /// Database name override
    pub mongodb_database: Option<String>,

    /// Collection name (default: `people`)
    pub mongodb_collection: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),

            mongodb_uri: lookup("MONGODB_URI").filter(|uri| !uri.trim().is_empty()),
            mongodb_database: lookup("MONGODB_DATABASE").filter(|db| !db.is_empty()),
            mongodb_collection: lookup("MONGODB_COLLECTION")
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        }
    }

    /// Name of the storage backend this configuration selects
    pub fn storage_label(&self) -> &'static str {
        if self.mongodb_uri.is_some() {
            "mongodb"
        } else {
            "memory"
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
