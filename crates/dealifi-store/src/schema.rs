//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Merchant documents, keyed by merchant address.
    pub const MERCHANTS: &str = "merchants";

    /// Index: owning merchant address, keyed by candy machine address.
    pub const CANDY_MACHINE_OWNERS: &str = "candy_machine_owners";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::MERCHANTS, cf::CANDY_MACHINE_OWNERS]
}
