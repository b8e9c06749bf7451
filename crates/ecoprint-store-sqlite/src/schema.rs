//! Catalog schema for the EcoPrint SQLite store.
//!
//! Executed once at connection startup. Collection tables themselves are
//! created on demand by `create_collection`; the catalog records which exist,
//! their validators and their indexes.

/// Catalog DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS collections (
    database    TEXT NOT NULL,
    name        TEXT NOT NULL,
    validator   TEXT,            -- JSON {\"$jsonSchema\": ...} or NULL
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    PRIMARY KEY (database, name)
);

CREATE TABLE IF NOT EXISTS indexes (
    database    TEXT NOT NULL,
    collection  TEXT NOT NULL,
    name        TEXT NOT NULL,   -- e.g. 'timestamp_-1'
    keys        TEXT NOT NULL,   -- JSON array of {field, order}
    created_at  TEXT NOT NULL,
    PRIMARY KEY (database, collection, name),
    FOREIGN KEY (database, collection) REFERENCES collections(database, name)
);

PRAGMA user_version = 1;
";
