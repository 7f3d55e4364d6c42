//! SQL schema for the fuelwatch price database.
//!
//! Executed once at connection startup. Table and column names match the
//! remote authoritative copy, which other tools query directly.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS Brands (
    Brand_ID  INTEGER PRIMARY KEY,
    Name      TEXT
);

CREATE TABLE IF NOT EXISTS Fuel_Types (
    Fuel_ID   INTEGER PRIMARY KEY,
    Name      TEXT
);

CREATE TABLE IF NOT EXISTS Sites (
    Site_ID   INTEGER PRIMARY KEY,
    Brand_ID  INTEGER REFERENCES Brands(Brand_ID),
    Name      TEXT,
    Address   TEXT,
    Postcode  TEXT,
    Latitude  REAL,
    Longitude REAL
);

-- Rows are never deleted; a repeated key overwrites Price only.
CREATE TABLE IF NOT EXISTS Price_Records (
    Site_ID         INTEGER NOT NULL REFERENCES Sites(Site_ID),
    Fuel_ID         INTEGER NOT NULL REFERENCES Fuel_Types(Fuel_ID),
    TransactionDate TEXT    NOT NULL,   -- ISO 8601 at +10:00
    Price           REAL    NOT NULL,   -- dollars per litre
    UNIQUE (Site_ID, Fuel_ID, TransactionDate)
);

CREATE INDEX IF NOT EXISTS price_records_date_idx ON Price_Records(TransactionDate);
CREATE INDEX IF NOT EXISTS sites_brand_idx        ON Sites(Brand_ID);

PRAGMA user_version = 1;
";
