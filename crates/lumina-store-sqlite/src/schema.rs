//! SQL schema for the Lumina SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// Dates are stored as `YYYY-MM-DD` and clock times as `HH:MM`, so plain
/// text comparison orders them correctly.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS buildings (
    building_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS amenities (
    amenity_id  TEXT PRIMARY KEY,
    building_id TEXT NOT NULL REFERENCES buildings(building_id),
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    capacity    INTEGER NOT NULL,
    open_time   TEXT NOT NULL,
    close_time  TEXT NOT NULL,
    CHECK (open_time < close_time)
);

-- Free-form per-building rules; values are interpreted by the resolver.
CREATE TABLE IF NOT EXISTS building_settings (
    building_id TEXT NOT NULL REFERENCES buildings(building_id),
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    PRIMARY KEY (building_id, key)
);

CREATE TABLE IF NOT EXISTS residents (
    resident_id  TEXT PRIMARY KEY,
    building_id  TEXT NOT NULL REFERENCES buildings(building_id),
    name         TEXT NOT NULL,
    email        TEXT NOT NULL UNIQUE,
    unit         TEXT,
    role         TEXT NOT NULL,        -- 'resident' | 'admin'
    token_digest TEXT NOT NULL UNIQUE, -- hex SHA-256 of the bearer token
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reservations (
    reservation_id TEXT PRIMARY KEY,
    amenity_id     TEXT NOT NULL REFERENCES amenities(amenity_id),
    building_id    TEXT NOT NULL REFERENCES buildings(building_id),
    resident_id    TEXT NOT NULL REFERENCES residents(resident_id),
    booking_date   TEXT NOT NULL,
    start_time     TEXT NOT NULL,
    end_time       TEXT NOT NULL,
    status         TEXT NOT NULL,      -- 'confirmed' | 'cancelled' | 'completed'
    created_at     TEXT NOT NULL,
    CHECK (start_time < end_time)
);

CREATE INDEX IF NOT EXISTS reservations_slot_idx
    ON reservations(amenity_id, booking_date, status);
CREATE INDEX IF NOT EXISTS reservations_resident_idx
    ON reservations(resident_id, status, booking_date);

-- No two CONFIRMED reservations on the same amenity and date may overlap.
CREATE TRIGGER IF NOT EXISTS reservations_no_overlap
BEFORE INSERT ON reservations
WHEN NEW.status = 'confirmed'
BEGIN
    SELECT RAISE(ABORT, 'slot unavailable')
    WHERE EXISTS (
        SELECT 1 FROM reservations
        WHERE amenity_id   = NEW.amenity_id
          AND booking_date = NEW.booking_date
          AND status       = 'confirmed'
          AND start_time   < NEW.end_time
          AND end_time     > NEW.start_time
    );
END;

PRAGMA user_version = 1;
";
