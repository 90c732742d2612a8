/// Recorded in `PRAGMA user_version` once the statements below have run.
pub const SCHEMA_VERSION: i64 = 1;

pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS clothing_items (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        category    TEXT NOT NULL,
        color       TEXT,
        image_uri   TEXT NOT NULL,
        season      TEXT,
        last_worn   INTEGER,
        created_at  INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_clothing_items_category
        ON clothing_items(category, created_at DESC);",
    "CREATE TABLE IF NOT EXISTS outfits (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        item_ids_json TEXT NOT NULL,
        created_at    INTEGER NOT NULL,
        is_favorite   INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_outfits_favorite
        ON outfits(is_favorite, created_at DESC);",
];
