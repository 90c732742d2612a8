use rusqlite::types::Type;
use rusqlite::{params, Connection, Error, OptionalExtension, Result, Row};
use wardrobe_application::{NewClothingItem, NewOutfit};
use wardrobe_domain::{ClothingCategory, ClothingItem, ItemId, Outfit, OutfitId};

const ITEM_COLUMNS: &str =
    "id, name, category, color, image_uri, season, last_worn, created_at";
const OUTFIT_COLUMNS: &str = "id, name, item_ids_json, created_at, is_favorite";

pub fn insert_item(conn: &Connection, item: &NewClothingItem) -> Result<i64> {
    conn.execute(
        "INSERT INTO clothing_items (name, category, color, image_uri, season, last_worn, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)",
        params![
            item.name,
            item.category.name(),
            item.color,
            item.image_uri,
            item.season,
            item.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_item(conn: &Connection, item: &ClothingItem) -> Result<usize> {
    conn.execute(
        "UPDATE clothing_items
         SET name = ?2, category = ?3, color = ?4, image_uri = ?5, season = ?6,
             last_worn = ?7, created_at = ?8
         WHERE id = ?1",
        params![
            item.id.get(),
            item.name,
            item.category.name(),
            item.color,
            item.image_uri,
            item.season,
            item.last_worn,
            item.created_at,
        ],
    )
}

pub fn delete_item(conn: &Connection, item_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM clothing_items WHERE id = ?1", params![item_id])
}

pub fn find_item(conn: &Connection, item_id: i64) -> Result<Option<ClothingItem>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM clothing_items WHERE id = ?1"),
        params![item_id],
        item_from_row,
    )
    .optional()
}

pub fn list_items(conn: &Connection) -> Result<Vec<ClothingItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM clothing_items ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], item_from_row)?;
    rows.collect()
}

pub fn list_items_by_category(
    conn: &Connection,
    category: ClothingCategory,
) -> Result<Vec<ClothingItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM clothing_items
         WHERE category = ?1
         ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![category.name()], item_from_row)?;
    rows.collect()
}

pub fn count_items(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM clothing_items", [], |row| row.get(0))
}

pub fn insert_outfit(conn: &Connection, outfit: &NewOutfit) -> Result<i64> {
    conn.execute(
        "INSERT INTO outfits (name, item_ids_json, created_at, is_favorite)
         VALUES (?1, ?2, ?3, 0)",
        params![
            outfit.name,
            item_ids_to_json(&outfit.item_ids)?,
            outfit.created_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_outfit(conn: &Connection, outfit: &Outfit) -> Result<usize> {
    conn.execute(
        "UPDATE outfits
         SET name = ?2, item_ids_json = ?3, created_at = ?4, is_favorite = ?5
         WHERE id = ?1",
        params![
            outfit.id.get(),
            outfit.name,
            item_ids_to_json(&outfit.item_ids)?,
            outfit.created_at,
            outfit.is_favorite,
        ],
    )
}

pub fn delete_outfit(conn: &Connection, outfit_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM outfits WHERE id = ?1", params![outfit_id])
}

pub fn find_outfit(conn: &Connection, outfit_id: i64) -> Result<Option<Outfit>> {
    conn.query_row(
        &format!("SELECT {OUTFIT_COLUMNS} FROM outfits WHERE id = ?1"),
        params![outfit_id],
        outfit_from_row,
    )
    .optional()
}

pub fn list_outfits(conn: &Connection, favorites_only: bool) -> Result<Vec<Outfit>> {
    let filter = if favorites_only {
        "WHERE is_favorite = 1"
    } else {
        ""
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {OUTFIT_COLUMNS} FROM outfits {filter} ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], outfit_from_row)?;
    rows.collect()
}

fn item_from_row(row: &Row<'_>) -> Result<ClothingItem> {
    let id_value: i64 = row.get(0)?;
    let category: String = row.get(2)?;
    Ok(ClothingItem {
        id: ItemId::new(id_value).map_err(|error| conversion_error(0, Type::Integer, error))?,
        name: row.get(1)?,
        category: category
            .parse()
            .map_err(|error| conversion_error(2, Type::Text, error))?,
        color: row.get(3)?,
        image_uri: row.get(4)?,
        season: row.get(5)?,
        last_worn: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn outfit_from_row(row: &Row<'_>) -> Result<Outfit> {
    let id_value: i64 = row.get(0)?;
    let item_ids_json: String = row.get(2)?;
    let raw_ids: Vec<i64> = serde_json::from_str(&item_ids_json)
        .map_err(|error| conversion_error(2, Type::Text, error))?;
    let item_ids = raw_ids
        .into_iter()
        .map(ItemId::new)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|error| conversion_error(2, Type::Text, error))?;

    Ok(Outfit {
        id: OutfitId::new(id_value).map_err(|error| conversion_error(0, Type::Integer, error))?,
        name: row.get(1)?,
        item_ids,
        created_at: row.get(3)?,
        is_favorite: row.get(4)?,
    })
}

fn item_ids_to_json(item_ids: &[ItemId]) -> Result<String> {
    let raw: Vec<i64> = item_ids.iter().map(|id| id.get()).collect();
    serde_json::to_string(&raw).map_err(|error| Error::ToSqlConversionFailure(Box::new(error)))
}

fn conversion_error<E>(column: usize, kind: Type, error: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::FromSqlConversionFailure(column, kind, Box::new(error))
}
