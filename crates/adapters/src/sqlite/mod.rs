mod queries;

use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;
use tracing::info;
use wardrobe_application::{ApplicationError, NewClothingItem, NewOutfit, WardrobeStore};
use wardrobe_domain::{ClothingCategory, ClothingItem, ItemId, Outfit, OutfitId};

use crate::migrations::{MIGRATIONS, SCHEMA_VERSION};

/// SQLite-backed record store. A connection is opened per call, so the store
/// itself only carries the database path.
#[derive(Debug, Clone)]
pub struct SqliteWardrobeStore {
    path: PathBuf,
}

impl SqliteWardrobeStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        Connection::open(&self.path).map_err(persistence)
    }
}

fn persistence(error: rusqlite::Error) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

impl WardrobeStore for SqliteWardrobeStore {
    fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidArgument(
                "catalog path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| {
                    ApplicationError::from_io("failed to create catalog directory", error)
                })?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(persistence)?;

        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(persistence)?;
        if version >= SCHEMA_VERSION {
            return Ok(());
        }

        for migration in MIGRATIONS {
            conn.execute_batch(migration).map_err(persistence)?;
        }
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(persistence)?;
        info!(path = %self.path.display(), version = SCHEMA_VERSION, "initialized wardrobe catalog");
        Ok(())
    }

    fn insert_item(&self, item: &NewClothingItem) -> Result<ItemId, ApplicationError> {
        let conn = self.open_connection()?;
        let id_value = queries::insert_item(&conn, item).map_err(persistence)?;
        Ok(ItemId::new(id_value)?)
    }

    fn update_item(&self, item: &ClothingItem) -> Result<(), ApplicationError> {
        let conn = self.open_connection()?;
        let changed = queries::update_item(&conn, item).map_err(persistence)?;
        if changed == 0 {
            return Err(ApplicationError::NotFound(format!(
                "clothing item not found for id={}",
                item.id.get()
            )));
        }
        Ok(())
    }

    fn delete_item(&self, item_id: ItemId) -> Result<bool, ApplicationError> {
        let conn = self.open_connection()?;
        let changed = queries::delete_item(&conn, item_id.get()).map_err(persistence)?;
        Ok(changed > 0)
    }

    fn find_item(&self, item_id: ItemId) -> Result<Option<ClothingItem>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::find_item(&conn, item_id.get()).map_err(persistence)
    }

    fn list_items(&self) -> Result<Vec<ClothingItem>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_items(&conn).map_err(persistence)
    }

    fn list_items_by_category(
        &self,
        category: ClothingCategory,
    ) -> Result<Vec<ClothingItem>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_items_by_category(&conn, category).map_err(persistence)
    }

    fn count_items(&self) -> Result<u64, ApplicationError> {
        let conn = self.open_connection()?;
        let count = queries::count_items(&conn).map_err(persistence)?;
        Ok(count.max(0) as u64)
    }

    fn insert_outfit(&self, outfit: &NewOutfit) -> Result<OutfitId, ApplicationError> {
        let conn = self.open_connection()?;
        let id_value = queries::insert_outfit(&conn, outfit).map_err(persistence)?;
        Ok(OutfitId::new(id_value)?)
    }

    fn update_outfit(&self, outfit: &Outfit) -> Result<(), ApplicationError> {
        let conn = self.open_connection()?;
        let changed = queries::update_outfit(&conn, outfit).map_err(persistence)?;
        if changed == 0 {
            return Err(ApplicationError::NotFound(format!(
                "outfit not found for id={}",
                outfit.id.get()
            )));
        }
        Ok(())
    }

    fn delete_outfit(&self, outfit_id: OutfitId) -> Result<bool, ApplicationError> {
        let conn = self.open_connection()?;
        let changed = queries::delete_outfit(&conn, outfit_id.get()).map_err(persistence)?;
        Ok(changed > 0)
    }

    fn find_outfit(&self, outfit_id: OutfitId) -> Result<Option<Outfit>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::find_outfit(&conn, outfit_id.get()).map_err(persistence)
    }

    fn list_outfits(&self) -> Result<Vec<Outfit>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_outfits(&conn, false).map_err(persistence)
    }

    fn list_favorite_outfits(&self) -> Result<Vec<Outfit>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::list_outfits(&conn, true).map_err(persistence)
    }
}
