use std::path::{Path, PathBuf};
use std::time::Duration;

use wardrobe_domain::{
    ClothingCategory, ClothingItem, ImageSource, ItemId, Outfit, OutfitId,
};

use crate::ApplicationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClothingItem {
    pub name: String,
    pub category: ClothingCategory,
    pub color: Option<String>,
    pub image_uri: String,
    pub season: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOutfit {
    pub name: String,
    pub item_ids: Vec<ItemId>,
    pub created_at: i64,
}

/// Record storage for items and outfits. The two collections are independent:
/// nothing here checks outfit item ids against existing items.
pub trait WardrobeStore: Send {
    fn initialize(&self) -> Result<(), ApplicationError>;

    fn insert_item(&self, item: &NewClothingItem) -> Result<ItemId, ApplicationError>;

    /// Replaces the full record. Fails with `NotFound` when the id is unknown.
    fn update_item(&self, item: &ClothingItem) -> Result<(), ApplicationError>;

    /// Returns whether a record was removed.
    fn delete_item(&self, item_id: ItemId) -> Result<bool, ApplicationError>;

    fn find_item(&self, item_id: ItemId) -> Result<Option<ClothingItem>, ApplicationError>;

    /// Newest first.
    fn list_items(&self) -> Result<Vec<ClothingItem>, ApplicationError>;

    fn list_items_by_category(
        &self,
        category: ClothingCategory,
    ) -> Result<Vec<ClothingItem>, ApplicationError>;

    fn count_items(&self) -> Result<u64, ApplicationError>;

    fn insert_outfit(&self, outfit: &NewOutfit) -> Result<OutfitId, ApplicationError>;

    fn update_outfit(&self, outfit: &Outfit) -> Result<(), ApplicationError>;

    fn delete_outfit(&self, outfit_id: OutfitId) -> Result<bool, ApplicationError>;

    fn find_outfit(&self, outfit_id: OutfitId) -> Result<Option<Outfit>, ApplicationError>;

    fn list_outfits(&self) -> Result<Vec<Outfit>, ApplicationError>;

    fn list_favorite_outfits(&self) -> Result<Vec<Outfit>, ApplicationError>;
}

/// Persistent, compressed image storage. Locators are absolute path strings.
pub trait ImageStore: Send {
    fn persist(
        &self,
        source: &ImageSource,
        category_hint: Option<&str>,
    ) -> Result<String, ApplicationError>;

    /// `Ok(false)` when there was nothing to delete.
    fn remove(&self, locator: &str) -> Result<bool, ApplicationError>;

    fn shareable_locator(&self, locator: &str) -> Result<String, ApplicationError>;

    fn storage_used_bytes(&self) -> Result<u64, ApplicationError>;

    /// Files named the way `persist` names them and last modified at least
    /// `min_age` ago. Anything else in the directory is never reported.
    fn list_stored(&self, min_age: Duration) -> Result<Vec<StoredImage>, ApplicationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Name relative to the storage root; stable when the root moves.
    pub file_name: String,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFile {
    /// Where the camera writes the shot.
    pub path: PathBuf,
    /// Externally resolvable form of `path`, used for previews.
    pub locator: String,
}

/// Short-lived files the camera writes into before the user confirms a shot.
pub trait CaptureFiles: Send {
    fn allocate(&self) -> Result<CaptureFile, ApplicationError>;

    /// Best-effort; returns how many entries were removed.
    fn sweep_expired(&self, max_age: Duration) -> usize;

    /// Only deletes files that live inside the capture directory.
    fn discard(&self, path: &Path) -> bool;

    fn discard_all(&self) -> Result<(), ApplicationError>;
}

pub trait Clock: Send {
    fn now_epoch_millis(&self) -> i64;
}
