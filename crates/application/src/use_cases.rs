use std::path::PathBuf;
use std::time::Duration;

use wardrobe_domain::{ClothingCategory, ClothingItem, ImageSource, ItemId, Outfit, OutfitId};

#[derive(Debug, Clone, Default)]
pub struct BootstrapCommand;

#[derive(Debug, Clone)]
pub struct AddClothingItemCommand {
    pub name: String,
    pub category: ClothingCategory,
    pub source: ImageSource,
    pub color: Option<String>,
    pub season: Option<String>,
}

/// Turns a confirmed camera capture into a catalogued item.
#[derive(Debug, Clone)]
pub struct ConfirmCaptureCommand {
    pub capture_path: PathBuf,
    pub name: String,
    pub category: ClothingCategory,
    pub color: Option<String>,
    pub season: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteClothingItemCommand {
    pub item: ClothingItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteItemReport {
    pub image_removed: bool,
    pub record_removed: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateClothingItemCommand {
    pub item: ClothingItem,
}

#[derive(Debug, Clone, Copy)]
pub struct MarkWornCommand {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListClothingItemsQuery {
    pub category: Option<ClothingCategory>,
}

#[derive(Debug, Clone)]
pub struct SaveOutfitCommand {
    pub name: String,
    pub item_ids: Vec<ItemId>,
}

#[derive(Debug, Clone)]
pub struct UpdateOutfitCommand {
    pub outfit: Outfit,
}

#[derive(Debug, Clone, Copy)]
pub struct ToggleOutfitFavoriteCommand {
    pub outfit_id: OutfitId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOutfitsQuery {
    pub favorites_only: bool,
}

/// Stored images younger than `min_age` are left alone even when nothing
/// refers to them yet, since an add may still be in flight.
#[derive(Debug, Clone, Copy)]
pub struct ReclaimOrphanedImagesCommand {
    pub min_age: Duration,
}
