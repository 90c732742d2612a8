use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};
use wardrobe_domain::{ClothingItem, ImageSource, ItemId, Outfit, OutfitId};

use crate::{
    AddClothingItemCommand, ApplicationError, BootstrapCommand, CaptureFile, CaptureFiles, Clock,
    ConfirmCaptureCommand, DeleteClothingItemCommand, DeleteItemReport, ImageStore, ItemQuery,
    ListClothingItemsQuery, ListOutfitsQuery, MarkWornCommand, NewClothingItem, NewOutfit,
    OutfitQuery, ReclaimOrphanedImagesCommand, SaveOutfitCommand, Subscription,
    ToggleOutfitFavoriteCommand, UpdateClothingItemCommand, UpdateOutfitCommand, WardrobeStore,
    WatchHub,
};

/// Captures older than this are swept when a new capture session starts.
pub const DEFAULT_CAPTURE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Coordinates the record store with image storage so that an item and its
/// image file are created and deleted together.
pub struct WardrobeService {
    store: Box<dyn WardrobeStore>,
    images: Box<dyn ImageStore>,
    captures: Box<dyn CaptureFiles>,
    clock: Box<dyn Clock>,
    watchers: WatchHub,
    capture_max_age: Duration,
}

impl WardrobeService {
    pub fn new(
        store: Box<dyn WardrobeStore>,
        images: Box<dyn ImageStore>,
        captures: Box<dyn CaptureFiles>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            store,
            images,
            captures,
            clock,
            watchers: WatchHub::default(),
            capture_max_age: DEFAULT_CAPTURE_MAX_AGE,
        }
    }

    pub fn with_capture_max_age(mut self, max_age: Duration) -> Self {
        self.capture_max_age = max_age;
        self
    }

    pub fn bootstrap(&self, _command: BootstrapCommand) -> Result<(), ApplicationError> {
        self.store.initialize()
    }

    pub fn begin_capture(&self) -> Result<CaptureFile, ApplicationError> {
        let swept = self.captures.sweep_expired(self.capture_max_age);
        if swept > 0 {
            debug!(swept, "reclaimed expired capture files");
        }
        self.captures.allocate()
    }

    pub fn cancel_capture(&self, capture_path: &Path) -> bool {
        self.captures.discard(capture_path)
    }

    /// Saves a confirmed capture as a new item. The capture file is discarded
    /// once the item exists; on failure it is kept so the user can retry.
    pub fn confirm_capture(
        &self,
        command: ConfirmCaptureCommand,
    ) -> Result<ItemId, ApplicationError> {
        let item_id = self.add_clothing_item(AddClothingItemCommand {
            name: command.name,
            category: command.category,
            source: ImageSource::File(command.capture_path.clone()),
            color: command.color,
            season: command.season,
        })?;

        if !self.captures.discard(&command.capture_path) {
            debug!(path = %command.capture_path.display(), "capture file was not discarded");
        }
        Ok(item_id)
    }

    pub fn clear_captures(&self) -> Result<(), ApplicationError> {
        self.captures.discard_all()
    }

    pub fn add_clothing_item(
        &self,
        command: AddClothingItemCommand,
    ) -> Result<ItemId, ApplicationError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(ApplicationError::InvalidArgument(
                "item name must not be empty".to_string(),
            ));
        }

        let image_uri = self
            .images
            .persist(&command.source, Some(command.category.name()))?;

        let new_item = NewClothingItem {
            name: name.to_string(),
            category: command.category,
            color: non_blank(command.color),
            image_uri: image_uri.clone(),
            season: non_blank(command.season),
            created_at: self.clock.now_epoch_millis(),
        };

        let item_id = match self.store.insert_item(&new_item) {
            Ok(item_id) => item_id,
            Err(error) => {
                if let Err(cleanup) = self.images.remove(&image_uri) {
                    warn!(image = %image_uri, error = %cleanup, "failed to remove image after insert failure");
                }
                return Err(error);
            }
        };

        info!(item_id = item_id.get(), image = %image_uri, "added clothing item");
        self.refresh_item_watchers();
        Ok(item_id)
    }

    pub fn delete_clothing_item(
        &self,
        command: DeleteClothingItemCommand,
    ) -> Result<DeleteItemReport, ApplicationError> {
        let item = command.item;
        let image_removed = match self.images.remove(&item.image_uri) {
            Ok(removed) => {
                if !removed {
                    warn!(item_id = item.id.get(), image = %item.image_uri, "backing image already missing");
                }
                removed
            }
            Err(error) => {
                warn!(item_id = item.id.get(), %error, "failed to remove backing image");
                false
            }
        };

        let record_removed = self.store.delete_item(item.id)?;
        info!(item_id = item.id.get(), image_removed, record_removed, "deleted clothing item");
        self.refresh_item_watchers();
        Ok(DeleteItemReport {
            image_removed,
            record_removed,
        })
    }

    pub fn update_clothing_item(
        &self,
        command: UpdateClothingItemCommand,
    ) -> Result<(), ApplicationError> {
        self.store.update_item(&command.item)?;
        self.refresh_item_watchers();
        Ok(())
    }

    pub fn mark_worn(&self, command: MarkWornCommand) -> Result<ClothingItem, ApplicationError> {
        let item = self.require_item(command.item_id)?;
        let worn = item.worn_at(self.clock.now_epoch_millis());
        self.store.update_item(&worn)?;
        self.refresh_item_watchers();
        Ok(worn)
    }

    pub fn find_clothing_item(
        &self,
        item_id: ItemId,
    ) -> Result<Option<ClothingItem>, ApplicationError> {
        self.store.find_item(item_id)
    }

    pub fn list_clothing_items(
        &self,
        query: ListClothingItemsQuery,
    ) -> Result<Vec<ClothingItem>, ApplicationError> {
        match query.category {
            Some(category) => self.store.list_items_by_category(category),
            None => self.store.list_items(),
        }
    }

    pub fn count_clothing_items(&self) -> Result<u64, ApplicationError> {
        self.store.count_items()
    }

    pub fn save_outfit(&self, command: SaveOutfitCommand) -> Result<OutfitId, ApplicationError> {
        let outfit_id = self.store.insert_outfit(&NewOutfit {
            name: command.name,
            item_ids: command.item_ids,
            created_at: self.clock.now_epoch_millis(),
        })?;
        info!(outfit_id = outfit_id.get(), "saved outfit");
        self.refresh_outfit_watchers();
        Ok(outfit_id)
    }

    pub fn update_outfit(&self, command: UpdateOutfitCommand) -> Result<(), ApplicationError> {
        self.store.update_outfit(&command.outfit)?;
        self.refresh_outfit_watchers();
        Ok(())
    }

    pub fn delete_outfit(&self, outfit_id: OutfitId) -> Result<bool, ApplicationError> {
        let removed = self.store.delete_outfit(outfit_id)?;
        self.refresh_outfit_watchers();
        Ok(removed)
    }

    /// Read-modify-write of the stored record; the last writer wins.
    pub fn toggle_outfit_favorite(
        &self,
        command: ToggleOutfitFavoriteCommand,
    ) -> Result<Outfit, ApplicationError> {
        let current = self.require_outfit(command.outfit_id)?;
        let updated = current.with_favorite_toggled();
        self.store.update_outfit(&updated)?;
        self.refresh_outfit_watchers();
        Ok(updated)
    }

    pub fn find_outfit(&self, outfit_id: OutfitId) -> Result<Option<Outfit>, ApplicationError> {
        self.store.find_outfit(outfit_id)
    }

    pub fn list_outfits(&self, query: ListOutfitsQuery) -> Result<Vec<Outfit>, ApplicationError> {
        if query.favorites_only {
            self.store.list_favorite_outfits()
        } else {
            self.store.list_outfits()
        }
    }

    /// Items of an outfit in stored order. Ids whose item has since been
    /// deleted are skipped; the stored id list itself is left untouched.
    pub fn resolve_outfit_items(
        &self,
        outfit_id: OutfitId,
    ) -> Result<Vec<ClothingItem>, ApplicationError> {
        let outfit = self.require_outfit(outfit_id)?;
        let mut items = Vec::with_capacity(outfit.item_ids.len());
        for item_id in outfit.item_ids {
            match self.store.find_item(item_id)? {
                Some(item) => items.push(item),
                None => debug!(
                    outfit_id = outfit_id.get(),
                    item_id = item_id.get(),
                    "skipping dangling outfit reference"
                ),
            }
        }
        Ok(items)
    }

    pub fn storage_used_bytes(&self) -> Result<u64, ApplicationError> {
        self.images.storage_used_bytes()
    }

    pub fn shareable_locator(&self, image_uri: &str) -> Result<String, ApplicationError> {
        self.images.shareable_locator(image_uri)
    }

    /// Deletes stored images no item refers to, e.g. left behind when the
    /// process died between persisting an image and inserting its record.
    /// Items are matched by file name so a relocated image root still counts
    /// as referenced. A file that cannot be removed is skipped.
    pub fn reclaim_orphaned_images(
        &self,
        command: ReclaimOrphanedImagesCommand,
    ) -> Result<usize, ApplicationError> {
        let referenced: HashSet<String> = self
            .store
            .list_items()?
            .into_iter()
            .filter_map(|item| {
                Path::new(&item.image_uri)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .collect();

        let mut reclaimed = 0;
        for stored in self.images.list_stored(command.min_age)? {
            if referenced.contains(&stored.file_name) {
                continue;
            }
            match self.images.remove(&stored.locator) {
                Ok(true) => reclaimed += 1,
                Ok(false) => {}
                Err(error) => {
                    warn!(image = %stored.locator, %error, "failed to reclaim orphaned image");
                }
            }
        }

        if reclaimed > 0 {
            info!(reclaimed, "reclaimed orphaned images");
        }
        Ok(reclaimed)
    }

    /// Delivers the current snapshot right away, then again after every
    /// mutation until the returned subscription is dropped.
    pub fn watch_clothing_items<F>(
        &self,
        query: ItemQuery,
        mut callback: F,
    ) -> Result<Subscription, ApplicationError>
    where
        F: FnMut(&[ClothingItem]) + Send + 'static,
    {
        let snapshot = self.load_items(query)?;
        callback(&snapshot);
        self.watchers.subscribe_items(query, Box::new(callback))
    }

    pub fn watch_outfits<F>(
        &self,
        query: OutfitQuery,
        mut callback: F,
    ) -> Result<Subscription, ApplicationError>
    where
        F: FnMut(&[Outfit]) + Send + 'static,
    {
        let snapshot = self.load_outfits(query)?;
        callback(&snapshot);
        self.watchers.subscribe_outfits(query, Box::new(callback))
    }

    fn require_item(&self, item_id: ItemId) -> Result<ClothingItem, ApplicationError> {
        self.store.find_item(item_id)?.ok_or_else(|| {
            ApplicationError::NotFound(format!("clothing item not found for id={}", item_id.get()))
        })
    }

    fn require_outfit(&self, outfit_id: OutfitId) -> Result<Outfit, ApplicationError> {
        self.store.find_outfit(outfit_id)?.ok_or_else(|| {
            ApplicationError::NotFound(format!("outfit not found for id={}", outfit_id.get()))
        })
    }

    fn load_items(&self, query: ItemQuery) -> Result<Vec<ClothingItem>, ApplicationError> {
        match query {
            ItemQuery::All => self.store.list_items(),
            ItemQuery::Category(category) => self.store.list_items_by_category(category),
        }
    }

    fn load_outfits(&self, query: OutfitQuery) -> Result<Vec<Outfit>, ApplicationError> {
        match query {
            OutfitQuery::All => self.store.list_outfits(),
            OutfitQuery::Favorites => self.store.list_favorite_outfits(),
        }
    }

    // The mutation already happened, so a failed refresh is only logged.
    fn refresh_item_watchers(&self) {
        if let Err(error) = self.watchers.notify_items(|query| self.load_items(query)) {
            warn!(%error, "failed to refresh clothing item watchers");
        }
    }

    fn refresh_outfit_watchers(&self) {
        if let Err(error) = self.watchers.notify_outfits(|query| self.load_outfits(query)) {
            warn!(%error, "failed to refresh outfit watchers");
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
