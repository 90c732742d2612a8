mod error;
mod ports;
mod service;
mod state;
mod use_cases;
mod watch;

pub use error::ApplicationError;
pub use ports::{
    CaptureFile, CaptureFiles, Clock, ImageStore, NewClothingItem, NewOutfit, StoredImage,
    WardrobeStore,
};
pub use service::{WardrobeService, DEFAULT_CAPTURE_MAX_AGE};
pub use state::OperationState;
pub use use_cases::{
    AddClothingItemCommand, BootstrapCommand, ConfirmCaptureCommand, DeleteClothingItemCommand,
    DeleteItemReport, ListClothingItemsQuery, ListOutfitsQuery, MarkWornCommand,
    ReclaimOrphanedImagesCommand, SaveOutfitCommand, ToggleOutfitFavoriteCommand,
    UpdateClothingItemCommand, UpdateOutfitCommand,
};
pub use watch::{ItemCallback, ItemQuery, OutfitCallback, OutfitQuery, Subscription, WatchHub};
