pub mod fs;
pub mod migrations;
pub mod presenters;
pub mod sqlite;

pub use fs::{FsCaptureFiles, FsImageStore, ImageStoreSettings, SystemClock};
pub use presenters::{
    failure_message, present_item_row, present_items_json, present_outfit_row,
    present_outfits_json, present_storage,
};
pub use sqlite::SqliteWardrobeStore;
