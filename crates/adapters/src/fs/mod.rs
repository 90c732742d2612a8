mod capture;
mod clock;
mod images;

pub use capture::FsCaptureFiles;
pub use clock::SystemClock;
pub use images::{
    stored_file_name, FsImageStore, ImageStoreSettings, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_DIMENSION,
};
