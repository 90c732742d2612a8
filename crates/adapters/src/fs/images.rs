use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{io::Reader as ImageReader, ColorType, DynamicImage, RgbImage};
use tracing::info;
use uuid::Uuid;
use walkdir::WalkDir;
use wardrobe_application::{ApplicationError, ImageStore, StoredImage};
use wardrobe_domain::{fit_within, ImageSource, PixelBuffer};

pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
const DEFAULT_PREFIX: &str = "item";
const SHARE_SEGMENT: &str = "wardrobe";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageStoreSettings {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageStoreSettings {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Stores downsampled JPEGs in a private directory. Every operation is
/// blocking file I/O.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    settings: ImageStoreSettings,
    share_authority: String,
}

impl FsImageStore {
    pub fn new(root: PathBuf, settings: ImageStoreSettings, share_authority: String) -> Self {
        Self {
            root,
            settings,
            share_authority,
        }
    }

    fn ensure_root(&self) -> Result<PathBuf, ApplicationError> {
        fs::create_dir_all(&self.root)
            .map_err(|error| ApplicationError::from_io("failed to create image directory", error))?;
        self.root
            .canonicalize()
            .map_err(|error| ApplicationError::from_io("failed to resolve image directory", error))
    }
}

impl ImageStore for FsImageStore {
    fn persist(
        &self,
        source: &ImageSource,
        category_hint: Option<&str>,
    ) -> Result<String, ApplicationError> {
        let decoded = match source {
            ImageSource::File(path) => decode_file(path)?,
            ImageSource::Pixels(buffer) => from_pixels(buffer)?,
        };

        let (width, height) = fit_within(
            decoded.width(),
            decoded.height(),
            self.settings.max_dimension,
        );
        let resized = if (width, height) == (decoded.width(), decoded.height()) {
            decoded
        } else {
            decoded.resize_exact(width, height, FilterType::Triangle)
        };
        let rgb = resized.to_rgb8();
        drop(resized);

        let root = self.ensure_root()?;
        let file_name = stored_file_name(category_hint, chrono::Utc::now().timestamp_millis());
        let target = root.join(file_name);
        write_jpeg(&target, &rgb, self.settings.jpeg_quality)?;

        info!(path = %target.display(), width, height, "persisted image");
        Ok(target.to_string_lossy().into_owned())
    }

    fn remove(&self, locator: &str) -> Result<bool, ApplicationError> {
        match fs::remove_file(locator) {
            Ok(()) => {
                info!(path = locator, "removed image");
                Ok(true)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(ApplicationError::from_io(
                &format!("failed to remove image {locator}"),
                error,
            )),
        }
    }

    fn shareable_locator(&self, locator: &str) -> Result<String, ApplicationError> {
        let path = Path::new(locator);
        if !path.is_file() {
            return Err(ApplicationError::InvalidArgument(format!(
                "image file does not exist: {locator}"
            )));
        }

        let canonical = path
            .canonicalize()
            .map_err(|error| ApplicationError::from_io("failed to resolve image path", error))?;
        let root = self.ensure_root()?;
        let relative = canonical.strip_prefix(&root).map_err(|_| {
            ApplicationError::PermissionDenied(format!(
                "image is outside the wardrobe directory: {locator}"
            ))
        })?;

        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Ok(format!(
            "content://{}/{}/{}",
            self.share_authority,
            SHARE_SEGMENT,
            segments.join("/")
        ))
    }

    fn storage_used_bytes(&self) -> Result<u64, ApplicationError> {
        if !self.root.exists() {
            return Ok(0);
        }

        let total = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum();
        Ok(total)
    }

    fn list_stored(&self, min_age: Duration) -> Result<Vec<StoredImage>, ApplicationError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let root = self.ensure_root()?;
        let now = SystemTime::now();
        let mut stored: Vec<StoredImage> = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .metadata()
                    .ok()
                    .and_then(|metadata| metadata.modified().ok())
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age >= min_age)
            })
            .filter_map(|entry| {
                let file_name = entry.file_name().to_str()?.to_string();
                is_stored_file_name(&file_name).then(|| StoredImage {
                    locator: entry.path().to_string_lossy().into_owned(),
                    file_name,
                })
            })
            .collect();
        stored.sort_by(|left, right| left.file_name.cmp(&right.file_name));
        Ok(stored)
    }
}

fn decode_file(path: &Path) -> Result<DynamicImage, ApplicationError> {
    ImageReader::open(path)
        .map_err(|error| {
            ApplicationError::from_io(&format!("cannot open source image {}", path.display()), error)
        })?
        .with_guessed_format()
        .map_err(|error| ApplicationError::from_io("cannot read source image", error))?
        .decode()
        .map_err(|error| ApplicationError::Decode(error.to_string()))
}

fn from_pixels(buffer: &PixelBuffer) -> Result<DynamicImage, ApplicationError> {
    RgbImage::from_raw(buffer.width(), buffer.height(), buffer.rgb().to_vec())
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| {
            ApplicationError::InvalidArgument(format!(
                "pixel buffer does not match {}x{}",
                buffer.width(),
                buffer.height()
            ))
        })
}

fn write_jpeg(target: &Path, rgb: &RgbImage, quality: u8) -> Result<(), ApplicationError> {
    let file = File::create(target)
        .map_err(|error| ApplicationError::from_io("failed to create stored image", error))?;
    let mut writer = BufWriter::new(file);

    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    let encoded = encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8);
    drop(encoder);

    let encoded = encoded
        .map_err(|error| ApplicationError::Io(format!("failed to encode jpeg: {error}")))
        .and_then(|()| {
            writer
                .flush()
                .map_err(|error| ApplicationError::from_io("failed to write stored image", error))
        });

    if encoded.is_err() {
        drop(writer);
        let _ = fs::remove_file(target);
    }
    encoded
}

/// `{prefix}_{8 hex}_{epoch millis}.jpg`. The prefix is the lower-cased hint,
/// reduced to characters that are safe in a file name.
pub fn stored_file_name(category_hint: Option<&str>, epoch_millis: i64) -> String {
    let prefix = category_hint
        .map(|hint| {
            hint.trim()
                .to_lowercase()
                .chars()
                .map(|ch| {
                    if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                        ch
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
    let random = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}_{epoch_millis}.jpg", &random[..8])
}

/// Whether `name` has the shape `stored_file_name` produces.
fn is_stored_file_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".jpg") else {
        return false;
    };
    let mut parts = stem.rsplitn(3, '_');
    let (Some(millis), Some(random), Some(prefix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    !prefix.is_empty()
        && random.len() == 8
        && random.chars().all(|ch| ch.is_ascii_hexdigit())
        && !millis.is_empty()
        && millis.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, ImageFormat, Rgb};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FsImageStore {
        FsImageStore::new(
            dir.path().join("wardrobe"),
            ImageStoreSettings::default(),
            "com.example.wardrobe.fileprovider".to_string(),
        )
    }

    fn write_source(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 90_u8])
        });
        img.save(&path).expect("save source");
        path
    }

    fn file_name(path: &str) -> String {
        Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .expect("file name")
            .to_string()
    }

    #[test]
    fn persist_downsamples_wide_outerwear_shot() {
        let dir = TempDir::new().expect("tempdir");
        let source = write_source(&dir, "shot.jpg", 2000, 1000);
        let store = store_in(&dir);

        let stored = store
            .persist(&ImageSource::File(source), Some("OUTERWEAR"))
            .expect("persist");

        assert!(Path::new(&stored).is_absolute());
        assert!(file_name(&stored).starts_with("outerwear_"));
        let reader = ImageReader::open(&stored)
            .expect("open")
            .with_guessed_format()
            .expect("guess");
        assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
        let decoded = reader.decode().expect("decode");
        assert_eq!(decoded.dimensions(), (1024, 512));
    }

    #[test]
    fn persist_preserves_aspect_ratio_of_tall_images() {
        let dir = TempDir::new().expect("tempdir");
        let source = write_source(&dir, "tall.jpg", 900, 3000);
        let store = store_in(&dir);

        let stored = store
            .persist(&ImageSource::File(source), Some("DRESS"))
            .expect("persist");

        let decoded = image::open(&stored).expect("decode");
        assert_eq!(decoded.dimensions(), (307, 1024));
    }

    #[test]
    fn persist_keeps_small_images_at_original_size() {
        let dir = TempDir::new().expect("tempdir");
        let source = write_source(&dir, "small.jpg", 320, 200);
        let store = store_in(&dir);

        let stored = store
            .persist(&ImageSource::File(source), Some("TOP"))
            .expect("persist");

        assert_eq!(image::open(&stored).expect("decode").dimensions(), (320, 200));
    }

    #[test]
    fn persist_from_pixels_without_category_uses_item_prefix() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        let pixels = PixelBuffer::new(4, 2, vec![200; 24]).expect("pixels");

        let stored = store
            .persist(&ImageSource::Pixels(pixels), None)
            .expect("persist");

        let name = file_name(&stored);
        let parts: Vec<&str> = name.trim_end_matches(".jpg").split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "item");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|ch| ch.is_ascii_hexdigit()));
        assert!(parts[2].parse::<i64>().is_ok());
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn persist_missing_source_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let result = store.persist(
            &ImageSource::File(dir.path().join("nope.jpg")),
            Some("TOP"),
        );

        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
        assert_eq!(store.storage_used_bytes().expect("storage"), 0);
    }

    #[test]
    fn persist_undecodable_source_is_decode_error() {
        let dir = TempDir::new().expect("tempdir");
        let source = dir.path().join("garbage.jpg");
        fs::write(&source, b"definitely not a jpeg").expect("write");
        let store = store_in(&dir);

        let result = store.persist(&ImageSource::File(source), None);

        assert!(matches!(result, Err(ApplicationError::Decode(_))));
    }

    #[test]
    fn remove_reports_whether_a_file_was_deleted() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        let missing = dir.path().join("wardrobe/ghost.jpg");
        assert!(!store
            .remove(&missing.to_string_lossy())
            .expect("remove missing"));

        let stored = store
            .persist(
                &ImageSource::File(write_source(&dir, "a.jpg", 10, 10)),
                Some("SHOES"),
            )
            .expect("persist");
        assert!(store.remove(&stored).expect("remove"));
        assert!(!Path::new(&stored).exists());
    }

    #[test]
    fn storage_used_sums_stored_files() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        assert_eq!(store.storage_used_bytes().expect("empty"), 0);
        fs::create_dir_all(dir.path().join("wardrobe")).expect("mkdir");
        assert_eq!(store.storage_used_bytes().expect("empty dir"), 0);

        let first = store
            .persist(
                &ImageSource::File(write_source(&dir, "a.jpg", 300, 200)),
                Some("TOP"),
            )
            .expect("persist");
        let second = store
            .persist(
                &ImageSource::File(write_source(&dir, "b.jpg", 1500, 1500)),
                Some("BOTTOM"),
            )
            .expect("persist");

        let expected = fs::metadata(&first).expect("meta").len()
            + fs::metadata(&second).expect("meta").len();
        assert_eq!(store.storage_used_bytes().expect("used"), expected);
        assert_eq!(store.list_stored(Duration::ZERO).expect("list").len(), 2);
    }

    #[test]
    fn shareable_locator_requires_existing_file_inside_store() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let missing = store.shareable_locator("/no/such/image.jpg");
        assert!(matches!(missing, Err(ApplicationError::InvalidArgument(_))));

        let outside = write_source(&dir, "outside.jpg", 8, 8);
        let denied = store.shareable_locator(&outside.to_string_lossy());
        assert!(matches!(denied, Err(ApplicationError::PermissionDenied(_))));

        let stored = store
            .persist(&ImageSource::File(outside), Some("TOP"))
            .expect("persist");
        let shared = store.shareable_locator(&stored).expect("share");
        assert_eq!(
            shared,
            format!(
                "content://com.example.wardrobe.fileprovider/wardrobe/{}",
                file_name(&stored)
            )
        );
    }

    fn age(path: &Path, seconds: u64) {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(path)
            .expect("open for touch");
        file.set_modified(SystemTime::now() - Duration::from_secs(seconds))
            .expect("set mtime");
    }

    #[test]
    fn list_stored_skips_fresh_and_foreign_files() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        let old = store
            .persist(
                &ImageSource::File(write_source(&dir, "a.jpg", 10, 10)),
                Some("TOP"),
            )
            .expect("persist");
        let fresh = store
            .persist(
                &ImageSource::File(write_source(&dir, "b.jpg", 10, 10)),
                Some("SHOES"),
            )
            .expect("persist");
        let foreign = dir.path().join("wardrobe/notes.jpg");
        fs::write(&foreign, b"keep me").expect("write");
        age(Path::new(&old), 3_600);
        age(&foreign, 3_600);

        let listed = store
            .list_stored(Duration::from_secs(600))
            .expect("list");

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_name, file_name(&old));
        assert_eq!(listed[0].locator, old);
        assert!(Path::new(&fresh).exists());
    }

    #[test]
    fn stored_file_names_are_recognised() {
        assert!(is_stored_file_name(&stored_file_name(Some("Rain/Coat"), 42)));
        assert!(is_stored_file_name("item_0a1b2c3d_1700000000000.jpg"));
        assert!(!is_stored_file_name("item_0a1b2c3d_1700000000000.png"));
        assert!(!is_stored_file_name("item_xyz_1.jpg"));
        assert!(!is_stored_file_name("_0a1b2c3d_1.jpg"));
        assert!(!is_stored_file_name("capture_0a1b2c3d.jpg"));
    }

    #[test]
    fn stored_file_name_sanitizes_hint() {
        let name = stored_file_name(Some("Rain/Coat"), 42);
        assert!(name.starts_with("rain_coat_"));
        assert!(name.ends_with("_42.jpg"));
        assert!(stored_file_name(Some("  "), 1).starts_with("item_"));
    }
}
