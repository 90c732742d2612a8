use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;
use wardrobe_application::{ApplicationError, CaptureFile, CaptureFiles};

#[derive(Debug, Clone)]
pub struct FsCaptureFiles {
    root: PathBuf,
}

impl FsCaptureFiles {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl CaptureFiles for FsCaptureFiles {
    fn allocate(&self) -> Result<CaptureFile, ApplicationError> {
        fs::create_dir_all(&self.root).map_err(|error| {
            ApplicationError::from_io("failed to create capture directory", error)
        })?;

        let path = self.root.join(format!("capture_{}.jpg", Uuid::new_v4()));
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|error| ApplicationError::from_io("failed to create capture file", error))?;

        let absolute = path
            .canonicalize()
            .map_err(|error| ApplicationError::from_io("failed to resolve capture file", error))?;
        let locator = Url::from_file_path(&absolute).map_err(|()| {
            ApplicationError::InvalidArgument(format!(
                "capture path has no file url: {}",
                absolute.display()
            ))
        })?;
        debug!(path = %absolute.display(), %locator, "allocated capture file");
        Ok(CaptureFile {
            locator: locator.into(),
            path: absolute,
        })
    }

    fn sweep_expired(&self, max_age: Duration) -> usize {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return 0;
        };

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.filter_map(Result::ok) {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= max_age {
                continue;
            }

            let path = entry.path();
            let outcome = if metadata.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match outcome {
                Ok(()) => removed += 1,
                Err(error) => debug!(path = %path.display(), %error, "could not sweep capture file"),
            }
        }
        removed
    }

    fn discard(&self, path: &Path) -> bool {
        let (Ok(root), Ok(target)) = (self.root.canonicalize(), path.canonicalize()) else {
            return false;
        };
        if target == root || !target.starts_with(&root) {
            warn!(path = %path.display(), "refusing to discard file outside the capture directory");
            return false;
        }

        match fs::remove_file(&target) {
            Ok(()) => true,
            Err(error) => {
                debug!(path = %target.display(), %error, "could not discard capture file");
                false
            }
        }
    }

    fn discard_all(&self) -> Result<(), ApplicationError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ApplicationError::from_io(
                "failed to clear capture directory",
                error,
            )),
        }
    }
}
