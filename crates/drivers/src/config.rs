use std::path::PathBuf;
use std::time::Duration;

use wardrobe_adapters::ImageStoreSettings;
use wardrobe_application::DEFAULT_CAPTURE_MAX_AGE;

const APP_DIR: &str = "wardrobe";
pub const DEFAULT_SHARE_AUTHORITY: &str = "wardrobe.fileprovider";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no default {0} directory on this platform; set {1}")]
    MissingDirectory(&'static str, &'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub share_authority: String,
    pub image_settings: ImageStoreSettings,
    pub capture_max_age: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which returns the raw value of
    /// an environment variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match non_empty(lookup("WARDROBE_DATA_DIR")) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::MissingDirectory("data", "WARDROBE_DATA_DIR"))?,
        };
        let cache_dir = match non_empty(lookup("WARDROBE_CACHE_DIR")) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::MissingDirectory("cache", "WARDROBE_CACHE_DIR"))?,
        };

        let share_authority = non_empty(lookup("WARDROBE_SHARE_AUTHORITY"))
            .unwrap_or_else(|| DEFAULT_SHARE_AUTHORITY.to_string());

        let defaults = ImageStoreSettings::default();
        let max_dimension = match non_empty(lookup("WARDROBE_MAX_IMAGE_DIMENSION")) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidValue("WARDROBE_MAX_IMAGE_DIMENSION", raw)),
            },
            None => defaults.max_dimension,
        };
        let jpeg_quality = match non_empty(lookup("WARDROBE_JPEG_QUALITY")) {
            Some(raw) => match raw.parse::<u8>() {
                Ok(value) if (1..=100).contains(&value) => value,
                _ => return Err(ConfigError::InvalidValue("WARDROBE_JPEG_QUALITY", raw)),
            },
            None => defaults.jpeg_quality,
        };
        let capture_max_age = match non_empty(lookup("WARDROBE_CAPTURE_MAX_AGE_SECS")) {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue("WARDROBE_CAPTURE_MAX_AGE_SECS", raw))?,
            None => DEFAULT_CAPTURE_MAX_AGE,
        };

        Ok(Self {
            data_dir,
            cache_dir,
            share_authority,
            image_settings: ImageStoreSettings {
                max_dimension,
                jpeg_quality,
            },
            capture_max_age,
        })
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("wardrobe.sqlite3")
    }

    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join("wardrobe")
    }

    pub fn capture_dir(&self) -> PathBuf {
        self.cache_dir.join("temp_captures")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
