use std::path::PathBuf;

use crate::DomainError;

/// Decoded RGB8 pixels held in memory, row-major and tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, DomainError> {
        let expected = (width as usize) * (height as usize) * 3;
        if width == 0 || height == 0 || rgb.len() != expected {
            return Err(DomainError::InvalidPixelBuffer {
                width,
                height,
                expected,
                actual: rgb.len(),
            });
        }
        Ok(Self { width, height, rgb })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Pixels(PixelBuffer),
}

/// Dimensions after shrinking so neither side exceeds `max_dimension`.
///
/// The larger side lands exactly on the limit and the other is scaled by the
/// same factor, truncated. Images already within bounds are returned as-is.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let larger = u64::from(width.max(height));
    let scale = |side: u32| -> u32 {
        let scaled = u64::from(side) * u64::from(max_dimension) / larger;
        (scaled as u32).max(1)
    };
    (scale(width), scale(height))
}
