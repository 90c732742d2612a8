mod category;
mod error;
mod image;
mod item;
mod outfit;

pub use category::ClothingCategory;
pub use error::DomainError;
pub use image::{fit_within, ImageSource, PixelBuffer};
pub use item::{ClothingItem, ItemId};
pub use outfit::{Outfit, OutfitId};
