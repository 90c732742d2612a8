use serde::{Deserialize, Serialize};

use crate::{ClothingCategory, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidItemId(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// A catalogued garment. `image_uri` is the absolute path of the stored JPEG
/// and stays valid for as long as the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: ItemId,
    pub name: String,
    pub category: ClothingCategory,
    pub color: Option<String>,
    pub image_uri: String,
    pub season: Option<String>,
    pub last_worn: Option<i64>,
    pub created_at: i64,
}

impl ClothingItem {
    pub fn worn_at(&self, epoch_millis: i64) -> Self {
        Self {
            last_worn: Some(epoch_millis),
            ..self.clone()
        }
    }
}
