use serde::{Deserialize, Serialize};

use crate::{DomainError, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutfitId(i64);

impl OutfitId {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidOutfitId(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// A named, ordered group of item references. Ids are not checked against the
/// catalog, so an outfit may outlive some of its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: OutfitId,
    pub name: String,
    pub item_ids: Vec<ItemId>,
    pub created_at: i64,
    pub is_favorite: bool,
}

impl Outfit {
    pub fn with_favorite_toggled(&self) -> Self {
        Self {
            is_favorite: !self.is_favorite,
            ..self.clone()
        }
    }
}
