use wardrobe_application::ApplicationError;
use wardrobe_domain::{ClothingItem, Outfit};

pub fn present_item_row(item: &ClothingItem) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        item.id.get(),
        item.category,
        item.name,
        item.color.as_deref().unwrap_or("-"),
        item.season.as_deref().unwrap_or("-"),
        item.last_worn
            .map(|millis| millis.to_string())
            .unwrap_or_else(|| "never".to_string()),
        item.image_uri
    )
}

pub fn present_outfit_row(outfit: &Outfit) -> String {
    let item_ids = outfit
        .item_ids
        .iter()
        .map(|id| id.get().to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}\t{}{}\t[{}]",
        outfit.id.get(),
        if outfit.is_favorite { "* " } else { "" },
        outfit.name,
        item_ids
    )
}

pub fn present_items_json(items: &[ClothingItem]) -> Result<String, ApplicationError> {
    serde_json::to_string_pretty(items)
        .map_err(|error| ApplicationError::Persistence(format!("failed to encode items: {error}")))
}

pub fn present_outfits_json(outfits: &[Outfit]) -> Result<String, ApplicationError> {
    serde_json::to_string_pretty(outfits).map_err(|error| {
        ApplicationError::Persistence(format!("failed to encode outfits: {error}"))
    })
}

/// Byte count in the largest binary unit that keeps the value at or above one.
pub fn present_storage(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

/// Message shown to the user when adding an item fails.
pub fn failure_message(error: &ApplicationError) -> String {
    match error {
        ApplicationError::NotFound(_) => "Image file not found".to_string(),
        ApplicationError::Io(message) | ApplicationError::Decode(message) => {
            format!("Failed to save image: {message}")
        }
        other => format!("Something went wrong: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardrobe_domain::{ClothingCategory, ItemId, OutfitId};

    fn item() -> ClothingItem {
        ClothingItem {
            id: ItemId::new(4).expect("id"),
            name: "Rain Jacket".to_string(),
            category: ClothingCategory::Outerwear,
            color: Some("Yellow".to_string()),
            image_uri: "/data/wardrobe/outerwear_0a1b2c3d_1.jpg".to_string(),
            season: None,
            last_worn: None,
            created_at: 1,
        }
    }

    #[test]
    fn item_row_fills_missing_fields() {
        assert_eq!(
            present_item_row(&item()),
            "4\tOUTERWEAR\tRain Jacket\tYellow\t-\tnever\t/data/wardrobe/outerwear_0a1b2c3d_1.jpg"
        );
    }

    #[test]
    fn outfit_row_marks_favorites() {
        let outfit = Outfit {
            id: OutfitId::new(2).expect("id"),
            name: "Rainy Day".to_string(),
            item_ids: vec![ItemId::new(4).expect("id"), ItemId::new(1).expect("id")],
            created_at: 5,
            is_favorite: true,
        };
        assert_eq!(present_outfit_row(&outfit), "2\t* Rainy Day\t[4,1]");
    }

    #[test]
    fn items_encode_as_json_array() {
        let json = present_items_json(&[item()]).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value[0]["id"], 4);
        assert_eq!(value[0]["category"], "OUTERWEAR");
        assert!(value[0]["season"].is_null());
    }

    #[test]
    fn storage_uses_binary_units() {
        assert_eq!(present_storage(0), "0 B");
        assert_eq!(present_storage(1023), "1023 B");
        assert_eq!(present_storage(1536), "1.5 KiB");
        assert_eq!(present_storage(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn failure_messages_follow_error_kind() {
        assert_eq!(
            failure_message(&ApplicationError::NotFound("x".to_string())),
            "Image file not found"
        );
        assert_eq!(
            failure_message(&ApplicationError::Decode("bad header".to_string())),
            "Failed to save image: bad header"
        );
        assert_eq!(
            failure_message(&ApplicationError::Persistence("locked".to_string())),
            "Something went wrong: persistence error: locked"
        );
    }
}
