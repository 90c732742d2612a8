mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use config::AppConfig;
use wardrobe_adapters::{
    failure_message, present_item_row, present_items_json, present_outfit_row,
    present_outfits_json, present_storage, FsCaptureFiles, FsImageStore, SqliteWardrobeStore,
    SystemClock,
};
use wardrobe_application::{
    AddClothingItemCommand, ApplicationError, BootstrapCommand, ConfirmCaptureCommand,
    DeleteClothingItemCommand, ListClothingItemsQuery, ListOutfitsQuery, MarkWornCommand,
    OperationState, ReclaimOrphanedImagesCommand, SaveOutfitCommand,
    ToggleOutfitFavoriteCommand, WardrobeService,
};
use wardrobe_domain::{ClothingCategory, ClothingItem, ImageSource, ItemId, OutfitId};

#[derive(Parser, Debug)]
#[command(name = "wardrobe", about = "Catalog clothing photos and assemble outfits")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a capture session and print the file the camera should write to
    Capture,
    /// Drop a capture file without saving it
    DiscardCapture { path: PathBuf },
    /// Store an image and catalog it as a new item
    Add {
        image: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        season: Option<String>,
        /// Treat the image as a capture file and discard it once saved
        #[arg(long)]
        from_capture: bool,
    },
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Show { id: i64 },
    /// Record that an item was worn now
    Wear { id: i64 },
    Delete { id: i64 },
    OutfitSave { name: String, item_ids: Vec<i64> },
    Outfits {
        #[arg(long)]
        favorites: bool,
        #[arg(long)]
        json: bool,
    },
    /// List the items of an outfit that still exist
    OutfitShow { id: i64 },
    /// Toggle the favorite flag of an outfit
    Favorite { id: i64 },
    OutfitDelete { id: i64 },
    /// Print a shareable locator for an item's image
    Share { id: i64 },
    Storage,
    CleanCaptures,
    /// Delete stored images no item refers to
    Reclaim {
        /// Only consider images at least this old; defaults to the capture max age
        #[arg(long)]
        min_age_secs: Option<u64>,
    },
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("invalid configuration: {error}");
            return ExitCode::from(1);
        }
    };

    let service = match prepare_service(&config) {
        Ok(service) => service,
        Err(error) => {
            eprintln!("failed to bootstrap wardrobe: {error}");
            return ExitCode::from(1);
        }
    };

    match run_command(cli.command, &service, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_wardrobe_service(config: &AppConfig) -> WardrobeService {
    WardrobeService::new(
        Box::new(SqliteWardrobeStore::new(config.catalog_path())),
        Box::new(FsImageStore::new(
            config.image_dir(),
            config.image_settings,
            config.share_authority.clone(),
        )),
        Box::new(FsCaptureFiles::new(config.capture_dir())),
        Box::new(SystemClock),
    )
    .with_capture_max_age(config.capture_max_age)
}

fn prepare_service(config: &AppConfig) -> Result<WardrobeService, ApplicationError> {
    let service = build_wardrobe_service(config);
    service.bootstrap(BootstrapCommand)?;
    Ok(service)
}

fn run_command(
    command: Command,
    service: &WardrobeService,
    config: &AppConfig,
) -> Result<(), CommandError> {
    match command {
        Command::Capture => {
            let capture = service
                .begin_capture()
                .map_err(|error| runtime("capture failed", error))?;
            println!("{}", capture.path.display());
            println!("{}", capture.locator);
            Ok(())
        }
        Command::DiscardCapture { path } => {
            if service.cancel_capture(&path) {
                println!("discarded {}", path.display());
            } else {
                println!("nothing to discard at {}", path.display());
            }
            Ok(())
        }
        Command::Add {
            image,
            name,
            category,
            color,
            season,
            from_capture,
        } => {
            let category = parse_category(&category)?;
            let mut state = OperationState::default();
            state.begin();
            let result = if from_capture {
                service.confirm_capture(ConfirmCaptureCommand {
                    capture_path: image,
                    name,
                    category,
                    color,
                    season,
                })
            } else {
                service.add_clothing_item(AddClothingItemCommand {
                    name,
                    category,
                    source: ImageSource::File(image),
                    color,
                    season,
                })
            };
            state.complete(result, failure_message);

            match state {
                OperationState::Succeeded(item_id) => {
                    println!("added item {}", item_id.get());
                    Ok(())
                }
                OperationState::Failed(message) => Err(CommandError::Runtime(message)),
                OperationState::Idle | OperationState::InProgress => Err(CommandError::Runtime(
                    "add did not complete".to_string(),
                )),
            }
        }
        Command::List { category, json } => {
            let category = category.as_deref().map(parse_category).transpose()?;
            let items = service
                .list_clothing_items(ListClothingItemsQuery { category })
                .map_err(|error| runtime("list failed", error))?;
            if json {
                let encoded =
                    present_items_json(&items).map_err(|error| runtime("list failed", error))?;
                println!("{encoded}");
                return Ok(());
            }
            if items.is_empty() {
                println!("no items in wardrobe");
                return Ok(());
            }
            for item in items {
                println!("{}", present_item_row(&item));
            }
            Ok(())
        }
        Command::Show { id } => {
            let item = require_item(service, id)?;
            println!("{}", present_item_row(&item));
            Ok(())
        }
        Command::Wear { id } => {
            let item_id = parse_item_id(id)?;
            let item = service
                .mark_worn(MarkWornCommand { item_id })
                .map_err(|error| runtime("wear failed", error))?;
            println!("{}", present_item_row(&item));
            Ok(())
        }
        Command::Delete { id } => {
            let item = require_item(service, id)?;
            let report = service
                .delete_clothing_item(DeleteClothingItemCommand { item })
                .map_err(|error| runtime("delete failed", error))?;
            println!(
                "deleted item {}: image_removed={}, record_removed={}",
                id, report.image_removed, report.record_removed
            );
            Ok(())
        }
        Command::OutfitSave { name, item_ids } => {
            let item_ids = item_ids
                .into_iter()
                .map(parse_item_id)
                .collect::<Result<Vec<_>, _>>()?;
            let outfit_id = service
                .save_outfit(SaveOutfitCommand { name, item_ids })
                .map_err(|error| runtime("outfit save failed", error))?;
            println!("saved outfit {}", outfit_id.get());
            Ok(())
        }
        Command::Outfits { favorites, json } => {
            let outfits = service
                .list_outfits(ListOutfitsQuery {
                    favorites_only: favorites,
                })
                .map_err(|error| runtime("outfits failed", error))?;
            if json {
                let encoded = present_outfits_json(&outfits)
                    .map_err(|error| runtime("outfits failed", error))?;
                println!("{encoded}");
                return Ok(());
            }
            if outfits.is_empty() {
                println!("no outfits saved");
                return Ok(());
            }
            for outfit in outfits {
                println!("{}", present_outfit_row(&outfit));
            }
            Ok(())
        }
        Command::OutfitShow { id } => {
            let outfit_id = parse_outfit_id(id)?;
            let items = service
                .resolve_outfit_items(outfit_id)
                .map_err(|error| runtime("outfit show failed", error))?;
            for item in items {
                println!("{}", present_item_row(&item));
            }
            Ok(())
        }
        Command::Favorite { id } => {
            let outfit_id = parse_outfit_id(id)?;
            let outfit = service
                .toggle_outfit_favorite(ToggleOutfitFavoriteCommand { outfit_id })
                .map_err(|error| runtime("favorite failed", error))?;
            println!("{}", present_outfit_row(&outfit));
            Ok(())
        }
        Command::OutfitDelete { id } => {
            let outfit_id = parse_outfit_id(id)?;
            let removed = service
                .delete_outfit(outfit_id)
                .map_err(|error| runtime("outfit delete failed", error))?;
            if !removed {
                return Err(CommandError::Runtime(format!("outfit {id} not found")));
            }
            println!("deleted outfit {id}");
            Ok(())
        }
        Command::Share { id } => {
            let item = require_item(service, id)?;
            let locator = service
                .shareable_locator(&item.image_uri)
                .map_err(|error| runtime("share failed", error))?;
            println!("{locator}");
            Ok(())
        }
        Command::Storage => {
            let bytes = service
                .storage_used_bytes()
                .map_err(|error| runtime("storage failed", error))?;
            let count = service
                .count_clothing_items()
                .map_err(|error| runtime("storage failed", error))?;
            println!("{count} items, {}", present_storage(bytes));
            Ok(())
        }
        Command::CleanCaptures => {
            service
                .clear_captures()
                .map_err(|error| runtime("clean captures failed", error))?;
            println!("capture directory cleared");
            Ok(())
        }
        Command::Reclaim { min_age_secs } => {
            let min_age = min_age_secs
                .map(Duration::from_secs)
                .unwrap_or(config.capture_max_age);
            let reclaimed = service
                .reclaim_orphaned_images(ReclaimOrphanedImagesCommand { min_age })
                .map_err(|error| runtime("reclaim failed", error))?;
            println!("reclaimed {reclaimed} orphaned images");
            Ok(())
        }
    }
}

fn runtime(context: &str, error: ApplicationError) -> CommandError {
    CommandError::Runtime(format!("{context}: {error}"))
}

fn parse_category(raw: &str) -> Result<ClothingCategory, CommandError> {
    raw.parse::<ClothingCategory>()
        .map_err(|error| CommandError::Usage(error.to_string()))
}

fn parse_item_id(raw: i64) -> Result<ItemId, CommandError> {
    ItemId::new(raw).map_err(|error| CommandError::Usage(format!("invalid item id: {error}")))
}

fn parse_outfit_id(raw: i64) -> Result<OutfitId, CommandError> {
    OutfitId::new(raw).map_err(|error| CommandError::Usage(format!("invalid outfit id: {error}")))
}

fn require_item(service: &WardrobeService, raw: i64) -> Result<ClothingItem, CommandError> {
    let item_id = parse_item_id(raw)?;
    service
        .find_clothing_item(item_id)
        .map_err(|error| runtime("lookup failed", error))?
        .ok_or_else(|| CommandError::Runtime(format!("item {raw} not found")))
}
