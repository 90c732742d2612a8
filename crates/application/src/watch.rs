use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use wardrobe_domain::{ClothingCategory, ClothingItem, Outfit};

use crate::ApplicationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemQuery {
    All,
    Category(ClothingCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutfitQuery {
    All,
    Favorites,
}

pub type ItemCallback = Box<dyn FnMut(&[ClothingItem]) + Send>;
pub type OutfitCallback = Box<dyn FnMut(&[Outfit]) + Send>;

struct Watcher<Q, C> {
    query: Q,
    callback: C,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    items: BTreeMap<u64, Watcher<ItemQuery, ItemCallback>>,
    outfits: BTreeMap<u64, Watcher<OutfitQuery, OutfitCallback>>,
}

impl Registry {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchKind {
    Items,
    Outfits,
}

/// Live query registrations. Callbacks run on the thread performing the
/// mutation, while the registry lock is held, so they must not subscribe or
/// unsubscribe from inside the callback.
#[derive(Default)]
pub struct WatchHub {
    registry: Arc<Mutex<Registry>>,
}

impl WatchHub {
    pub fn subscribe_items(
        &self,
        query: ItemQuery,
        callback: ItemCallback,
    ) -> Result<Subscription, ApplicationError> {
        let mut registry = self.lock()?;
        let id = registry.allocate_id();
        registry.items.insert(id, Watcher { query, callback });
        Ok(Subscription::new(id, WatchKind::Items, &self.registry))
    }

    pub fn subscribe_outfits(
        &self,
        query: OutfitQuery,
        callback: OutfitCallback,
    ) -> Result<Subscription, ApplicationError> {
        let mut registry = self.lock()?;
        let id = registry.allocate_id();
        registry.outfits.insert(id, Watcher { query, callback });
        Ok(Subscription::new(id, WatchKind::Outfits, &self.registry))
    }

    pub fn notify_items<F>(&self, mut load: F) -> Result<(), ApplicationError>
    where
        F: FnMut(ItemQuery) -> Result<Vec<ClothingItem>, ApplicationError>,
    {
        let mut registry = self.lock()?;
        for watcher in registry.items.values_mut() {
            let snapshot = load(watcher.query)?;
            (watcher.callback)(&snapshot);
        }
        Ok(())
    }

    pub fn notify_outfits<F>(&self, mut load: F) -> Result<(), ApplicationError>
    where
        F: FnMut(OutfitQuery) -> Result<Vec<Outfit>, ApplicationError>,
    {
        let mut registry = self.lock()?;
        for watcher in registry.outfits.values_mut() {
            let snapshot = load(watcher.query)?;
            (watcher.callback)(&snapshot);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Registry>, ApplicationError> {
        self.registry
            .lock()
            .map_err(|_| ApplicationError::Io("watch registry lock poisoned".to_string()))
    }

    #[cfg(test)]
    fn active_watchers(&self) -> usize {
        self.registry
            .lock()
            .map(|registry| registry.items.len() + registry.outfits.len())
            .unwrap_or_default()
    }
}

/// Handle for a live query. Dropping it unsubscribes as well.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    kind: WatchKind,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    fn new(id: u64, kind: WatchKind, registry: &Arc<Mutex<Registry>>) -> Self {
        Self {
            id,
            kind,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    fn release(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Ok(mut registry) = registry.lock() {
            match self.kind {
                WatchKind::Items => {
                    registry.items.remove(&self.id);
                }
                WatchKind::Outfits => {
                    registry.outfits.remove(&self.id);
                }
            }
        }
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
