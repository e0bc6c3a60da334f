use std::sync::Arc;
use std::sync::Mutex;

use dashmap::DashMap;

use printdesk_core::Order;
use printdesk_store::{OrderStore, StoreError};

/// Cached order listings for open views.
///
/// A listing is served from cache until something invalidates it; the
/// next read after invalidation re-fetches from the store. Concurrent
/// invalidation and refresh can race, costing at most a redundant fetch —
/// both paths are read-only and converge on the store's state.
pub struct ListingCache {
    store: Arc<dyn OrderStore>,
    admin: Mutex<Option<Vec<Order>>>,
    users: DashMap<String, Vec<Order>>,
}

impl ListingCache {
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            admin: Mutex::new(None),
            users: DashMap::new(),
        }
    }

    /// The administrative "all orders" view, newest first.
    pub async fn admin_orders(&self) -> Result<Vec<Order>, StoreError> {
        if let Some(cached) = self.admin.lock().expect("cache lock poisoned").clone() {
            return Ok(cached);
        }
        let fresh = self.store.list_all().await?;
        *self.admin.lock().expect("cache lock poisoned") = Some(fresh.clone());
        Ok(fresh)
    }

    /// One user's "my orders" view, newest first.
    pub async fn user_orders(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        if let Some(cached) = self.users.get(user_id) {
            return Ok(cached.clone());
        }
        let fresh = self.store.list_by_user(user_id).await?;
        self.users.insert(user_id.to_owned(), fresh.clone());
        Ok(fresh)
    }

    /// Drop every cached listing; the next read of each view re-fetches.
    pub fn invalidate_all(&self) {
        *self.admin.lock().expect("cache lock poisoned") = None;
        self.users.clear();
    }
}
