//! Favorites reconciler.
//!
//! Keeps one in-memory favorites list that mirrors either the server (signed
//! in) or local storage (guest). The list is never authoritative on its own:
//! every fetch re-derives it from one of the two sources.
//!
//! # Modes
//!
//! - **Guest** - favorites live in local storage under `localFavorites` and
//!   carry [`FavoriteKey::Local`] keys. Toggling asks the user to sign in.
//! - **Signed in** - favorites live on the server and carry
//!   [`FavoriteKey::Remote`] keys. Toggles update the caller's product card
//!   optimistically and roll back on failure.
//!
//! When a guest signs in, [`FavoritesReconciler::sync_local_to_server`] pushes
//! the local favorites to the server one at a time and then reloads from it.
//!
//! # Failure handling
//!
//! Fetches never fail: errors are logged and the cached list is kept.
//! Mutations roll back their optimistic changes and return the error.

mod backend;
mod merge;

pub use backend::FavoritesBackend;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use cookie_shop_core::{
    FavoriteId, FavoriteItem, FavoriteKey, LocalFavoriteItem, Product, ProductId,
};

use crate::api::{ApiError, FavoriteRecord};
use crate::session;
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Errors returned by favorites mutations.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend accepted the favorite but returned no id for it.
    #[error("server response is missing the favorite id")]
    MissingFavoriteId,

    /// The key does not identify a favorite in the current mode.
    #[error("unknown favorite: {0}")]
    UnknownFavorite(FavoriteKey),
}

/// A product as shown in a listing, with its favorite state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub product: Product,
    pub is_favorite: bool,
    pub favorite_id: Option<FavoriteId>,
}

impl ProductCard {
    /// A card for a product that is not a favorite.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            is_favorite: false,
            favorite_id: None,
        }
    }

    /// A card whose favorite state is taken from `favorites`.
    #[must_use]
    pub fn from_favorites(product: Product, favorites: &[FavoriteItem]) -> Self {
        let existing = favorites.iter().find(|f| f.product_id() == product.id);
        Self {
            is_favorite: existing.is_some(),
            favorite_id: existing.and_then(|f| f.key.remote_id()),
            product,
        }
    }
}

/// Result of [`FavoritesReconciler::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The product was favorited on the server.
    Added(FavoriteId),
    /// The favorite was deleted on the server.
    Removed,
    /// The card is marked favorite but has no server id; nothing was sent.
    Unchanged,
    /// The session is a guest session; the caller should prompt for sign-in.
    SignInRequired,
}

/// Outcome of pushing guest favorites to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
}

/// Reconciles the in-memory favorites list with its backing store.
pub struct FavoritesReconciler<B> {
    backend: B,
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<FavoriteItem>,
}

impl<B: FavoritesBackend> FavoritesReconciler<B> {
    /// Create a reconciler with an empty list. Call [`fetch`](Self::fetch) to
    /// populate it.
    #[must_use]
    pub fn new(backend: B, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            store,
            favorites: Vec::new(),
        }
    }

    /// The current favorites list.
    #[must_use]
    pub fn favorites(&self) -> &[FavoriteItem] {
        &self.favorites
    }

    /// The server backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn is_authenticated(&self) -> bool {
        session::is_authenticated(self.store.as_ref())
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Re-derive the list from its backing store.
    ///
    /// Guests reload from local storage. Signed-in users reload from the
    /// server. A server list shorter than the cached one never overwrites it:
    /// a non-forced fetch merges the two, a forced fetch keeps the cached
    /// list unless the server returned nothing at all. Failures keep the
    /// cached list.
    #[instrument(skip(self))]
    pub async fn fetch(&mut self, force: bool) -> &[FavoriteItem] {
        if !self.is_authenticated() {
            match self.load_local() {
                Ok(local) => self.replace_with_local(local),
                Err(e) => warn!(error = %e, "Failed to read local favorites, keeping cached list"),
            }
            return &self.favorites;
        }

        match self.backend.list_favorites().await {
            Ok(records) => self.reconcile(into_items(records), force),
            Err(e) => warn!(
                error = %e,
                cached = self.favorites.len(),
                "Failed to fetch favorites, keeping cached list"
            ),
        }

        &self.favorites
    }

    fn reconcile(&mut self, server: Vec<FavoriteItem>, force: bool) {
        if server.len() < self.favorites.len() {
            if force && server.is_empty() {
                debug!(
                    cached = self.favorites.len(),
                    "Forced fetch returned no favorites, clearing"
                );
                self.favorites.clear();
            } else if force {
                warn!(
                    server = server.len(),
                    cached = self.favorites.len(),
                    "Forced fetch returned fewer favorites than cached, keeping cached list"
                );
            } else {
                warn!(
                    server = server.len(),
                    cached = self.favorites.len(),
                    "Server returned fewer favorites than cached, merging"
                );
                self.favorites = merge::union_merge(server, &self.favorites);
            }
        } else if force || self.favorites != server {
            debug!(count = server.len(), "Replacing favorites with server list");
            self.favorites = server;
        }
    }

    // =========================================================================
    // Toggle / Remove / Clear
    // =========================================================================

    /// Flip a product's favorite state.
    ///
    /// Guests get [`ToggleOutcome::SignInRequired`] and nothing changes. For
    /// signed-in users the card is updated before the server call and
    /// restored if anything fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the server call fails or its response has no id.
    #[instrument(skip(self, card), fields(product_id = %card.product.id))]
    pub async fn toggle(&mut self, card: &mut ProductCard) -> Result<ToggleOutcome, FavoritesError> {
        if !self.is_authenticated() {
            return Ok(ToggleOutcome::SignInRequired);
        }

        let was_favorite = card.is_favorite;
        let previous_id = card.favorite_id;

        let result = self.toggle_signed_in(card).await;
        if let Err(e) = &result {
            card.is_favorite = was_favorite;
            card.favorite_id = previous_id;
            error!(error = %e, "Failed to update favorite");
        }
        result
    }

    async fn toggle_signed_in(
        &mut self,
        card: &mut ProductCard,
    ) -> Result<ToggleOutcome, FavoritesError> {
        if !card.is_favorite {
            card.is_favorite = true;

            let record = self.backend.add_favorite(card.product.id).await?;
            let Some(id) = record.id else {
                card.is_favorite = false;
                return Err(FavoritesError::MissingFavoriteId);
            };
            card.favorite_id = Some(id);

            if let Some(product) = record.product {
                let item = FavoriteItem::remote(id, product);
                if !merge::contains(&self.favorites, &item) {
                    self.favorites.push(item);
                }
            } else {
                debug!("Add response has no product, refreshing favorites");
                self.fetch(false).await;
            }

            return Ok(ToggleOutcome::Added(id));
        }

        let Some(id) = card.favorite_id else {
            return Ok(ToggleOutcome::Unchanged);
        };

        card.is_favorite = false;
        card.favorite_id = None;
        self.remove(FavoriteKey::Remote(id)).await?;

        Ok(ToggleOutcome::Removed)
    }

    /// Delete one favorite.
    ///
    /// Guests delete the local record. Signed-in users delete on the server
    /// and the list is only updated after the server confirms.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be resolved, the server call fails,
    /// or local storage cannot be written.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn remove(&mut self, key: FavoriteKey) -> Result<(), FavoritesError> {
        if !self.is_authenticated() {
            let product_id = self
                .local_product_for(key)
                .ok_or(FavoritesError::UnknownFavorite(key))?;
            return self.remove_from_local(product_id);
        }

        let id = self
            .remote_id_for(key)
            .ok_or(FavoritesError::UnknownFavorite(key))?;

        if let Err(e) = self.backend.remove_favorite(id).await {
            error!(error = %e, "Failed to remove favorite");
            return Err(e.into());
        }

        self.favorites.retain(|f| f.key != FavoriteKey::Remote(id));
        Ok(())
    }

    /// Delete every favorite.
    ///
    /// If the server call fails the list is refetched before the error is
    /// returned, so it reflects whatever the server still holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the server call fails or local storage cannot be
    /// written.
    #[instrument(skip(self))]
    pub async fn clear_all(&mut self) -> Result<(), FavoritesError> {
        if !self.is_authenticated() {
            self.store.remove_item(keys::LOCAL_FAVORITES)?;
            self.favorites.clear();
            return Ok(());
        }

        match self.backend.clear_favorites().await {
            Ok(()) => {
                self.favorites.clear();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to clear favorites, resynchronizing");
                self.fetch(false).await;
                Err(e.into())
            }
        }
    }

    fn local_product_for(&self, key: FavoriteKey) -> Option<ProductId> {
        match key {
            FavoriteKey::Local(product_id) => Some(product_id),
            FavoriteKey::Remote(_) => self
                .favorites
                .iter()
                .find(|f| f.key == key)
                .map(FavoriteItem::product_id),
        }
    }

    fn remote_id_for(&self, key: FavoriteKey) -> Option<FavoriteId> {
        match key {
            FavoriteKey::Remote(id) => Some(id),
            FavoriteKey::Local(product_id) => self
                .favorites
                .iter()
                .find(|f| f.product_id() == product_id)
                .and_then(|f| f.key.remote_id()),
        }
    }

    // =========================================================================
    // Guest storage
    // =========================================================================

    /// Add a product to the guest favorites in local storage.
    ///
    /// Adding a product that is already stored is a no-op. In guest mode the
    /// list is rebuilt from storage afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be read or written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_local(&mut self, product: Product) -> Result<(), FavoritesError> {
        let mut local = self.load_local()?;
        if !local.iter().any(|item| item.product_id == product.id) {
            local.push(LocalFavoriteItem::from(product));
            self.save_local(&local)?;
        }
        self.rebuild_if_guest(local);
        Ok(())
    }

    /// Remove a product from the guest favorites in local storage.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be read or written.
    #[instrument(skip(self))]
    pub fn remove_from_local(&mut self, product_id: ProductId) -> Result<(), FavoritesError> {
        let mut local = self.load_local()?;
        local.retain(|item| item.product_id != product_id);
        self.save_local(&local)?;
        self.rebuild_if_guest(local);
        Ok(())
    }

    /// Push guest favorites to the server after sign-in.
    ///
    /// Items are sent one at a time; a failed item is logged and skipped.
    /// Local storage is then cleared regardless of failures and one forced
    /// fetch reloads the list from the server. Does nothing for a guest.
    ///
    /// # Errors
    ///
    /// Returns an error only if local storage cannot be read.
    #[instrument(skip(self))]
    pub async fn sync_local_to_server(&mut self) -> Result<SyncReport, FavoritesError> {
        if !self.is_authenticated() {
            warn!("Cannot sync local favorites without a signed-in session");
            return Ok(SyncReport::default());
        }

        let local = self.load_local()?;
        let mut report = SyncReport {
            attempted: local.len(),
            ..SyncReport::default()
        };

        for item in &local {
            match self.backend.add_favorite(item.product_id).await {
                Ok(_) => report.synced += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        product_id = %item.product_id,
                        error = %e,
                        "Failed to sync local favorite, skipping"
                    );
                }
            }
        }

        if let Err(e) = self.store.remove_item(keys::LOCAL_FAVORITES) {
            warn!(error = %e, "Failed to clear local favorites after sync");
        }

        // Guest entries lost their backing store; the server list replaces them.
        self.favorites.retain(|f| matches!(f.key, FavoriteKey::Remote(_)));
        self.fetch(true).await;

        info!(
            attempted = report.attempted,
            synced = report.synced,
            failed = report.failed,
            "Synced local favorites to server"
        );
        Ok(report)
    }

    fn load_local(&self) -> Result<Vec<LocalFavoriteItem>, StorageError> {
        Ok(storage::load_json(self.store.as_ref(), keys::LOCAL_FAVORITES)?.unwrap_or_default())
    }

    fn save_local(&self, local: &[LocalFavoriteItem]) -> Result<(), StorageError> {
        storage::save_json(self.store.as_ref(), keys::LOCAL_FAVORITES, local)
    }

    fn rebuild_if_guest(&mut self, local: Vec<LocalFavoriteItem>) {
        if !self.is_authenticated() {
            self.replace_with_local(local);
        }
    }

    fn replace_with_local(&mut self, local: Vec<LocalFavoriteItem>) {
        self.favorites = local.into_iter().map(FavoriteItem::from).collect();
    }
}

/// Convert server records, skipping any without an id or product.
fn into_items(records: Vec<FavoriteRecord>) -> Vec<FavoriteItem> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id;
            let item = record.into_item();
            if item.is_none() {
                warn!(favorite_id = ?id, "Skipping favorite without id or product");
            }
            item
        })
        .collect()
}
