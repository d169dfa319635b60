//! Shared handle to everything a front end needs.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::cart::CartStore;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::favorites::{FavoritesReconciler, SyncReport};
use crate::orders::{OrderDetails, OrderRecord, OrderRequest};
use crate::session::{self, Credentials, Session};
use crate::storage::{FileStore, KeyValueStore, StorageError};

/// Client state shared by every view.
///
/// Cheap to clone; clones share storage, the API client, the favorites
/// reconciler and the cart. Favorites and cart sit behind async mutexes so
/// concurrent callers are serialized.
#[derive(Clone)]
pub struct ShopContext {
    inner: Arc<ShopContextInner>,
}

struct ShopContextInner {
    config: ClientConfig,
    store: Arc<dyn KeyValueStore>,
    api: ApiClient,
    favorites: Mutex<FavoritesReconciler<ApiClient>>,
    cart: Mutex<CartStore>,
}

impl ShopContext {
    /// Create a context persisting to `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the stored cart
    /// cannot be read.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_store(config, store)
    }

    /// Create a context over an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the stored cart
    /// cannot be read.
    pub fn with_store(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let api = ApiClient::new(&config, Arc::clone(&store))?;
        let favorites = FavoritesReconciler::new(api.clone(), Arc::clone(&store));
        let cart = CartStore::load(Arc::clone(&store))?;

        Ok(Self {
            inner: Arc::new(ShopContextInner {
                config,
                store,
                api,
                favorites: Mutex::new(favorites),
                cart: Mutex::new(cart),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Lock the favorites reconciler.
    pub async fn favorites(&self) -> MutexGuard<'_, FavoritesReconciler<ApiClient>> {
        self.inner.favorites.lock().await
    }

    /// Lock the cart.
    pub async fn cart(&self) -> MutexGuard<'_, CartStore> {
        self.inner.cart.lock().await
    }

    /// Current session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn session(&self) -> std::result::Result<Session, StorageError> {
        Session::load(self.inner.store.as_ref())
    }

    /// Store credentials and push guest favorites to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails. Individual favorites that fail to
    /// sync are counted in the report instead.
    #[instrument(skip(self, credentials), fields(user_id = %credentials.user_id))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SyncReport> {
        session::sign_in(self.inner.store.as_ref(), credentials)?;
        info!("Signed in");

        let mut favorites = self.favorites().await;
        Ok(favorites.sync_local_to_server().await?)
    }

    /// Log in with email and password, then sign in as the returned user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SignInRejected`] when the backend refuses the
    /// credentials, or an error if the request or storage fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<SyncReport> {
        let response = self.inner.api.login(request).await?;
        self.accept(&response).await
    }

    /// Create an account, then sign in as the new user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SignInRejected`] when the backend refuses the
    /// registration, or an error if the request or storage fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<SyncReport> {
        let response = self.inner.api.register(request).await?;
        self.accept(&response).await
    }

    async fn accept(&self, response: &AuthResponse) -> Result<SyncReport> {
        let Some(credentials) = response.credentials() else {
            warn!(reason = %response.reason(), "Backend rejected sign-in");
            return Err(ClientError::SignInRejected(response.reason()));
        };
        self.sign_in(&credentials).await
    }

    /// Place an order for everything in the cart and empty it.
    ///
    /// The cart is left untouched when the order fails.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SignInRequired`] for guests,
    /// [`ClientError::EmptyCart`] when there is nothing to order, or an error
    /// if the request or storage fails.
    #[instrument(skip(self, details))]
    pub async fn checkout(&self, details: OrderDetails) -> Result<OrderRecord> {
        if !self.session()?.is_authenticated() {
            return Err(ClientError::SignInRequired);
        }

        let mut cart = self.cart().await;
        if cart.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        let request = OrderRequest::from_cart(&cart, details);
        let order = self.inner.api.create_order(&request).await?;
        cart.clear()?;

        info!(order_id = ?order.id, total = %request.total_price.display(), "Order placed");
        Ok(order)
    }

    /// Forget credentials and reload guest favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        session::sign_out(self.inner.store.as_ref())?;
        info!("Signed out");

        self.favorites().await.fetch(false).await;
        Ok(())
    }
}
