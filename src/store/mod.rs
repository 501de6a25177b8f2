//! The band content store.
//!
//! [`BandStore`] mirrors the remote tables in memory. Every mutating
//! operation performs its remote call first and updates local state only
//! when that call succeeds; reorders are the exception and apply locally
//! before persisting. Failures are logged, never returned.

mod assets;
mod content;
mod gallery;
mod records;
mod site;

use std::sync::Arc;

use bandsite_core::{
    Album, Member, Order, Product, Select, Show, SiteConfig, Song, StorageError, StorageService,
    Table, TechnicalRiderItem,
};

use records::fetch;

/// In-memory mirror of the site content, synchronized with remote storage.
pub struct BandStore<S: StorageService> {
    storage: Arc<S>,
    asset_bucket: String,
    config: SiteConfig,
    shows: Vec<Show>,
    members: Vec<Member>,
    products: Vec<Product>,
    albums: Vec<Album>,
    songs: Vec<Song>,
    technical_rider: Vec<TechnicalRiderItem>,
    is_loading: bool,
    error: Option<String>,
}

impl<S: StorageService> BandStore<S> {
    /// Create an empty store. No remote calls are made until
    /// [`initialize`](Self::initialize) or a load is called.
    pub fn new(storage: Arc<S>, asset_bucket: impl Into<String>) -> Self {
        Self {
            storage,
            asset_bucket: asset_bucket.into(),
            config: SiteConfig::default(),
            shows: Vec::new(),
            members: Vec::new(),
            products: Vec::new(),
            albums: Vec::new(),
            songs: Vec::new(),
            technical_rider: Vec::new(),
            is_loading: false,
            error: None,
        }
    }

    /// Load every collection, then the gallery.
    pub async fn initialize(&mut self) {
        self.load_all().await;
        self.load_gallery().await;
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn album(&self, id: i64) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == Some(id))
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn technical_rider(&self) -> &[TechnicalRiderItem] {
        &self.technical_rider
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed [`load_all`](Self::load_all), if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reload site config, shows, members, products, songs, and the
    /// technical rider. A failure is recorded in [`error`](Self::error).
    pub async fn load_all(&mut self) {
        self.is_loading = true;
        self.error = None;

        if let Err(e) = self.fetch_all().await {
            tracing::error!("Error fetching data: {}", e);
            self.error = Some(e.to_string());
        }

        self.is_loading = false;
    }

    async fn fetch_all(&mut self) -> Result<(), StorageError> {
        let storage = self.storage.as_ref();

        let config: Vec<SiteConfig> =
            fetch(storage, Select::from(Table::SiteConfig).single()).await?;
        if let Some(config) = config.into_iter().next() {
            self.config = config;
        }

        self.shows = fetch(storage, Select::from(Table::Shows).order(Order::asc("date"))).await?;

        self.members = fetch(
            storage,
            Select::from(Table::Members).order(Order::asc("order_index")),
        )
        .await?;

        self.products = fetch(
            storage,
            Select::from(Table::Products).order(Order::asc("id")),
        )
        .await?;

        self.songs = fetch(
            storage,
            Select::from(Table::Songs).order(Order::desc("created_at")),
        )
        .await?;

        self.technical_rider = fetch(
            storage,
            Select::from(Table::TechnicalRider).order(Order::asc("name")),
        )
        .await?;

        tracing::info!(
            "Loaded {} shows, {} members, {} products, {} songs, {} rider items",
            self.shows.len(),
            self.members.len(),
            self.products.len(),
            self.songs.len(),
            self.technical_rider.len()
        );
        Ok(())
    }

    /// Reload albums with their photos. Failures are only logged.
    pub async fn load_gallery(&mut self) {
        if let Err(e) = self.fetch_gallery().await {
            tracing::error!("Error fetching gallery: {}", e);
        }
    }

    async fn fetch_gallery(&mut self) -> Result<(), StorageError> {
        self.albums = fetch(
            self.storage.as_ref(),
            Select::from(Table::Albums)
                .embed(Table::Photos, "album_id")
                .order(Order::desc("created_at")),
        )
        .await?;

        tracing::info!("Loaded {} albums", self.albums.len());
        Ok(())
    }
}
