pub mod config;
pub mod store;

pub use config::{Config, ConfigError};
pub use store::BandStore;

pub use bandsite_core::{
    localized, Album, AssetFile, Decimal, LocalizedText, Member, Photo, Product, Show,
    SiteConfig, Song, StorageService, TechnicalRiderItem,
};
pub use bandsite_remote::SupabaseClient;
