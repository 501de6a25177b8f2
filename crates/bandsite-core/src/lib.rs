//! Bandsite Core - Entity models, remote schema mapping, and storage traits.
//!
//! This crate contains the domain types for the band site content store and
//! the contract its storage backend has to fulfil. It has no dependencies on
//! other Bandsite crates.

pub mod entity;
pub mod error;
pub mod i18n;
pub mod query;
pub mod schema;
pub mod storage;

// Re-exports for convenience
pub use entity::{
    Album, AssetFile, Member, Photo, Product, Show, SiteConfig, Song, TechnicalRiderItem,
};
pub use error::StorageError;
pub use i18n::{localized, LocalizedText};
pub use query::{Embed, Filter, Order, Select, Table};
pub use schema::{Inserted, Ordered, Record};
pub use storage::{ObjectStorage, StorageService, TableService};

pub use chrono::{DateTime, Utc};
pub use rust_decimal::Decimal;

#[cfg(any(test, feature = "test-utils"))]
pub use storage::memory::{MemoryStorage, Operation, StorageCall};
