use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::i18n::LocalizedText;

/// Singleton site settings. At most one row exists remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: Option<i64>,
    pub logo_url: String,
    pub banner_images: Vec<String>,
    pub about_text: LocalizedText,
    pub stage_map_url: Option<String>,
}

/// An upcoming or past concert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: Option<i64>,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub address: String,
    pub ticket_links: Vec<String>,
}

/// A band member, displayed in `order_index` order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<i64>,
    pub name: String,
    pub role: LocalizedText,
    pub description: LocalizedText,
    pub instagram: String,
    pub photos: Vec<String>,
    pub order_index: i32,
}

/// A merchandise item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub description: LocalizedText,
    pub price: Decimal,
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

/// A line of the stage technical rider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalRiderItem {
    pub id: Option<i64>,
    pub name: String,
    pub quantity: i32,
    pub minimum: i32,
    pub alternative: Option<String>,
    pub observations: Option<String>,
    pub photos: Vec<String>,
}

/// A photo album. Owns its photos, kept sorted by `order_index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: Option<i64>,
    pub title: String,
    pub description: LocalizedText,
    pub cover_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub photos: Vec<Photo>,
}

/// A photo belonging to exactly one album.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Option<i64>,
    pub album_id: i64,
    pub url: String,
    pub order_index: i32,
}

/// A published song, listed newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Option<i64>,
    pub title: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A file to upload to object storage.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl AssetFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Extension after the last `.`, if the name has one.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && !ext.contains('/'))
    }
}
