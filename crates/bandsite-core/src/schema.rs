//! Mapping between local entities and remote rows.
//!
//! Each entity has a `Row` type describing what the remote returns and a
//! borrowing `Payload` type describing what inserts and updates send. Rows
//! tolerate null or missing columns; payloads never carry `id` or
//! `created_at`, which the remote assigns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Album, Member, Photo, Product, Show, SiteConfig, Song, TechnicalRiderItem};
use crate::error::StorageError;
use crate::i18n::LocalizedText;
use crate::query::Table;

/// An entity persisted in one remote table.
pub trait Record: Clone + Send + Sync {
    const TABLE: Table;

    /// Columns the store maintains itself. They are written on insert and
    /// left out of update patches.
    const MANAGED_COLUMNS: &'static [&'static str] = &[];

    type Row: DeserializeOwned;
    type Payload<'a>: Serialize
    where
        Self: 'a;

    fn id(&self) -> Option<i64>;

    fn from_row(row: Self::Row) -> Self;

    fn payload(&self) -> Self::Payload<'_>;

    /// Take over the columns the remote assigned on insert.
    fn assign(&mut self, inserted: &Inserted);

    fn decode(row: Value) -> Result<Self, StorageError> {
        serde_json::from_value::<Self::Row>(row)
            .map(Self::from_row)
            .map_err(|e| StorageError::decode(Self::TABLE.as_str(), e))
    }

    fn encode(&self) -> Result<Value, StorageError> {
        serde_json::to_value(self.payload())
            .map_err(|e| StorageError::decode(Self::TABLE.as_str(), e))
    }

    /// Patch for updating an existing row: the insert payload without
    /// [`MANAGED_COLUMNS`](Self::MANAGED_COLUMNS).
    fn encode_update(&self) -> Result<Value, StorageError> {
        let mut patch = self.encode()?;
        if let Some(fields) = patch.as_object_mut() {
            for column in Self::MANAGED_COLUMNS {
                fields.remove(*column);
            }
        }
        Ok(patch)
    }
}

/// A record displayed in a dense, zero-based `order_index` sequence.
pub trait Ordered: Record {
    fn order_index(&self) -> i32;

    fn set_order_index(&mut self, index: i32);
}

/// Server-assigned columns of a freshly inserted row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Inserted {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Inserted {
    pub fn decode(table: Table, row: Value) -> Result<Self, StorageError> {
        serde_json::from_value(row).map_err(|e| StorageError::decode(table.as_str(), e))
    }
}

// --- site_config ---

#[derive(Debug, Deserialize)]
pub struct SiteConfigRow {
    pub id: Option<i64>,
    pub logo_url: Option<String>,
    pub banner_images: Option<Vec<String>>,
    pub about_text: Option<LocalizedText>,
    pub stage_map_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SiteConfigPayload<'a> {
    pub logo_url: &'a str,
    pub about_text: &'a LocalizedText,
    pub banner_images: &'a [String],
    pub stage_map_url: Option<&'a str>,
}

impl Record for SiteConfig {
    const TABLE: Table = Table::SiteConfig;
    type Row = SiteConfigRow;
    type Payload<'a> = SiteConfigPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: SiteConfigRow) -> Self {
        Self {
            id: row.id,
            logo_url: row.logo_url.unwrap_or_default(),
            banner_images: row.banner_images.unwrap_or_default(),
            about_text: row.about_text.unwrap_or_default(),
            stage_map_url: row.stage_map_url,
        }
    }

    fn payload(&self) -> SiteConfigPayload<'_> {
        SiteConfigPayload {
            logo_url: &self.logo_url,
            about_text: &self.about_text,
            banner_images: &self.banner_images,
            stage_map_url: self.stage_map_url.as_deref(),
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
    }
}

// --- shows ---

#[derive(Debug, Deserialize)]
pub struct ShowRow {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub ticket_links: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ShowPayload<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub venue: &'a str,
    pub address: &'a str,
    pub ticket_links: &'a [String],
}

impl Record for Show {
    const TABLE: Table = Table::Shows;
    type Row = ShowRow;
    type Payload<'a> = ShowPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: ShowRow) -> Self {
        Self {
            id: row.id,
            date: row.date.unwrap_or_default(),
            time: row.time.unwrap_or_default(),
            venue: row.venue.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            ticket_links: row.ticket_links.unwrap_or_default(),
        }
    }

    fn payload(&self) -> ShowPayload<'_> {
        ShowPayload {
            date: &self.date,
            time: &self.time,
            venue: &self.venue,
            address: &self.address,
            ticket_links: &self.ticket_links,
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
    }
}

// --- members ---

#[derive(Debug, Deserialize)]
pub struct MemberRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub role: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub instagram: Option<String>,
    pub photos: Option<Vec<String>>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MemberPayload<'a> {
    pub name: &'a str,
    pub role: &'a LocalizedText,
    pub description: &'a LocalizedText,
    pub instagram: &'a str,
    pub photos: &'a [String],
    pub order_index: i32,
}

impl Record for Member {
    const TABLE: Table = Table::Members;
    const MANAGED_COLUMNS: &'static [&'static str] = &["order_index"];
    type Row = MemberRow;
    type Payload<'a> = MemberPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: MemberRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            role: row.role.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            instagram: row.instagram.unwrap_or_default(),
            photos: row.photos.unwrap_or_default(),
            order_index: row.order_index.unwrap_or_default(),
        }
    }

    fn payload(&self) -> MemberPayload<'_> {
        MemberPayload {
            name: &self.name,
            role: &self.role,
            description: &self.description,
            instagram: &self.instagram,
            photos: &self.photos,
            order_index: self.order_index,
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
    }
}

impl Ordered for Member {
    fn order_index(&self) -> i32 {
        self.order_index
    }

    fn set_order_index(&mut self, index: i32) {
        self.order_index = index;
    }
}

// --- products ---

#[derive(Debug, Deserialize)]
pub struct ProductRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<LocalizedText>,
    pub price: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProductPayload<'a> {
    pub name: &'a str,
    pub description: &'a LocalizedText,
    pub price: Decimal,
    pub images: &'a [String],
    pub colors: &'a [String],
    pub sizes: &'a [String],
}

impl Record for Product {
    const TABLE: Table = Table::Products;
    type Row = ProductRow;
    type Payload<'a> = ProductPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            price: row.price.unwrap_or_default(),
            images: row.images.unwrap_or_default(),
            colors: row.colors.unwrap_or_default(),
            sizes: row.sizes.unwrap_or_default(),
        }
    }

    fn payload(&self) -> ProductPayload<'_> {
        ProductPayload {
            name: &self.name,
            description: &self.description,
            price: self.price,
            images: &self.images,
            colors: &self.colors,
            sizes: &self.sizes,
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
    }
}

// --- technical_rider ---

#[derive(Debug, Deserialize)]
pub struct TechnicalRiderRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub minimum: Option<i32>,
    pub alternative: Option<String>,
    pub observations: Option<String>,
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct TechnicalRiderPayload<'a> {
    pub name: &'a str,
    pub quantity: i32,
    pub minimum: i32,
    pub alternative: Option<&'a str>,
    pub observations: Option<&'a str>,
    pub photos: &'a [String],
}

impl Record for TechnicalRiderItem {
    const TABLE: Table = Table::TechnicalRider;
    type Row = TechnicalRiderRow;
    type Payload<'a> = TechnicalRiderPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: TechnicalRiderRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            quantity: row.quantity.unwrap_or_default(),
            minimum: row.minimum.unwrap_or_default(),
            alternative: row.alternative,
            observations: row.observations,
            photos: row.photos.unwrap_or_default(),
        }
    }

    fn payload(&self) -> TechnicalRiderPayload<'_> {
        TechnicalRiderPayload {
            name: &self.name,
            quantity: self.quantity,
            minimum: self.minimum,
            alternative: self.alternative.as_deref(),
            observations: self.observations.as_deref(),
            photos: &self.photos,
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
    }
}

// --- songs ---

#[derive(Debug, Deserialize)]
pub struct SongRow {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SongPayload<'a> {
    pub title: &'a str,
    pub url: &'a str,
}

impl Record for Song {
    const TABLE: Table = Table::Songs;
    type Row = SongRow;
    type Payload<'a> = SongPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: SongRow) -> Self {
        Self {
            id: row.id,
            title: row.title.unwrap_or_default(),
            url: row.url.unwrap_or_default(),
            created_at: row.created_at,
        }
    }

    fn payload(&self) -> SongPayload<'_> {
        SongPayload {
            title: &self.title,
            url: &self.url,
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
        self.created_at = inserted.created_at;
    }
}

// --- albums / photos ---

#[derive(Debug, Deserialize)]
pub struct PhotoRow {
    pub id: Option<i64>,
    pub album_id: Option<i64>,
    pub url: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PhotoPayload<'a> {
    pub album_id: i64,
    pub url: &'a str,
    pub order_index: i32,
}

impl Record for Photo {
    const TABLE: Table = Table::Photos;
    type Row = PhotoRow;
    type Payload<'a> = PhotoPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: PhotoRow) -> Self {
        Self {
            id: row.id,
            album_id: row.album_id.unwrap_or_default(),
            url: row.url.unwrap_or_default(),
            order_index: row.order_index.unwrap_or_default(),
        }
    }

    fn payload(&self) -> PhotoPayload<'_> {
        PhotoPayload {
            album_id: self.album_id,
            url: &self.url,
            order_index: self.order_index,
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
    }
}

impl Ordered for Photo {
    fn order_index(&self) -> i32 {
        self.order_index
    }

    fn set_order_index(&mut self, index: i32) {
        self.order_index = index;
    }
}

#[derive(Debug, Deserialize)]
pub struct AlbumRow {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<LocalizedText>,
    pub cover_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub photos: Option<Vec<PhotoRow>>,
}

#[derive(Debug, Serialize)]
pub struct AlbumPayload<'a> {
    pub title: &'a str,
    pub description: &'a LocalizedText,
    pub cover_url: &'a str,
}

impl Record for Album {
    const TABLE: Table = Table::Albums;
    type Row = AlbumRow;
    type Payload<'a> = AlbumPayload<'a>;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn from_row(row: AlbumRow) -> Self {
        let mut photos: Vec<Photo> = row
            .photos
            .unwrap_or_default()
            .into_iter()
            .map(Photo::from_row)
            .collect();
        photos.sort_by_key(|p| p.order_index);

        Self {
            id: row.id,
            title: row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            cover_url: row.cover_url.unwrap_or_default(),
            created_at: row.created_at,
            photos,
        }
    }

    fn payload(&self) -> AlbumPayload<'_> {
        AlbumPayload {
            title: &self.title,
            description: &self.description,
            cover_url: &self.cover_url,
        }
    }

    fn assign(&mut self, inserted: &Inserted) {
        self.id = Some(inserted.id);
        self.created_at = inserted.created_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_show_payload_renames_ticket_links() {
        let show = Show {
            id: Some(9),
            date: "2024-05-01".to_string(),
            ticket_links: vec!["http://x".to_string()],
            ..Default::default()
        };

        let payload = show.encode().unwrap();
        assert_eq!(payload["ticket_links"], json!(["http://x"]));
        assert!(payload.get("id").is_none());
    }

    #[test]
    fn test_null_lists_default_to_empty() {
        let product = Product::decode(json!({
            "id": 1,
            "name": "Shirt",
            "price": "25.50",
            "images": null,
        }))
        .unwrap();

        assert!(product.images.is_empty());
        assert!(product.colors.is_empty());
        assert!(product.sizes.is_empty());
        assert_eq!(product.price, Decimal::new(2550, 2));
    }

    #[test]
    fn test_price_from_number() {
        let product = Product::decode(json!({"id": 1, "price": 19.9})).unwrap();
        assert_eq!(product.price, Decimal::new(199, 1));
    }

    #[test]
    fn test_config_row_mapping() {
        let config = SiteConfig::decode(json!({
            "id": 1,
            "logo_url": "logo.png",
            "about_text": {"pt": "Sobre", "en": "About"},
            "banner_images": ["a.jpg"],
        }))
        .unwrap();

        assert_eq!(config.logo_url, "logo.png");
        assert_eq!(config.banner_images, vec!["a.jpg".to_string()]);
        assert_eq!(config.about_text.get("en"), "About");
        assert!(config.stage_map_url.is_none());
    }

    #[test]
    fn test_album_photos_sorted_by_order_index() {
        let album = Album::decode(json!({
            "id": 4,
            "title": "Tour",
            "photos": [
                {"id": 2, "album_id": 4, "url": "b", "order_index": 1},
                {"id": 1, "album_id": 4, "url": "a", "order_index": 0},
                {"id": 3, "album_id": 4, "url": "c", "order_index": null},
            ],
        }))
        .unwrap();

        let urls: Vec<_> = album.photos.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_decoded_row_keeps_locale_order() {
        let row: Value = serde_json::from_str(
            r#"{"id": 1, "title": "t", "description": {"fr": "c", "de": "d"}}"#,
        )
        .unwrap();

        let album = Album::decode(row).unwrap();

        assert_eq!(album.description.get("es"), "c");
    }

    #[test]
    fn test_member_update_patch_leaves_order_index_out() {
        let member = Member {
            id: Some(3),
            name: "Carla".to_string(),
            order_index: 2,
            ..Default::default()
        };

        assert_eq!(member.encode().unwrap()["order_index"], 2);
        let patch = member.encode_update().unwrap();
        assert!(patch.get("order_index").is_none());
        assert_eq!(patch["name"], "Carla");
    }

    #[test]
    fn test_song_payload_skips_created_at() {
        let song = Song {
            title: "Intro".to_string(),
            url: "http://s".to_string(),
            ..Default::default()
        };
        assert_eq!(song.encode().unwrap(), json!({"title": "Intro", "url": "http://s"}));
    }

    #[test]
    fn test_assign_inserted() {
        let mut song = Song::default();
        let inserted = Inserted::decode(
            Table::Songs,
            json!({"id": 12, "created_at": "2024-01-01T10:00:00+00:00", "title": "x"}),
        )
        .unwrap();
        song.assign(&inserted);

        assert_eq!(song.id, Some(12));
        assert!(song.created_at.is_some());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let err = Show::decode(json!({"id": "not a number"})).unwrap_err();
        assert!(matches!(err, StorageError::Decode { table: "shows", .. }));
    }
}
