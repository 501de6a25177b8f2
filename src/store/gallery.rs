use bandsite_core::{
    Album, Filter, Photo, Record, StorageError, StorageService, Table, TableService,
};

use super::records::{self, Placement};
use super::BandStore;

impl<S: StorageService> BandStore<S> {
    /// Create an empty album at the top of the gallery.
    pub async fn create_album(&mut self, mut album: Album) -> Option<i64> {
        album.photos.clear();
        records::add(
            self.storage.as_ref(),
            &mut self.albums,
            album,
            Placement::Prepend,
        )
        .await
    }

    /// Persist title, description, and cover. The local photo list of the
    /// album is kept as is.
    pub async fn update_album(&mut self, album: Album) -> bool {
        let Some(id) = album.id else {
            return false;
        };

        let result = match album.encode() {
            Ok(payload) => {
                self.storage
                    .update(Table::Albums, payload, vec![Filter::id(id)])
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::error!("Error updating album {}: {}", id, e);
            return false;
        }

        match self.albums.iter_mut().find(|a| a.id == Some(id)) {
            Some(local) => {
                local.title = album.title;
                local.description = album.description;
                local.cover_url = album.cover_url;
                true
            }
            None => false,
        }
    }

    pub async fn delete_album(&mut self, id: i64) -> bool {
        records::remove(self.storage.as_ref(), &mut self.albums, id).await
    }

    pub async fn clear_albums(&mut self) -> bool {
        records::clear(self.storage.as_ref(), &mut self.albums).await
    }

    /// Insert photos at the end of an album in one batch.
    ///
    /// Order indices continue from the number of photos held locally for the
    /// album. Returns how many photos were added to local state.
    pub async fn add_photos_to_album(&mut self, album_id: i64, urls: Vec<String>) -> usize {
        if urls.is_empty() {
            return 0;
        }

        let start = self.album(album_id).map_or(0, |a| a.photos.len());
        let photos: Option<Vec<Photo>> = urls
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                Some(Photo {
                    id: None,
                    album_id,
                    url,
                    order_index: records::order_index(start.checked_add(i)?)?,
                })
            })
            .collect();
        let Some(photos) = photos else {
            tracing::error!("Too many photos for album {}", album_id);
            return 0;
        };

        let stored = match self.insert_photos(&photos).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Error adding photos to album {}: {}", album_id, e);
                return 0;
            }
        };

        let added = stored.len();
        match self.albums.iter_mut().find(|a| a.id == Some(album_id)) {
            Some(album) => {
                album.photos.extend(stored);
                added
            }
            None => {
                tracing::warn!("Album {} is not loaded; added photos not mirrored", album_id);
                0
            }
        }
    }

    async fn insert_photos(&self, photos: &[Photo]) -> Result<Vec<Photo>, StorageError> {
        let rows = photos
            .iter()
            .map(Record::encode)
            .collect::<Result<Vec<_>, _>>()?;

        self.storage
            .insert(Table::Photos, rows)
            .await?
            .into_iter()
            .map(Photo::decode)
            .collect()
    }

    pub async fn remove_photo(&mut self, photo_id: i64, album_id: i64) -> bool {
        if let Err(e) = self
            .storage
            .delete(Table::Photos, vec![Filter::id(photo_id)])
            .await
        {
            tracing::error!("Error deleting photo {}: {}", photo_id, e);
            return false;
        }

        match self.albums.iter_mut().find(|a| a.id == Some(album_id)) {
            Some(album) => {
                let before = album.photos.len();
                album.photos.retain(|p| p.id != Some(photo_id));
                album.photos.len() != before
            }
            None => false,
        }
    }

    /// Adopt `new_order` as the album's photo order and persist each
    /// position. Does nothing for an album that is not loaded.
    pub async fn reorder_photos(&mut self, album_id: i64, new_order: Vec<Photo>) -> usize {
        let Some(album) = self.albums.iter_mut().find(|a| a.id == Some(album_id)) else {
            return 0;
        };

        records::reorder(self.storage.as_ref(), &mut album.photos, new_order).await
    }
}
