use bandsite_core::{Member, Product, Show, Song, StorageService, TechnicalRiderItem};

use super::records::{self, Placement};
use super::BandStore;

impl<S: StorageService> BandStore<S> {
    // --- Shows ---

    /// Insert a show. Returns the remote-assigned id on success.
    pub async fn add_show(&mut self, show: Show) -> Option<i64> {
        records::add(self.storage.as_ref(), &mut self.shows, show, Placement::Append).await
    }

    pub async fn remove_show(&mut self, id: i64) -> bool {
        records::remove(self.storage.as_ref(), &mut self.shows, id).await
    }

    pub async fn update_show(&mut self, show: Show) -> bool {
        records::update(self.storage.as_ref(), &mut self.shows, show).await
    }

    pub async fn clear_shows(&mut self) -> bool {
        records::clear(self.storage.as_ref(), &mut self.shows).await
    }

    // --- Members ---

    /// Insert a member at the end of the current order.
    pub async fn add_member(&mut self, mut member: Member) -> Option<i64> {
        let Some(index) = records::order_index(self.members.len()) else {
            tracing::error!("Member list is full at {} entries", self.members.len());
            return None;
        };
        member.order_index = index;
        records::add(
            self.storage.as_ref(),
            &mut self.members,
            member,
            Placement::Append,
        )
        .await
    }

    pub async fn remove_member(&mut self, id: i64) -> bool {
        records::remove(self.storage.as_ref(), &mut self.members, id).await
    }

    /// Update a member's details. The position is only changed by
    /// [`reorder_members`](Self::reorder_members); the loaded index is kept.
    pub async fn update_member(&mut self, mut member: Member) -> bool {
        let loaded = member.id.and_then(|id| self.members.iter().find(|m| m.id == Some(id)));
        if let Some(local) = loaded {
            member.order_index = local.order_index;
        }
        records::update(self.storage.as_ref(), &mut self.members, member).await
    }

    /// Adopt `new_order` locally and persist each member's position.
    /// Returns how many positions were written before the first failure.
    pub async fn reorder_members(&mut self, new_order: Vec<Member>) -> usize {
        records::reorder(self.storage.as_ref(), &mut self.members, new_order).await
    }

    pub async fn clear_members(&mut self) -> bool {
        records::clear(self.storage.as_ref(), &mut self.members).await
    }

    // --- Products ---

    pub async fn add_product(&mut self, product: Product) -> Option<i64> {
        records::add(
            self.storage.as_ref(),
            &mut self.products,
            product,
            Placement::Append,
        )
        .await
    }

    pub async fn remove_product(&mut self, id: i64) -> bool {
        records::remove(self.storage.as_ref(), &mut self.products, id).await
    }

    pub async fn update_product(&mut self, product: Product) -> bool {
        records::update(self.storage.as_ref(), &mut self.products, product).await
    }

    pub async fn clear_products(&mut self) -> bool {
        records::clear(self.storage.as_ref(), &mut self.products).await
    }

    // --- Songs ---

    /// Insert a song at the top of the list (newest first).
    pub async fn add_song(&mut self, song: Song) -> Option<i64> {
        records::add(self.storage.as_ref(), &mut self.songs, song, Placement::Prepend).await
    }

    pub async fn remove_song(&mut self, id: i64) -> bool {
        records::remove(self.storage.as_ref(), &mut self.songs, id).await
    }

    pub async fn update_song(&mut self, song: Song) -> bool {
        records::update(self.storage.as_ref(), &mut self.songs, song).await
    }

    pub async fn clear_songs(&mut self) -> bool {
        records::clear(self.storage.as_ref(), &mut self.songs).await
    }

    // --- Technical rider ---

    pub async fn add_rider_item(&mut self, item: TechnicalRiderItem) -> Option<i64> {
        records::add(
            self.storage.as_ref(),
            &mut self.technical_rider,
            item,
            Placement::Append,
        )
        .await
    }

    pub async fn remove_rider_item(&mut self, id: i64) -> bool {
        records::remove(self.storage.as_ref(), &mut self.technical_rider, id).await
    }

    pub async fn update_rider_item(&mut self, item: TechnicalRiderItem) -> bool {
        records::update(self.storage.as_ref(), &mut self.technical_rider, item).await
    }

    pub async fn clear_rider_items(&mut self) -> bool {
        records::clear(self.storage.as_ref(), &mut self.technical_rider).await
    }
}
