use bandsite_core::{
    Filter, Inserted, Record, SiteConfig, StorageError, StorageService, TableService,
};

use super::records::insert_one;
use super::BandStore;

impl<S: StorageService> BandStore<S> {
    /// Save the site configuration.
    ///
    /// Updates the existing row when `config` has an id, otherwise inserts
    /// the single config row and adopts its id. Local config is replaced
    /// only on success.
    pub async fn save_config(&mut self, mut config: SiteConfig) -> bool {
        match self.write_config(&config).await {
            Ok(inserted) => {
                if let Some(inserted) = inserted {
                    config.assign(&inserted);
                }
                self.config = config;
                true
            }
            Err(e) => {
                tracing::error!("Error saving site config: {}", e);
                false
            }
        }
    }

    async fn write_config(
        &self,
        config: &SiteConfig,
    ) -> Result<Option<Inserted>, StorageError> {
        match config.id {
            Some(id) => {
                let payload = config.encode()?;
                self.storage
                    .update(SiteConfig::TABLE, payload, vec![Filter::id(id)])
                    .await?;
                Ok(None)
            }
            None => insert_one(self.storage.as_ref(), config).await.map(Some),
        }
    }

    pub async fn add_banner(&mut self, url: impl Into<String>) -> bool {
        let mut config = self.config.clone();
        config.banner_images.push(url.into());
        self.save_config(config).await
    }

    /// Remove the banner at `index`. Out-of-range indices are ignored.
    pub async fn remove_banner(&mut self, index: usize) -> bool {
        if index >= self.config.banner_images.len() {
            tracing::warn!("No banner at index {}", index);
            return false;
        }

        let mut config = self.config.clone();
        config.banner_images.remove(index);
        self.save_config(config).await
    }

    pub async fn clear_banners(&mut self) -> bool {
        let mut config = self.config.clone();
        config.banner_images.clear();
        self.save_config(config).await
    }
}
