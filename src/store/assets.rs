use uuid::Uuid;

use bandsite_core::{AssetFile, ObjectStorage, StorageService};

use super::BandStore;

/// Random object name that keeps the extension of `file`.
pub(crate) fn asset_name(file: &AssetFile) -> String {
    match file.extension() {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

impl<S: StorageService> BandStore<S> {
    /// Upload a file to the asset bucket under a random name.
    /// Returns its public URL, or `None` if the upload failed.
    pub async fn upload_asset(&self, file: AssetFile) -> Option<String> {
        let path = asset_name(&file);

        if let Err(e) = self
            .storage
            .upload(
                &self.asset_bucket,
                &path,
                file.bytes,
                file.content_type.as_deref(),
            )
            .await
        {
            tracing::error!("Error uploading {}: {}", file.name, e);
            return None;
        }

        Some(self.storage.public_url(&self.asset_bucket, &path))
    }
}
