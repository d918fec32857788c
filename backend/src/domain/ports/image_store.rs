//! Port for storing uploaded images.

use async_trait::async_trait;

use crate::domain::{ImageArea, ImageLocation, ImageUpload, StoredImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Backing storage could not be reached.
        Unavailable { message: String } => "image store unavailable: {message}",
        /// A read or write failed.
        Io { message: String } => "image store operation failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `upload` under `area` and return where it was written.
    async fn store(
        &self,
        area: ImageArea,
        upload: &ImageUpload,
    ) -> Result<ImageLocation, ImageStoreError>;

    /// Read an image back. `None` when nothing is stored at `location`.
    async fn load(&self, location: &ImageLocation) -> Result<Option<StoredImage>, ImageStoreError>;

    /// Delete an image. Missing files are not an error.
    async fn remove(&self, location: &ImageLocation) -> Result<(), ImageStoreError>;
}
