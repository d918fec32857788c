//! Filesystem image store rooted at the configured media directory.
//!
//! All access goes through a capability-scoped [`cap_std::fs::Dir`], so a
//! stored location can never resolve outside the media root. Files are
//! written to a staging name and renamed into place.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageArea, ImageLocation, ImageUpload, StoredImage};

const AREAS: [ImageArea; 2] = [ImageArea::Applications, ImageArea::Designs];

/// [`ImageStore`] backed by a local directory.
#[derive(Clone)]
pub struct LocalImageStore {
    root: Arc<Dir>,
    root_path: PathBuf,
}

impl LocalImageStore {
    /// Open `root`, creating it and the per-area subdirectories if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ImageStoreError> {
        let root_path = root.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())
            .map_err(|error| unavailable(&root_path, &error))?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority())
            .map_err(|error| unavailable(&root_path, &error))?;
        for area in AREAS {
            dir.create_dir_all(area.as_str())
                .map_err(|error| unavailable(&root_path.join(area.as_str()), &error))?;
        }
        Ok(Self {
            root: Arc::new(dir),
            root_path,
        })
    }

    /// Absolute path of the media root.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, ImageStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || work(&*root))
            .await
            .map_err(|error| ImageStoreError::io(format!("image store task failed: {error}")))?
    }
}

fn unavailable(path: &Path, error: &io::Error) -> ImageStoreError {
    ImageStoreError::unavailable(format!("{}: {error}", path.display()))
}

fn io_error(location: &str, error: &io::Error) -> ImageStoreError {
    ImageStoreError::io(format!("{location}: {error}"))
}

fn write_atomically(dir: &Dir, location: &ImageLocation, bytes: &[u8]) -> Result<(), ImageStoreError> {
    let staged = format!("{}/.tmp-{}", location.directory(), Uuid::new_v4().simple());
    dir.write(&staged, bytes)
        .map_err(|error| io_error(&staged, &error))?;
    if let Err(error) = dir.rename(&staged, dir, location.as_ref()) {
        let _cleanup = dir.remove_file(&staged);
        return Err(io_error(location.as_ref(), &error));
    }
    Ok(())
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(
        &self,
        area: ImageArea,
        upload: &ImageUpload,
    ) -> Result<ImageLocation, ImageStoreError> {
        let location = ImageLocation::generate(area, upload.kind());
        let bytes = upload.bytes().to_vec();
        let target = location.clone();
        self.blocking(move |dir| write_atomically(dir, &target, &bytes))
            .await?;
        tracing::debug!(location = %location, "stored image");
        Ok(location)
    }

    async fn load(&self, location: &ImageLocation) -> Result<Option<StoredImage>, ImageStoreError> {
        let target = location.clone();
        self.blocking(move |dir| match dir.read(target.as_ref()) {
            Ok(bytes) => Ok(Some(StoredImage {
                kind: target.kind(),
                bytes,
            })),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(target.as_ref(), &error)),
        })
        .await
    }

    async fn remove(&self, location: &ImageLocation) -> Result<(), ImageStoreError> {
        let target = location.clone();
        self.blocking(move |dir| match dir.remove_file(target.as_ref()) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(target.as_ref(), &error)),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageKind;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn media_root() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    #[rstest]
    fn open_creates_area_directories(media_root: TempDir) {
        let root = media_root.path().join("media");
        let store = LocalImageStore::open(&root).expect("open store");
        assert_eq!(store.root_path(), root.as_path());
        assert!(root.join("applications").is_dir());
        assert!(root.join("designs").is_dir());
    }

    #[rstest]
    #[tokio::test]
    async fn stored_images_can_be_loaded_and_removed(media_root: TempDir) {
        let store = LocalImageStore::open(media_root.path()).expect("open store");
        let upload = ImageUpload::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]).expect("upload");

        let location = store
            .store(ImageArea::Applications, &upload)
            .await
            .expect("store");
        assert_eq!(location.kind(), ImageKind::Jpeg);
        assert!(media_root.path().join(location.as_ref()).is_file());

        let loaded = store
            .load(&location)
            .await
            .expect("load")
            .expect("image present");
        assert_eq!(loaded.bytes, vec![0xFF, 0xD8, 0xFF]);

        store.remove(&location).await.expect("remove");
        assert!(store.load(&location).await.expect("load").is_none());
        store.remove(&location).await.expect("second remove is a no-op");
    }

    #[rstest]
    #[tokio::test]
    async fn no_staging_files_are_left_behind(media_root: TempDir) {
        let store = LocalImageStore::open(media_root.path()).expect("open store");
        let upload = ImageUpload::new("image/png", vec![1; 64]).expect("upload");
        store
            .store(ImageArea::Designs, &upload)
            .await
            .expect("store");

        let names: Vec<String> = std::fs::read_dir(media_root.path().join("designs"))
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names.iter().all(|name| !name.starts_with(".tmp-")));
    }
}
