//! The shared working directory for uploads and rasterised pages.
//!
//! Uploads keep their original file name; PDF pages are written as
//! `page_<i>.jpg` with a 0-based `i`. Names are not scoped per chat, so
//! concurrent uploads with the same name (or concurrent PDFs) overwrite each
//! other. Files are never removed.

use crate::error::IntakeError;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open the store, creating the directory if it does not exist.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| IntakeError::WorkDir {
            path: root.clone(),
            source: e,
        })?;
        debug!("Upload directory ready: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination for an uploaded file. Directory components in the name are dropped.
    pub fn upload_path(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "upload".into());
        self.root.join(name)
    }

    /// Destination for the page at 0-based `index`.
    pub fn page_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("page_{}.jpg", index))
    }

    /// Write a rasterised page as JPEG and return its path.
    ///
    /// Blocking; call from `spawn_blocking`.
    pub fn save_page(&self, index: usize, image: &DynamicImage) -> Result<PathBuf, IntakeError> {
        let path = self.page_path(index);
        // JPEG has no alpha channel
        image
            .to_rgb8()
            .save_with_format(&path, image::ImageFormat::Jpeg)
            .map_err(|e| IntakeError::SaveFailed {
                path: path.clone(),
                source: std::io::Error::other(e),
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn open_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/output_images");
        let store = DocumentStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.root(), dir.as_path());
    }

    #[test]
    fn upload_path_strips_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(tmp.path()).unwrap();
        assert_eq!(
            store.upload_path("../../etc/plan.pdf"),
            tmp.path().join("plan.pdf")
        );
        assert_eq!(store.upload_path("scan.PNG"), tmp.path().join("scan.PNG"));
    }

    #[test]
    fn page_paths_are_zero_based() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(tmp.path()).unwrap();
        assert_eq!(store.page_path(0), tmp.path().join("page_0.jpg"));
        assert_eq!(store.page_path(12), tmp.path().join("page_12.jpg"));
    }

    #[test]
    fn save_page_writes_jpeg_from_rgba() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(tmp.path()).unwrap();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 128])));
        let path = store.save_page(2, &img).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
