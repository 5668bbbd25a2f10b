//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is not safe to call
//! from async contexts. [`rasterize_pdf`] moves the work onto tokio's blocking
//! pool so a long document never stalls the dispatcher serving other chats.
//!
//! ## Binding
//!
//! The library is loaded from the configured renderer path on every call.
//! That path may name the shared library itself or the directory holding it,
//! in which case the platform file name (`libpdfium.so`, `libpdfium.dylib`,
//! `pdfium.dll`) is appended.

use crate::config::BotConfig;
use crate::error::{IntakeError, RasterizationError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// One rendered page.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// 1-indexed page number.
    pub page: usize,
    pub image: DynamicImage,
}

/// Turns a PDF on disk into its page images, in page order.
///
/// Implementations block; callers go through [`rasterize_pdf`].
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<RasterPage>, RasterizationError>;
}

/// Rasterise on the blocking pool.
pub async fn rasterize_pdf(
    rasterizer: Arc<dyn Rasterizer>,
    pdf_path: &Path,
) -> Result<Vec<RasterPage>, RasterizationError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || rasterizer.rasterize(&path))
        .await
        .map_err(|e| RasterizationError::Task(format!("Render task panicked: {}", e)))?
}

/// [`Rasterizer`] backed by a pdfium shared library.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    renderer_path: PathBuf,
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(renderer_path: impl Into<PathBuf>, max_pixels: u32) -> Self {
        Self {
            renderer_path: renderer_path.into(),
            max_pixels,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(&config.renderer_path, config.max_rendered_pixels)
    }

    /// The shared library file this rasterizer loads.
    pub fn library_path(&self) -> PathBuf {
        if self.renderer_path.is_dir() {
            self.renderer_path.join(platform_library_name())
        } else {
            self.renderer_path.clone()
        }
    }

    /// Load pdfium once so a wrong path is reported at startup rather than on the first upload.
    pub fn check(&self) -> Result<(), IntakeError> {
        self.bind()
            .map(|_| ())
            .map_err(|e| IntakeError::RendererUnavailable(e.to_string()))
    }

    fn bind(&self) -> Result<Pdfium, RasterizationError> {
        let lib = self.library_path();
        Pdfium::bind_to_library(&lib)
            .map(Pdfium::new)
            .map_err(|e| RasterizationError::Bind(format!("{}: {}", lib.display(), e)))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<RasterPage>, RasterizationError> {
        let pdfium = self.bind()?;

        let document =
            pdfium
                .load_pdf_from_file(pdf_path, None)
                .map_err(|e| RasterizationError::Load {
                    path: pdf_path.to_path_buf(),
                    detail: format!("{:?}", e),
                })?;

        let pages = document.pages();
        info!("Number of pages in PDF: {}", pages.len());

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let mut results = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                RasterizationError::Page {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            results.push(RasterPage {
                page: idx + 1,
                image,
            });
        }

        Ok(results)
    }
}

fn platform_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else {
        "libpdfium.so"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_gets_platform_library_name() {
        let tmp = tempfile::tempdir().unwrap();
        let r = PdfiumRasterizer::new(tmp.path(), 2000);
        assert_eq!(r.library_path(), tmp.path().join(platform_library_name()));
    }

    #[test]
    fn file_path_is_used_as_is() {
        let r = PdfiumRasterizer::new("/opt/pdfium/lib/libpdfium-custom.so", 2000);
        assert_eq!(
            r.library_path(),
            PathBuf::from("/opt/pdfium/lib/libpdfium-custom.so")
        );
    }

    #[test]
    fn missing_library_is_reported() {
        let r = PdfiumRasterizer::new("/nonexistent/libpdfium.so", 2000);
        let err = r.check().unwrap_err();
        assert!(matches!(err, IntakeError::RendererUnavailable(_)));
    }
}
