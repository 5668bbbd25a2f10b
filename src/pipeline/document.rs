//! Processing of an accepted, already-stored upload.
//!
//! Images are recognised directly. PDFs are rasterised, each page is written
//! to the store as `page_<i>.jpg`, and the pages are recognised one after
//! another in page order. PDF page text only goes to the log.

use crate::error::IntakeError;
use crate::pipeline::recognize::{recognize_or_sentinel, Recognizer};
use crate::pipeline::render::{rasterize_pdf, RasterPage, Rasterizer};
use crate::pipeline::store::DocumentStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Recognised text of one PDF page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-indexed page number.
    pub page: usize,
    /// Where the page image was written.
    pub image_path: PathBuf,
    pub text: String,
}

/// What came out of a PDF. Empty when the document could not be rasterised.
#[derive(Debug, Clone, Default)]
pub struct PdfReport {
    pub pages: Vec<PageText>,
}

/// Recognise a stored image upload. Never fails; see [`recognize_or_sentinel`].
pub async fn process_image(image_path: &Path, recognizer: &dyn Recognizer) -> String {
    recognize_or_sentinel(recognizer, image_path).await
}

/// Rasterise, store, and recognise every page of a stored PDF.
///
/// A rasterisation failure yields an empty report. A page that cannot be
/// written stops processing; pages already recognised are kept.
pub async fn process_pdf(
    pdf_path: &Path,
    store: &DocumentStore,
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: &dyn Recognizer,
) -> PdfReport {
    info!("Processing PDF file: {}", pdf_path.display());

    let pages = match rasterize_pdf(rasterizer, pdf_path).await {
        Ok(pages) => pages,
        Err(e) => {
            warn!("Error processing PDF {}: {}", pdf_path.display(), e);
            return PdfReport::default();
        }
    };

    let mut report = PdfReport {
        pages: Vec::with_capacity(pages.len()),
    };

    for (index, page) in pages.into_iter().enumerate() {
        let page_num = page.page;
        let image_path = match save_page(store, index, page).await {
            Ok(path) => path,
            Err(e) => {
                warn!("Error processing PDF {}: {}", pdf_path.display(), e);
                break;
            }
        };
        info!("Saved PDF page to: {}", image_path.display());

        let text = recognize_or_sentinel(recognizer, &image_path).await;
        info!("OCR text for page {}: {}", index, text);

        report.pages.push(PageText {
            page: page_num,
            image_path,
            text,
        });
    }

    report
}

async fn save_page(
    store: &DocumentStore,
    index: usize,
    page: RasterPage,
) -> Result<PathBuf, IntakeError> {
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.save_page(index, &page.image))
        .await
        .map_err(|e| IntakeError::Internal(format!("Page save task panicked: {}", e)))?
}
