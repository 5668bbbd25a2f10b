//! Rasterisation tests against a real pdfium library.
//!
//! Gated behind `PDFIUM_LIB_PATH` so they do not run where pdfium is absent.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/opt/pdfium/lib cargo test --test render -- --nocapture

use intake_bot::pipeline::render::rasterize_pdf;
use intake_bot::{PdfiumRasterizer, RasterizationError, Rasterizer};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Skip this test unless PDFIUM_LIB_PATH is set.
macro_rules! skip_unless_pdfium {
    () => {{
        match std::env::var("PDFIUM_LIB_PATH") {
            Ok(p) if !p.is_empty() => PathBuf::from(p),
            _ => {
                println!("SKIP: set PDFIUM_LIB_PATH to run pdfium tests");
                return;
            }
        }
    }};
}

/// A minimal PDF with `pages` empty 200×100 pt pages and a correct xref table.
fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..pages)
                .map(|i| format!("{} 0 R", i + 3))
                .collect::<Vec<_>>()
                .join(" "),
            pages
        ),
    ];
    for _ in 0..pages {
        objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >>".to_string());
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

#[tokio::test]
async fn three_page_pdf_yields_three_images_in_order() {
    let lib = skip_unless_pdfium!();
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("three.pdf");
    std::fs::write(&pdf, blank_pdf(3)).unwrap();

    let rasterizer: Arc<dyn Rasterizer> = Arc::new(PdfiumRasterizer::new(lib, 400));
    let pages = rasterize_pdf(rasterizer, &pdf)
        .await
        .expect("rasterisation should succeed");

    let numbers: Vec<_> = pages.iter().map(|p| p.page).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    for page in &pages {
        assert!(page.image.width() > 0 && page.image.height() > 0);
        // landscape pages stay landscape
        assert!(page.image.width() > page.image.height());
    }
}

#[tokio::test]
async fn corrupt_pdf_is_a_load_error() {
    let lib = skip_unless_pdfium!();
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("corrupt.pdf");
    std::fs::write(&pdf, b"this is not a pdf at all").unwrap();

    let rasterizer: Arc<dyn Rasterizer> = Arc::new(PdfiumRasterizer::new(lib, 400));
    let err = rasterize_pdf(rasterizer, &pdf).await.unwrap_err();
    assert!(matches!(err, RasterizationError::Load { .. }), "got: {err:?}");
}

#[test]
fn bound_library_passes_startup_check() {
    let lib = skip_unless_pdfium!();
    PdfiumRasterizer::new(lib, 400)
        .check()
        .expect("pdfium should load from PDFIUM_LIB_PATH");
}
