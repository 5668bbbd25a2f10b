//! Document handling stages behind the DOCUMENTS step of the intake flow.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ store ──▶ render ──▶ store ──▶ recognize
//! (file name)  (upload)  (pdfium)   (page_i)  (tesseract)
//! ```
//!
//! 1. [`validate`]: allow-list check on the upload's file name
//! 2. [`store`]: the shared working directory
//! 3. [`render`]: rasterise PDF pages; runs in `spawn_blocking`
//! 4. [`recognize`]: OCR an image file; the only stage spawning a process
//! 5. [`document`]: ties the stages together per document kind

pub mod document;
pub mod recognize;
pub mod render;
pub mod store;
pub mod validate;
