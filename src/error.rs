//! Error types for the intake bot.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`IntakeError`]: **Operation-fatal**: the operation cannot proceed at
//!   all (bad configuration, unusable working directory, an upload that could
//!   not be fetched). Startup surfaces these to the operator; inside a
//!   conversation they keep the session in its current state.
//!
//! * [`RasterizationError`] and [`RecognitionError`]: **Engine failures**:
//!   pdfium or tesseract could not produce a result. The adapters return them
//!   as values and the state machine decides to degrade and continue: a failed
//!   rasterisation counts as zero extractable pages, a failed recognition is
//!   replaced with [`crate::pipeline::recognize::RECOGNITION_FAILED_TEXT`].
//!
//! No error in this crate ends a user's session.

use std::path::PathBuf;
use thiserror::Error;

/// Operation-level errors returned by the intake bot library.
#[derive(Debug, Error)]
pub enum IntakeError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Storage errors ────────────────────────────────────────────────────
    /// The upload working directory could not be created.
    #[error("Cannot use upload directory '{path}': {source}")]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The chat platform refused to hand over the uploaded file.
    #[error("Failed to fetch upload '{filename}': {reason}")]
    UploadFailed { filename: String, reason: String },

    /// Could not write a document or page image to disk.
    #[error("Failed to write '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine binding errors ─────────────────────────────────────────────
    /// The pdfium library could not be loaded from the configured path.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH (or --renderer-path) to libpdfium itself or to the\n\
directory that contains it.\n"
    )]
    RendererUnavailable(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A PDF could not be turned into page images.
#[derive(Debug, Clone, Error)]
pub enum RasterizationError {
    /// pdfium could not be loaded.
    #[error("pdfium unavailable: {0}")]
    Bind(String),

    /// The document is corrupt, encrypted, or not a PDF.
    #[error("cannot open '{path}': {detail}")]
    Load { path: PathBuf, detail: String },

    /// A single page failed to render.
    #[error("page {page}: rendering failed: {detail}")]
    Page { page: usize, detail: String },

    /// The blocking render task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Task(String),
}

/// The OCR engine could not read an image.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The tesseract binary is not installed or not on `PATH`.
    #[error("OCR engine '{command}' not found (install tesseract-ocr)")]
    EngineUnavailable { command: String },

    /// tesseract ran but exited unsuccessfully.
    #[error("OCR engine failed: {detail}")]
    EngineFailed { detail: String },

    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_display() {
        let e = IntakeError::InvalidConfig("bot token must not be empty".into());
        assert!(e.to_string().contains("bot token"));
    }

    #[test]
    fn upload_failed_display() {
        let e = IntakeError::UploadFailed {
            filename: "plan.pdf".into(),
            reason: "file is too big".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("plan.pdf"), "got: {msg}");
        assert!(msg.contains("too big"), "got: {msg}");
    }

    #[test]
    fn renderer_unavailable_mentions_env_var() {
        let e = IntakeError::RendererUnavailable("no such file".into());
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn rasterization_page_display() {
        let e = RasterizationError::Page {
            page: 3,
            detail: "out of memory".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }

    #[test]
    fn recognition_unavailable_display() {
        let e = RecognitionError::EngineUnavailable {
            command: "tesseract".into(),
        };
        assert!(e.to_string().contains("tesseract"));
    }
}
