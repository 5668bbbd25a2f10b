//! # intake-bot
//!
//! A Telegram bot that walks a user through a fire-safety intake form:
//! building type, location, fire-safety measures, customer ID, one supporting
//! document, and a final yes/no confirmation.
//!
//! Uploaded images are read with tesseract and the text is echoed back. PDFs
//! are rasterised page by page with pdfium; every page is saved as a JPEG and
//! recognised, and the text goes to the log.
//!
//! ## Flow Overview
//!
//! ```text
//! Telegram update
//!  │
//!  ├─ bot       /start, /cancel, text, document → Event; per-chat Session storage
//!  ├─ intake    (Session, Event) → Step { next Session, reply }
//!  └─ pipeline  validate → store → render (pdfium) → recognize (tesseract)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use intake_bot::{bot, BotConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::builder("123456:token", "/opt/pdfium/lib").build()?;
//!     bot::run(&config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `intake-bot` binary (clap + anyhow + dotenvy + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod bot;
pub mod config;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BotConfig, BotConfigBuilder};
pub use error::{IntakeError, RasterizationError, RecognitionError};
pub use intake::{Event, IntakeFlow, MemoryUpload, Step, Upload, UploadSource};
pub use pipeline::recognize::{Recognizer, TesseractRecognizer, RECOGNITION_FAILED_TEXT};
pub use pipeline::render::{PdfiumRasterizer, RasterPage, Rasterizer};
pub use pipeline::store::DocumentStore;
pub use pipeline::validate::{validate, DocumentKind};
pub use session::{Answers, Field, Session, State};
