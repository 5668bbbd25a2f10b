//! CLI binary for intake-bot.
//!
//! A thin shim over the library crate that maps flags and environment
//! variables to `BotConfig` and runs the dispatcher.

use anyhow::{Context, Result};
use clap::Parser;
use intake_bot::{bot, BotConfig, PdfiumRasterizer};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Token and pdfium location from the environment (or a .env file)
  TELOXIDE_TOKEN=123456:ABC PDFIUM_LIB_PATH=/opt/pdfium/lib intake-bot

  # Explicit flags, German + English OCR
  intake-bot --token 123456:ABC --renderer-path /opt/pdfium/lib/libpdfium.so \
             --ocr-language eng+deu --upload-dir /var/lib/intake

ENVIRONMENT VARIABLES:
  TELOXIDE_TOKEN          Telegram bot token from BotFather
  PDFIUM_LIB_PATH         libpdfium, or the directory containing it
  INTAKE_UPLOAD_DIR       Working directory for uploads (default: output_images)
  INTAKE_TESSERACT_CMD    tesseract executable (default: tesseract)
  INTAKE_OCR_LANGUAGE     tesseract language(s) (default: eng)
  RUST_LOG                Overrides the log filter

SETUP:
  1. Install tesseract:   apt install tesseract-ocr
  2. Download pdfium:     https://github.com/bblanchon/pdfium-binaries
  3. Run:                 intake-bot
"#;

/// Telegram intake form for fire-safety submissions.
#[derive(Parser, Debug)]
#[command(
    name = "intake-bot",
    version,
    about = "Telegram intake form with PDF rasterisation and OCR",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Telegram bot token.
    #[arg(long, env = "TELOXIDE_TOKEN", hide_env_values = true)]
    token: String,

    /// pdfium shared library, or the directory that contains it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    renderer_path: PathBuf,

    /// Working directory for uploaded files and rasterised pages.
    #[arg(long, env = "INTAKE_UPLOAD_DIR", default_value = intake_bot::config::DEFAULT_UPLOAD_DIR)]
    upload_dir: PathBuf,

    /// tesseract executable name or path.
    #[arg(long, env = "INTAKE_TESSERACT_CMD", default_value = "tesseract")]
    tesseract: String,

    /// tesseract language code(s), e.g. eng or eng+deu.
    #[arg(long, env = "INTAKE_OCR_LANGUAGE", default_value = "eng")]
    ocr_language: String,

    /// Longest edge of a rasterised page, in pixels.
    #[arg(long, env = "INTAKE_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "INTAKE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "INTAKE_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = BotConfig::builder(cli.token, cli.renderer_path)
        .upload_dir(&cli.upload_dir)
        .tesseract_cmd(cli.tesseract)
        .ocr_language(cli.ocr_language)
        .max_rendered_pixels(cli.max_pixels)
        .build()
        .context("Invalid configuration")?;

    tracing::debug!("{:?}", config);

    // ── Ensure PDFium is loadable ────────────────────────────────────────
    let rasterizer = PdfiumRasterizer::from_config(&config);
    tokio::task::block_in_place(|| rasterizer.check())
        .with_context(|| format!("Cannot load pdfium from {:?}", rasterizer.library_path()))?;

    // ── Run ──────────────────────────────────────────────────────────────
    bot::run(&config).await.context("Bot failed")?;

    Ok(())
}
