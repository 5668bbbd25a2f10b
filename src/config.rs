//! Configuration types for the intake bot.
//!
//! Everything the bot needs from its environment lives in [`BotConfig`],
//! built via [`BotConfigBuilder`]. The two required values (the bot token and
//! the pdfium location) are constructor arguments of the builder; everything
//! else has a default.

use crate::error::IntakeError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default working directory for uploads and rasterised pages.
pub const DEFAULT_UPLOAD_DIR: &str = "output_images";

/// Runtime configuration of the bot.
///
/// # Example
/// ```rust
/// use intake_bot::BotConfig;
///
/// let config = BotConfig::builder("123:abc", "/opt/pdfium/lib")
///     .upload_dir("/var/lib/intake")
///     .ocr_language("eng+deu")
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_language, "eng+deu");
/// ```
#[derive(Clone)]
pub struct BotConfig {
    /// Telegram bot token issued by BotFather.
    pub bot_token: String,

    /// Path to the pdfium shared library, or to the directory containing it.
    pub renderer_path: PathBuf,

    /// Directory receiving uploads and `page_<i>.jpg` files. Default: `output_images`.
    ///
    /// Shared by every chat. Two chats uploading the same file name, or two
    /// PDFs being rasterised at once, overwrite each other's files.
    pub upload_dir: PathBuf,

    /// Name or path of the tesseract executable. Default: `tesseract`.
    pub tesseract_cmd: String,

    /// Tesseract language code(s), e.g. `eng` or `eng+deu`. Default: `eng`.
    pub ocr_language: String,

    /// Longest edge of a rasterised page in pixels. Default: 2000.
    pub max_rendered_pixels: u32,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("renderer_path", &self.renderer_path)
            .field("upload_dir", &self.upload_dir)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("ocr_language", &self.ocr_language)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .finish()
    }
}

impl BotConfig {
    /// Create a new builder from the two required settings.
    pub fn builder(
        bot_token: impl Into<String>,
        renderer_path: impl Into<PathBuf>,
    ) -> BotConfigBuilder {
        BotConfigBuilder {
            config: Self {
                bot_token: bot_token.into(),
                renderer_path: renderer_path.into(),
                upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
                tesseract_cmd: "tesseract".to_string(),
                ocr_language: "eng".to_string(),
                max_rendered_pixels: 2000,
            },
        }
    }
}

/// Builder for [`BotConfig`].
#[derive(Debug)]
pub struct BotConfigBuilder {
    config: BotConfig,
}

impl BotConfigBuilder {
    pub fn upload_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.upload_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BotConfig, IntakeError> {
        let c = &self.config;
        if c.bot_token.trim().is_empty() {
            return Err(IntakeError::InvalidConfig(
                "bot token must not be empty".into(),
            ));
        }
        if c.renderer_path.as_os_str().is_empty() {
            return Err(IntakeError::InvalidConfig(
                "renderer path must not be empty".into(),
            ));
        }
        if c.upload_dir.as_os_str().is_empty() {
            return Err(IntakeError::InvalidConfig(
                "upload directory must not be empty".into(),
            ));
        }
        if c.tesseract_cmd.trim().is_empty() {
            return Err(IntakeError::InvalidConfig(
                "tesseract command must not be empty".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(IntakeError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = BotConfig::builder("token", "/opt/pdfium").build().unwrap();
        assert_eq!(c.upload_dir, PathBuf::from("output_images"));
        assert_eq!(c.tesseract_cmd, "tesseract");
        assert_eq!(c.ocr_language, "eng");
        assert_eq!(c.max_rendered_pixels, 2000);
    }

    #[test]
    fn empty_token_rejected() {
        let err = BotConfig::builder("  ", "/opt/pdfium").build().unwrap_err();
        assert!(matches!(err, IntakeError::InvalidConfig(_)));
    }

    #[test]
    fn empty_renderer_path_rejected() {
        let err = BotConfig::builder("token", "").build().unwrap_err();
        assert!(err.to_string().contains("renderer path"));
    }

    #[test]
    fn empty_language_rejected() {
        let err = BotConfig::builder("token", "/opt/pdfium")
            .ocr_language("")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn pixel_cap_is_clamped() {
        let c = BotConfig::builder("token", "/opt/pdfium")
            .max_rendered_pixels(10)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn debug_redacts_token() {
        let c = BotConfig::builder("123456:SECRET", "/opt/pdfium")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("SECRET"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }
}
