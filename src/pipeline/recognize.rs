//! Text recognition: read an image file with tesseract.
//!
//! Tesseract runs as a child process (`tesseract <image> stdout -l <lang>`)
//! through `tokio::process`, so waiting on it does not occupy a runtime
//! worker. Engine failures come back as [`RecognitionError`]; callers that
//! must not fail use [`recognize_or_sentinel`].

use crate::config::BotConfig;
use crate::error::RecognitionError;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, warn};

/// Substituted for the recognised text when the engine fails.
pub const RECOGNITION_FAILED_TEXT: &str = "Error processing image.";

/// Extracts text from an image on disk.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image_path: &Path) -> Result<String, RecognitionError>;
}

/// Run `recognizer`, replacing any failure with [`RECOGNITION_FAILED_TEXT`].
pub async fn recognize_or_sentinel(recognizer: &dyn Recognizer, image_path: &Path) -> String {
    info!("Performing OCR on: {}", image_path.display());
    match recognizer.recognize(image_path).await {
        Ok(text) => {
            info!("OCR result: {}", text);
            text
        }
        Err(e) => {
            warn!("Error performing OCR on {}: {}", image_path.display(), e);
            RECOGNITION_FAILED_TEXT.to_string()
        }
    }
}

/// [`Recognizer`] that shells out to the tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(&config.tesseract_cmd, &config.ocr_language)
    }
}

#[async_trait]
impl Recognizer for TesseractRecognizer {
    async fn recognize(&self, image_path: &Path) -> Result<String, RecognitionError> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => Err(RecognitionError::EngineFailed {
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RecognitionError::EngineUnavailable {
                    command: self.command.clone(),
                })
            }
            Err(e) => Err(RecognitionError::Io(e)),
        }
    }
}
