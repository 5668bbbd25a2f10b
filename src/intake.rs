//! The intake state machine.
//!
//! [`IntakeFlow::handle`] maps `(session, event)` to a [`Step`]: the next
//! session value plus at most one reply. It is the only place a session's
//! state changes.
//!
//! ```text
//! /start ─▶ BuildingType ─▶ Location ─▶ FireSafety ─▶ CustomerId ─▶ Documents ─▶ Confirm ─▶ end
//!                                                                     ▲    │        ▲   │
//!                                                                     └────┘        └───┘
//!                                                         bad file / no upload     not yes/no
//! ```
//!
//! `/cancel` ends the conversation from any of the six states and drops every
//! answer. Inputs a state does not expect are ignored (no reply, no change),
//! except in `Documents`, where anything but an upload is answered with a
//! reminder to upload.

use crate::config::BotConfig;
use crate::error::IntakeError;
use crate::pipeline::document;
use crate::pipeline::recognize::{Recognizer, TesseractRecognizer};
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use crate::pipeline::store::DocumentStore;
use crate::pipeline::validate::{self, DocumentKind};
use crate::prompts;
use crate::session::{Field, Session, State};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ── Events ───────────────────────────────────────────────────────────────

/// Where the bytes of an upload come from.
///
/// Fetching is deferred until the file name has passed validation, so a
/// rejected upload is never downloaded.
#[async_trait]
pub trait UploadSource: Send + Sync {
    /// Write the upload's content to `dest`, replacing any existing file.
    async fn save_to(&self, dest: &Path) -> Result<(), IntakeError>;
}

/// Upload whose content is already in memory.
///
/// For transports that receive the file body with the message itself (an HTTP
/// form post, a queue payload) rather than a handle to fetch later.
#[derive(Debug, Clone)]
pub struct MemoryUpload(pub Vec<u8>);

#[async_trait]
impl UploadSource for MemoryUpload {
    async fn save_to(&self, dest: &Path) -> Result<(), IntakeError> {
        tokio::fs::write(dest, &self.0)
            .await
            .map_err(|e| IntakeError::SaveFailed {
                path: dest.to_path_buf(),
                source: e,
            })
    }
}

/// A document sent by the user.
pub struct Upload {
    pub filename: String,
    source: Box<dyn UploadSource>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, source: impl UploadSource + 'static) -> Self {
        Self {
            filename: filename.into(),
            source: Box::new(source),
        }
    }

    /// Lower-cased extension as declared by the file name.
    pub fn declared_extension(&self) -> String {
        validate::extension(&self.filename)
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("source", &"<dyn UploadSource>")
            .finish()
    }
}

/// One inbound user action.
#[derive(Debug)]
pub enum Event {
    /// `/start`
    Start,
    /// `/cancel`
    Cancel,
    /// Plain text that is not a command.
    Text(String),
    Upload(Upload),
    /// Anything else: stickers, photos, unknown commands.
    Unsupported,
}

// ── Steps ────────────────────────────────────────────────────────────────

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub session: Session,
    /// Message to send back, if any.
    pub reply: Option<String>,
}

impl Step {
    fn reply(session: Session, text: impl Into<String>) -> Self {
        Self {
            session,
            reply: Some(text.into()),
        }
    }

    fn ignore(session: Session) -> Self {
        Self {
            session,
            reply: None,
        }
    }

    /// The conversation is over; the transport should drop the session.
    pub fn is_terminal(&self) -> bool {
        self.session.is_terminal()
    }
}

// ── Flow ─────────────────────────────────────────────────────────────────

/// The intake conversation together with the engines the DOCUMENTS step needs.
pub struct IntakeFlow {
    store: DocumentStore,
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn Recognizer>,
}

impl IntakeFlow {
    pub fn new(
        store: DocumentStore,
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Self {
        Self {
            store,
            rasterizer,
            recognizer,
        }
    }

    /// Open the upload directory and wire pdfium and tesseract from `config`.
    pub fn from_config(config: &BotConfig) -> Result<Self, IntakeError> {
        let store = DocumentStore::open(&config.upload_dir)?;
        Ok(Self::new(
            store,
            Arc::new(PdfiumRasterizer::from_config(config)),
            Arc::new(TesseractRecognizer::from_config(config)),
        ))
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Advance `session` by one event.
    pub async fn handle(&self, session: Session, event: Event) -> Step {
        // a finished session behaves like a fresh one
        let session = if session.is_terminal() {
            Session::default()
        } else {
            session
        };

        match (session.state, event) {
            (State::AwaitingStart, Event::Start) => {
                info!("Intake started");
                Step::reply(
                    Session {
                        state: State::BuildingType,
                        ..Session::default()
                    },
                    prompts::WELCOME,
                )
            }

            (state, Event::Cancel) if state.is_active() => {
                info!("Intake cancelled in state {:?}", state);
                Step::reply(Session::terminated(), prompts::OPERATION_CANCELLED)
            }

            (State::BuildingType, Event::Text(text)) => answer(
                session,
                Field::BuildingType,
                text,
                State::Location,
                prompts::ASK_LOCATION,
            ),
            (State::Location, Event::Text(text)) => answer(
                session,
                Field::Location,
                text,
                State::FireSafety,
                prompts::ASK_FIRE_SAFETY,
            ),
            (State::FireSafety, Event::Text(text)) => answer(
                session,
                Field::FireSafety,
                text,
                State::CustomerId,
                prompts::ASK_CUSTOMER_ID,
            ),
            (State::CustomerId, Event::Text(text)) => answer(
                session,
                Field::CustomerId,
                text,
                State::Documents,
                prompts::ASK_DOCUMENTS,
            ),

            (State::Documents, Event::Upload(upload)) => self.on_upload(session, upload).await,
            (State::Documents, Event::Text(_) | Event::Unsupported) => {
                Step::reply(session, prompts::MISSING_UPLOAD)
            }

            (State::Confirm, Event::Text(text)) => on_confirm(session, &text),

            (state, event) => {
                debug!("Ignoring {:?} in state {:?}", event, state);
                Step::ignore(session)
            }
        }
    }

    async fn on_upload(&self, mut session: Session, upload: Upload) -> Step {
        let Some(kind) = DocumentKind::from_filename(&upload.filename) else {
            info!(
                "Rejected upload '{}' (extension '{}')",
                upload.filename,
                upload.declared_extension()
            );
            return Step::reply(session, prompts::INVALID_FILE_TYPE);
        };

        let path = self.store.upload_path(&upload.filename);
        if let Err(e) = upload.source.save_to(&path).await {
            warn!("Could not store upload '{}': {}", upload.filename, e);
            return Step::reply(session, prompts::UPLOAD_FAILED);
        }
        info!("Document received and saved: {}", path.display());
        session.document_path = Some(path.clone());

        let reply = match kind {
            DocumentKind::Image => {
                let text = document::process_image(&path, self.recognizer.as_ref()).await;
                let reply = prompts::image_received(&text);
                session.recognized_text = Some(text);
                reply
            }
            DocumentKind::Pdf => {
                let report = document::process_pdf(
                    &path,
                    &self.store,
                    Arc::clone(&self.rasterizer),
                    self.recognizer.as_ref(),
                )
                .await;
                info!(
                    "PDF {} processed: {} page(s) recognised",
                    path.display(),
                    report.pages.len()
                );
                prompts::PDF_RECEIVED.to_string()
            }
        };

        session.state = State::Confirm;
        Step::reply(session, reply)
    }
}

fn answer(
    mut session: Session,
    field: Field,
    text: String,
    next: State,
    prompt: &'static str,
) -> Step {
    debug!("{} = {:?}", field.as_str(), text);
    session.answers.set(field, text);
    session.state = next;
    Step::reply(session, prompt)
}

/// Only the exact words "yes" and "no" count, in any ASCII case; padding or
/// trailing text is a non-answer.
fn on_confirm(session: Session, reply: &str) -> Step {
    if reply.eq_ignore_ascii_case("yes") {
        let record = serde_json::json!({
            "answers": &session.answers,
            "document_path": &session.document_path,
            "recognized_text": &session.recognized_text,
        });
        info!("Submission received: {}", record);
        Step::reply(
            Session {
                state: State::Terminal,
                ..session
            },
            prompts::SUBMISSION_RECEIVED,
        )
    } else if reply.eq_ignore_ascii_case("no") {
        info!("Submission declined");
        Step::reply(Session::terminated(), prompts::SUBMISSION_CANCELLED)
    } else {
        Step::reply(session, prompts::ASK_YES_NO)
    }
}
