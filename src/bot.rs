//! Telegram transport: turns updates into [`Event`]s and replies into messages.
//!
//! Sessions live in teloxide's dialogue storage (`InMemStorage<Session>`),
//! keyed by chat. The dispatcher handles updates of one chat in order and
//! different chats concurrently, so [`IntakeFlow::handle`] never sees two
//! events of the same session at once.

use crate::config::BotConfig;
use crate::error::IntakeError;
use crate::intake::{Event, IntakeFlow, Step, Upload, UploadSource};
use crate::session::Session;
use async_trait::async_trait;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::dispatching::UpdateHandler;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::MessageEntityKind;
use teloxide::utils::command::BotCommands;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

type IntakeDialogue = Dialogue<Session, InMemStorage<Session>>;
type HandlerError = Box<dyn std::error::Error + Send + Sync>;
type HandlerResult = Result<(), HandlerError>;

/// Commands the bot understands.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "fill in a new intake form.")]
    Start,
    #[command(description = "abandon the current form.")]
    Cancel,
}

impl From<Command> for Event {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => Event::Start,
            Command::Cancel => Event::Cancel,
        }
    }
}

/// A document still sitting on Telegram's servers.
struct TelegramFile {
    bot: Bot,
    file_id: String,
    filename: String,
}

#[async_trait]
impl UploadSource for TelegramFile {
    async fn save_to(&self, dest: &Path) -> Result<(), IntakeError> {
        let file = self
            .bot
            .get_file(self.file_id.clone())
            .await
            .map_err(|e| IntakeError::UploadFailed {
                filename: self.filename.clone(),
                reason: e.to_string(),
            })?;

        let bot = self.bot.clone();
        write_replacing(dest, &self.filename, move |mut dst: tokio::fs::File| async move {
            let downloaded = bot.download_file(&file.path, &mut dst).await;
            downloaded.map(|()| dst).map_err(|e| e.to_string())
        })
        .await?;

        debug!("Downloaded {} to {}", self.filename, dest.display());
        Ok(())
    }
}

/// Suffix of a download in progress. Never an allowed upload extension.
const PARTIAL_SUFFIX: &str = ".part";

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}

/// Let `fill` write a sibling `.part` file, then move it over `dest`.
///
/// `dest` is untouched unless `fill` succeeds; a failed or partial download
/// leaves an earlier upload of the same name in place and no `.part` behind.
async fn write_replacing<F, Fut>(dest: &Path, filename: &str, fill: F) -> Result<(), IntakeError>
where
    F: FnOnce(tokio::fs::File) -> Fut,
    Fut: Future<Output = Result<tokio::fs::File, String>>,
{
    let partial = partial_path(dest);
    let written = fill_and_commit(&partial, dest, filename, fill).await;

    if written.is_err() {
        if let Err(e) = tokio::fs::remove_file(&partial).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Could not remove {}: {}", partial.display(), e);
            }
        }
    }
    written
}

async fn fill_and_commit<F, Fut>(
    partial: &Path,
    dest: &Path,
    filename: &str,
    fill: F,
) -> Result<(), IntakeError>
where
    F: FnOnce(tokio::fs::File) -> Fut,
    Fut: Future<Output = Result<tokio::fs::File, String>>,
{
    let save_failed = |path: &Path, source: std::io::Error| IntakeError::SaveFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| save_failed(partial, e))?;
    let mut file = fill(file).await.map_err(|reason| IntakeError::UploadFailed {
        filename: filename.to_string(),
        reason,
    })?;
    file.flush().await.map_err(|e| save_failed(partial, e))?;
    drop(file);

    tokio::fs::rename(partial, dest)
        .await
        .map_err(|e| save_failed(dest, e))
}

/// Map a non-command message to an event.
fn event_from_message(bot: &Bot, msg: &Message) -> Event {
    if let Some(doc) = msg.document() {
        let filename = doc.file_name.clone().unwrap_or_default();
        return Event::Upload(Upload::new(
            filename.clone(),
            TelegramFile {
                bot: bot.clone(),
                file_id: doc.file.id.clone(),
                filename,
            },
        ));
    }

    match msg.text() {
        // unknown commands are not answers
        Some(_) if starts_with_command(msg) => Event::Unsupported,
        Some(text) => Event::Text(text.to_string()),
        None => Event::Unsupported,
    }
}

/// Telegram tags commands with a `bot_command` entity; a leading `/` alone
/// (e.g. "/ 2nd floor") is ordinary text.
fn starts_with_command(msg: &Message) -> bool {
    msg.entities().is_some_and(|entities| {
        entities
            .iter()
            .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
    })
}

/// The update handler tree: commands first, then every other message.
pub fn schema() -> UpdateHandler<HandlerError> {
    let commands = teloxide::filter_command::<Command, _>().endpoint(on_command);

    let messages = Update::filter_message()
        .branch(commands)
        .branch(dptree::endpoint(on_message));

    dialogue::enter::<Update, InMemStorage<Session>, Session, _>().branch(messages)
}

async fn on_command(
    bot: Bot,
    dialogue: IntakeDialogue,
    flow: Arc<IntakeFlow>,
    session: Session,
    msg: Message,
    cmd: Command,
) -> HandlerResult {
    drive(bot, dialogue, flow, session, msg.chat.id, cmd.into()).await
}

async fn on_message(
    bot: Bot,
    dialogue: IntakeDialogue,
    flow: Arc<IntakeFlow>,
    session: Session,
    msg: Message,
) -> HandlerResult {
    let event = event_from_message(&bot, &msg);
    drive(bot, dialogue, flow, session, msg.chat.id, event).await
}

/// Run one event through the flow, persist the result, send the reply.
async fn drive(
    bot: Bot,
    dialogue: IntakeDialogue,
    flow: Arc<IntakeFlow>,
    session: Session,
    chat_id: ChatId,
    event: Event,
) -> HandlerResult {
    let step = flow.handle(session, event).await;

    if let Some(reply) = persist(&dialogue, step).await? {
        if let Err(e) = bot.send_message(chat_id, reply).await {
            error!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }

    Ok(())
}

/// Store the step's session, or drop it once the conversation is over.
/// Returns the reply still to be sent.
async fn persist(dialogue: &IntakeDialogue, step: Step) -> Result<Option<String>, HandlerError> {
    if step.is_terminal() {
        dialogue.exit().await?;
    } else {
        dialogue.update(step.session).await?;
    }
    Ok(step.reply)
}

/// Serve the intake flow until Ctrl-C.
pub async fn run(config: &BotConfig) -> Result<(), IntakeError> {
    let flow = Arc::new(IntakeFlow::from_config(config)?);
    let bot = Bot::new(&config.bot_token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Could not register bot commands: {}", e);
    }

    info!(
        "Starting the bot (uploads in {})",
        flow.store().root().display()
    );

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<Session>::new(), flow])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
