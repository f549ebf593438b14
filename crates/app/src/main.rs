mod commands;
mod render;

use anyhow::{Context, Result};
use commands::Command;
use gateway::{Attachment, Gateway, RejectReason, TurnInput, TurnOutcome, TurnStatus};
use providers::gemini::GeminiClient;
use services::{ConversationStore, JsonFileStorage};
use shared::settings::AppSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// How long `/quit` waits for title summaries still in flight.
const TITLE_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

struct App {
    gateway: Gateway,
    pending_titles: Vec<JoinHandle<()>>,
}

impl App {
    fn store(&self) -> &ConversationStore {
        self.gateway.store()
    }

    /// Resolve a 1-based list index to a conversation id.
    fn conversation_at(&self, n: usize) -> Option<String> {
        self.store()
            .snapshot()
            .conversations
            .get(n - 1)
            .map(|c| c.id.clone())
    }

    fn show_current(&self) {
        match self.store().current() {
            Some(conv) => {
                println!("== {} ==", conv.title);
                for msg in &conv.messages {
                    println!("{}", render::message(msg));
                }
            }
            None => println!("Aucune conversation sélectionnée."),
        }
    }

    fn report(&mut self, outcome: TurnOutcome) {
        if let Some(task) = outcome.retitle {
            self.pending_titles.push(task);
        }
        self.pending_titles.retain(|t| !t.is_finished());

        match outcome.status {
            TurnStatus::Rejected(RejectReason::Empty) => {}
            TurnStatus::Rejected(RejectReason::Busy) => println!("Une réponse est déjà en cours."),
            TurnStatus::Replied | TurnStatus::Failed => {
                if let Some(reply) = outcome.reply {
                    println!("{}", render::message(&reply));
                }
            }
        }
    }

    /// Returns `false` when the loop should stop.
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::New => {
                self.store().add_conversation();
                println!("Nouvelle conversation créée.");
            }
            Command::List => println!("{}", render::conversation_list(&self.store().snapshot())),
            Command::Select(n) => match self.conversation_at(n) {
                Some(id) => {
                    self.store().select_conversation(&id);
                    self.show_current();
                }
                None => println!("Pas de conversation n°{}.", n),
            },
            Command::Delete(n) => match self.conversation_at(n) {
                Some(id) => {
                    self.store().delete_conversation(&id);
                    println!("Conversation supprimée.");
                }
                None => println!("Pas de conversation n°{}.", n),
            },
            Command::Rename(n, title) => match self.conversation_at(n) {
                Some(id) => self.store().edit_conversation(&id, &title),
                None => println!("Pas de conversation n°{}.", n),
            },
            Command::Models => println!("{}", render::model_list(self.store().selected_model())),
            Command::Model(model) => {
                self.store().set_selected_model(model);
                println!("Modèle: {}", model.display_name());
            }
            Command::Attach { path, text } => match Attachment::from_path(&path) {
                Ok(attachment) => {
                    let outcome = self
                        .gateway
                        .submit(TurnInput::text(text).with_attachment(attachment))
                        .await;
                    self.report(outcome);
                }
                Err(e) => println!("{}", e),
            },
            Command::Image(prompt) => {
                let outcome = self.gateway.submit_image_request(&prompt).await;
                self.report(outcome);
            }
            Command::Help => println!("{}", commands::HELP),
            Command::Quit => return false,
            Command::Say(text) => {
                let outcome = self.gateway.submit(TurnInput::text(text)).await;
                self.report(outcome);
            }
        }
        true
    }

    async fn drain_titles(&mut self) {
        for task in self.pending_titles.drain(..) {
            if tokio::time::timeout(TITLE_DRAIN_TIMEOUT, task).await.is_err() {
                tracing::warn!("title generation still running at exit, dropping it");
            }
        }
    }
}

/// A first launch starts with one empty conversation. An existing list is
/// left alone even when nothing is selected.
fn ensure_conversation(store: &ConversationStore) {
    if store.snapshot().conversations.is_empty() {
        store.add_conversation();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = AppSettings::load().context("failed to load settings")?;
    if settings.api_key.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("no Gemini API key configured; set GEMINI_API_KEY or api_key in settings.json");
    }

    let data_dir = settings.resolve_data_dir()?;
    let storage = JsonFileStorage::new(&data_dir);
    tracing::info!(path = %storage.path().display(), "using conversation storage");
    let store = Arc::new(ConversationStore::open(Box::new(storage)));

    let client = GeminiClient::from_settings(&settings)?;
    let gateway = Gateway::new(Arc::new(client), store).with_creator_attribution(settings.creator_attribution.clone());

    ensure_conversation(gateway.store());

    let mut app = App {
        gateway,
        pending_titles: Vec::new(),
    };

    println!("LightChat ({}). Tapez /help pour l'aide.", app.store().selected_model().display_name());
    app.show_current();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match commands::parse(&line) {
            Ok(command) => {
                if !app.handle(command).await {
                    break;
                }
            }
            Err(msg) => println!("{}", msg),
        }
    }

    app.drain_titles().await;
    Ok(())
}
