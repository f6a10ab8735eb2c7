use eframe::egui;
use tracing::info;

use crate::config::Config;
use crate::dispatch::{self, Dispatch, Reply};
use crate::llmclient::LLMClient;
use crate::mode::Mode;
use crate::setup::SetupDialog;
use crate::theme;

pub const INTRO_MESSAGE: &str = "👋 Hi, I’m Kyanos — a calm, clear study assistant.\n\n\
Ask questions, generate notes, quizzes, or flashcards anytime ✨";
pub const GENERATING: &str = "Generating…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Kyanos,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }
}

pub struct ChatView {
    pub input: String,
    pub messages: Vec<ChatMessage>,
    pub pending: Option<Dispatch>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self {
            input: String::new(),
            messages: vec![ChatMessage::new(Sender::Kyanos, INTRO_MESSAGE)],
            pending: None,
        }
    }
}

impl ChatView {
    /// Moves the input into the transcript. Returns the prompt to send.
    pub fn begin_send(&mut self) -> Option<String> {
        let text = self.input.trim().to_string();
        // An unpolled reply still occupies the slot.
        if text.is_empty() || self.pending.is_some() {
            return None;
        }
        self.messages.push(ChatMessage::new(Sender::User, text.clone()));
        self.input.clear();
        Some(text)
    }

    pub fn finish(&mut self, reply: Reply) {
        let message = match reply {
            Ok(text) => ChatMessage::new(Sender::Kyanos, text),
            Err(error) => ChatMessage::new(Sender::Error, error),
        };
        self.messages.push(message);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map_or(false, Dispatch::is_pending)
    }

    pub fn process_reply(&mut self) -> bool {
        match dispatch::poll(&mut self.pending) {
            Some(reply) => {
                self.finish(reply);
                true
            }
            None => false,
        }
    }
}

/// Notes, quiz or flashcards panel.
pub struct ContentView {
    pub mode: Mode,
    pub topic: String,
    pub output: String,
    pub pending: Option<Dispatch>,
}

impl ContentView {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            topic: String::new(),
            output: String::new(),
            pending: None,
        }
    }

    pub fn begin_generate(&mut self) -> Option<String> {
        let topic = self.topic.trim();
        if topic.is_empty() || self.pending.is_some() {
            return None;
        }
        let prompt = self.mode.prompt(topic);
        self.output = GENERATING.to_string();
        Some(prompt)
    }

    pub fn finish(&mut self, reply: Reply) {
        self.output = match reply {
            Ok(text) => text,
            Err(error) => error,
        };
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map_or(false, Dispatch::is_pending)
    }

    pub fn process_reply(&mut self) -> bool {
        match dispatch::poll(&mut self.pending) {
            Some(reply) => {
                self.finish(reply);
                true
            }
            None => false,
        }
    }
}

pub fn spawn_completion(
    client: &LLMClient,
    mode: Mode,
    prompt: String,
    ctx: Option<egui::Context>,
) -> Dispatch {
    let client = client.clone();
    let system = mode.system();
    let name = format!("kyanos_{}", mode.label().to_lowercase());
    Dispatch::spawn(&name, ctx, async move { client.complete(system, &prompt).await })
}

pub struct ChatApp {
    pub config: Config,
    pub client: Option<LLMClient>,
    pub setup: Option<SetupDialog>,
    pub active: Mode,
    pub chat: ChatView,
    pub notes: ContentView,
    pub quiz: ContentView,
    pub flashcards: ContentView,
}

impl ChatApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, api_key: Option<String>) -> Self {
        theme::apply(&cc.egui_ctx);
        Self::with_key(config, api_key)
    }

    pub fn with_key(config: Config, api_key: Option<String>) -> Self {
        let client = api_key.map(|key| LLMClient::from_config(key, &config));
        let setup = match client {
            Some(_) => None,
            None => Some(SetupDialog::default()),
        };

        Self {
            config,
            client,
            setup,
            active: Mode::Chat,
            chat: ChatView::default(),
            notes: ContentView::new(Mode::Notes),
            quiz: ContentView::new(Mode::Quiz),
            flashcards: ContentView::new(Mode::Flashcards),
        }
    }

    pub fn finish_setup(&mut self, api_key: String) {
        info!(model = %self.config.model(), "Setup complete");
        self.client = Some(LLMClient::from_config(api_key, &self.config));
        self.setup = None;
        self.active = Mode::Chat;
    }

    pub fn switch_to(&mut self, mode: Mode) {
        self.active = mode;
    }

    pub fn content_view_mut(&mut self, mode: Mode) -> Option<&mut ContentView> {
        match mode {
            Mode::Chat => None,
            Mode::Notes => Some(&mut self.notes),
            Mode::Quiz => Some(&mut self.quiz),
            Mode::Flashcards => Some(&mut self.flashcards),
        }
    }

    pub fn is_pending(&self, mode: Mode) -> bool {
        match mode {
            Mode::Chat => self.chat.is_pending(),
            Mode::Notes => self.notes.is_pending(),
            Mode::Quiz => self.quiz.is_pending(),
            Mode::Flashcards => self.flashcards.is_pending(),
        }
    }

    pub fn any_pending(&self) -> bool {
        Mode::ALL.iter().any(|mode| self.is_pending(*mode))
    }

    pub fn send_message(&mut self, ctx: &egui::Context) {
        let Some(client) = &self.client else {
            return;
        };
        if let Some(prompt) = self.chat.begin_send() {
            self.chat.pending = Some(spawn_completion(
                client,
                Mode::Chat,
                prompt,
                Some(ctx.clone()),
            ));
        }
    }

    pub fn generate(&mut self, mode: Mode, ctx: &egui::Context) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let Some(view) = self.content_view_mut(mode) else {
            return;
        };
        if let Some(prompt) = view.begin_generate() {
            view.pending = Some(spawn_completion(&client, mode, prompt, Some(ctx.clone())));
        }
    }

    /// Hands finished replies to the views that asked, visible or not.
    pub fn process_replies(&mut self) -> bool {
        let mut changed = self.chat.process_reply();
        for view in [&mut self.notes, &mut self.quiz, &mut self.flashcards] {
            changed |= view.process_reply();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for<F: FnMut() -> bool>(mut done: F) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "timed out waiting for dispatch");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn fake(result: anyhow::Result<String>) -> Dispatch {
        Dispatch::spawn("test_fake", None, async move { result })
    }

    #[test]
    fn chat_starts_with_intro_only() {
        let chat = ChatView::default();
        assert_eq!(chat.messages, vec![ChatMessage::new(Sender::Kyanos, INTRO_MESSAGE)]);
        assert!(!chat.is_pending());
    }

    #[test]
    fn blank_chat_input_is_ignored() {
        let mut chat = ChatView::default();
        chat.input = "   \n".to_string();
        assert_eq!(chat.begin_send(), None);
        assert_eq!(chat.messages.len(), 1);
    }

    #[test]
    fn chat_send_appends_user_message_and_reply() {
        let mut chat = ChatView::default();
        chat.input = "  What is osmosis? ".to_string();

        let prompt = chat.begin_send().expect("prompt");
        assert_eq!(prompt, "What is osmosis?");
        assert!(chat.input.is_empty());
        assert_eq!(chat.messages[1], ChatMessage::new(Sender::User, "What is osmosis?"));

        chat.pending = Some(fake(Ok("Water moving across a membrane.".to_string())));
        wait_for(|| chat.process_reply());

        assert!(!chat.is_pending());
        assert_eq!(
            chat.messages[2],
            ChatMessage::new(Sender::Kyanos, "Water moving across a membrane.")
        );
    }

    #[test]
    fn chat_error_is_shown_as_error_message() {
        let mut chat = ChatView::default();
        chat.input = "hi".to_string();
        chat.begin_send().expect("prompt");

        chat.pending = Some(fake(Err(anyhow::anyhow!("timed out"))));
        wait_for(|| chat.process_reply());

        assert_eq!(
            chat.messages.last(),
            Some(&ChatMessage::new(Sender::Error, "❌ Error: timed out"))
        );
    }

    #[test]
    fn chat_refuses_second_send_while_pending() {
        let mut chat = ChatView::default();
        chat.input = "first".to_string();
        chat.begin_send().expect("prompt");

        let (tx, rx) = std::sync::mpsc::channel::<()>();
        chat.pending = Some(Dispatch::spawn("test_block", None, async move {
            rx.recv().ok();
            Ok("ok".to_string())
        }));

        chat.input = "second".to_string();
        assert_eq!(chat.begin_send(), None);
        assert_eq!(chat.input, "second");

        tx.send(()).unwrap();
        wait_for(|| chat.process_reply());
        assert_eq!(chat.begin_send().as_deref(), Some("second"));
    }

    #[test]
    fn content_generate_sets_placeholder_and_prompt() {
        let mut quiz = ContentView::new(Mode::Quiz);
        quiz.topic = " cell biology ".to_string();

        let prompt = quiz.begin_generate().expect("prompt");
        assert_eq!(
            prompt,
            "Create 5 MCQs on cell biology with options and correct answers."
        );
        assert_eq!(quiz.output, GENERATING);
        assert_eq!(quiz.topic, " cell biology ");

        quiz.pending = Some(fake(Ok("1. What is a cell?".to_string())));
        wait_for(|| quiz.process_reply());
        assert_eq!(quiz.output, "1. What is a cell?");
    }

    #[test]
    fn finished_but_unpolled_reply_is_not_pending_and_not_overwritten() {
        let mut notes = ContentView::new(Mode::Notes);
        notes.topic = "tides".to_string();
        notes.begin_generate().expect("prompt");
        notes.pending = Some(fake(Ok("Tides follow the moon.".to_string())));

        wait_for(|| !notes.is_pending());
        assert_eq!(notes.begin_generate(), None);
        assert_eq!(notes.output, GENERATING);

        assert!(notes.process_reply());
        assert_eq!(notes.output, "Tides follow the moon.");
        assert!(!notes.is_pending());
    }

    #[test]
    fn content_blank_topic_is_ignored() {
        let mut notes = ContentView::new(Mode::Notes);
        notes.output = "previous notes".to_string();
        notes.topic = "   ".to_string();

        assert_eq!(notes.begin_generate(), None);
        assert_eq!(notes.output, "previous notes");
    }

    #[test]
    fn content_error_replaces_output() {
        let mut cards = ContentView::new(Mode::Flashcards);
        cards.topic = "verbs".to_string();
        cards.begin_generate().expect("prompt");

        cards.pending = Some(fake(Err(anyhow::anyhow!("Request failed with status 429"))));
        wait_for(|| cards.process_reply());
        assert_eq!(cards.output, "❌ Error: Request failed with status 429");
    }

    #[test]
    fn app_without_key_starts_in_setup() {
        let app = ChatApp::with_key(Config::default(), None);
        assert!(app.setup.is_some());
        assert!(app.client.is_none());
        assert_eq!(app.active, Mode::Chat);
    }

    #[test]
    fn app_with_key_skips_setup() {
        let app = ChatApp::with_key(Config::default(), Some("sk-abc".to_string()));
        assert!(app.setup.is_none());
        assert!(app.client.is_some());
    }

    #[test]
    fn finishing_setup_builds_client_and_shows_chat() {
        let config = Config {
            model: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        let mut app = ChatApp::with_key(config, None);
        app.finish_setup("sk-new".to_string());

        assert!(app.setup.is_none());
        assert_eq!(app.client.as_ref().map(|c| c.model()), Some("gpt-4o"));
        assert_eq!(app.active, Mode::Chat);
    }

    #[test]
    fn replies_reach_hidden_views() {
        let mut app = ChatApp::with_key(Config::default(), Some("sk-abc".to_string()));

        app.switch_to(Mode::Notes);
        app.notes.topic = "fractions".to_string();
        app.notes.begin_generate().expect("prompt");
        app.notes.pending = Some(fake(Ok("Fractions are parts of a whole.".to_string())));
        assert!(app.notes.pending.is_some());

        app.switch_to(Mode::Quiz);
        wait_for(|| app.process_replies());

        assert_eq!(app.active, Mode::Quiz);
        assert_eq!(app.notes.output, "Fractions are parts of a whole.");
        assert!(app.quiz.output.is_empty());
        assert!(!app.any_pending());
    }

    #[test]
    fn each_content_mode_has_its_own_view() {
        let mut app = ChatApp::with_key(Config::default(), None);
        assert!(app.content_view_mut(Mode::Chat).is_none());
        for mode in [Mode::Notes, Mode::Quiz, Mode::Flashcards] {
            assert_eq!(app.content_view_mut(mode).map(|v| v.mode), Some(mode));
        }
    }
}
