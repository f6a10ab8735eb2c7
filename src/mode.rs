pub const CHAT_SYSTEM: &str = "You are Kyanos, a calm, clear, helpful study assistant.";
pub const EDUCATOR_SYSTEM: &str = "You are an expert educator.";

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Mode {
    Chat,
    Notes,
    Quiz,
    Flashcards,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Chat, Mode::Notes, Mode::Quiz, Mode::Flashcards];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Chat => "Chat",
            Mode::Notes => "Notes",
            Mode::Quiz => "Quiz",
            Mode::Flashcards => "Flashcards",
        }
    }

    pub fn system(&self) -> &'static str {
        match self {
            Mode::Chat => CHAT_SYSTEM,
            Mode::Notes | Mode::Quiz | Mode::Flashcards => EDUCATOR_SYSTEM,
        }
    }

    /// Builds the user prompt. Chat passes the message through untouched.
    pub fn prompt(&self, topic: &str) -> String {
        match self {
            Mode::Chat => topic.to_string(),
            Mode::Notes => format!("Create concise, well-structured study notes on {}.", topic),
            Mode::Quiz => format!("Create 5 MCQs on {} with options and correct answers.", topic),
            Mode::Flashcards => format!("Create flashcards on {} in Q&A format.", topic),
        }
    }
}
