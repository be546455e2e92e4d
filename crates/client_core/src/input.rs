pub const DEFAULT_MAX_QUESTION_CHARS: usize = 2000;
pub const NO_FILE_PLACEHOLDER: &str = "Upload a PDF first...";
pub const QUESTION_PLACEHOLDERS: [&str; 4] = [
    "What's the main topic of this document?",
    "Summarize the key findings...",
    "Explain the methodology used...",
    "What are the conclusions?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputKey {
    pub key: Key,
    pub shift: bool,
}

impl InputKey {
    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
        }
    }

    pub fn shift_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: true,
        }
    }

    /// Enter submits; Shift+Enter does not.
    pub fn is_submit(&self) -> bool {
        self.key == Key::Enter && !self.shift
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionCheck<'a> {
    Blank,
    TooLong { max: usize },
    Accepted(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionBounds {
    pub max_chars: usize,
}

impl Default for QuestionBounds {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_QUESTION_CHARS,
        }
    }
}

impl QuestionBounds {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn check<'a>(&self, question: &'a str) -> QuestionCheck<'a> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            QuestionCheck::Blank
        } else if trimmed.chars().count() > self.max_chars {
            QuestionCheck::TooLong {
                max: self.max_chars,
            }
        } else {
            QuestionCheck::Accepted(trimmed)
        }
    }
}

pub fn too_long_message(max: usize) -> String {
    format!("Question is too long (maximum {max} characters)")
}

/// Round-robin over [`QUESTION_PLACEHOLDERS`] while a document is active.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderRotation {
    next: usize,
}

impl PlaceholderRotation {
    pub fn next(&mut self, file_active: bool) -> &'static str {
        if !file_active {
            return NO_FILE_PLACEHOLDER;
        }
        let placeholder = QUESTION_PLACEHOLDERS[self.next % QUESTION_PLACEHOLDERS.len()];
        self.next = self.next.wrapping_add(1);
        placeholder
    }
}
