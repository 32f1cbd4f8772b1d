//! Conversation log: append-only chat entries plus the loading placeholder

use chrono::{DateTime, Local};
use vintent_client::AnalysisResult;

use crate::error::AnalysisError;

/// Handle to a single entry, used to remove the loading placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular message
    Message,
    /// Placeholder shown while an analysis is in flight
    Loading,
    /// Analysis failure
    Error,
    /// Warning that did not start a request
    Warning,
}

/// A rendered chat message
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub id: EntryId,
    pub role: Role,
    pub kind: EntryKind,
    /// Display text, already neutralized
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ConversationEntry {
    /// Local time as `HH:MM`
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    pub fn is_loading(&self) -> bool {
        self.kind == EntryKind::Loading
    }
}

/// Ordered chat log
#[derive(Debug, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&ConversationEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of loading placeholders currently shown
    pub fn loading_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_loading()).count()
    }

    fn push(&mut self, role: Role, kind: EntryKind, content: String) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(ConversationEntry {
            id,
            role,
            kind,
            content,
            timestamp: Local::now(),
        });
        id
    }

    /// Append the user's utterance. Control characters are neutralized.
    pub fn add_user_message(&mut self, text: &str) -> EntryId {
        self.push(Role::User, EntryKind::Message, neutralize(text))
    }

    /// Append the in-flight placeholder and return its handle
    pub fn add_loading_message(&mut self) -> EntryId {
        self.push(Role::Assistant, EntryKind::Loading, String::new())
    }

    /// Remove an entry by handle. Unknown handles are ignored.
    pub fn remove_message(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Append the assistant's reply for a finished analysis
    pub fn add_assistant_message(
        &mut self,
        outcome: Result<&AnalysisResult, &AnalysisError>,
    ) -> EntryId {
        let kind = match outcome {
            Ok(_) => EntryKind::Message,
            Err(_) => EntryKind::Error,
        };
        self.push(Role::Assistant, kind, reply_text(outcome))
    }

    /// Append an informational message (command output)
    pub fn add_system_message(&mut self, text: &str) -> EntryId {
        self.push(Role::System, EntryKind::Message, neutralize(text))
    }

    /// Append a warning that did not start a request
    pub fn add_warning(&mut self, text: &str) -> EntryId {
        self.push(Role::System, EntryKind::Warning, neutralize(text))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Reply text for a finished analysis, neutralized.
pub fn reply_text(outcome: Result<&AnalysisResult, &AnalysisError>) -> String {
    match outcome {
        Err(e) => neutralize(&format!("❌ Error: {}", e)),
        Ok(result) if !result.intents().is_empty() => {
            neutralize(&format!("✅ Detected: {}", result.intents().join(", ")))
        }
        Ok(_) => "✅ Analysis complete".to_string(),
    }
}

/// Make untrusted text safe to print to a terminal.
///
/// Control characters other than newline and tab are replaced by their
/// escaped form, so `ESC [ 2 J` is shown as text instead of clearing the
/// screen.
pub fn neutralize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() && c != '\n' && c != '\t' {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}
