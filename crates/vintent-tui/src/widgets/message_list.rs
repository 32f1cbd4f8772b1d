//! Conversation log widget

use crate::theme::Theme;
use crate::widgets::spinner::SPINNER_FRAMES;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use vintent_session::{ConversationEntry, EntryKind, Role};

/// Text shown next to the spinner while an analysis is in flight
pub const LOADING_LABEL: &str = "Analyzing...";

const INDENT: &str = "  ";

/// Widget for displaying the conversation, newest at the bottom
pub struct MessageList<'a> {
    entries: &'a [ConversationEntry],
    theme: &'a Theme,
    /// Lines scrolled back from the bottom
    scroll_back: usize,
    spinner_frame: &'static str,
}

impl<'a> MessageList<'a> {
    pub fn new(entries: &'a [ConversationEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            theme,
            scroll_back: 0,
            spinner_frame: SPINNER_FRAMES[0],
        }
    }

    /// Scroll back from the newest line
    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    /// Frame drawn in front of the loading placeholder
    pub fn spinner_frame(mut self, frame: &'static str) -> Self {
        self.spinner_frame = frame;
        self
    }

    fn header(&self, entry: &ConversationEntry) -> Line<'static> {
        let (prefix, name, style) = match entry.role {
            Role::User => ("▶ ", "You", self.theme.accent_bold()),
            Role::Assistant => (
                "◀ ",
                "Assistant",
                self.theme.success_style().add_modifier(Modifier::BOLD),
            ),
            Role::System => ("● ", "System", self.theme.dim_style()),
        };

        Line::from(vec![
            Span::styled(format!("{}{}", prefix, name), style),
            Span::styled(format!(" · {}", entry.time_label()), self.theme.dim_style()),
        ])
    }

    fn content_style(&self, entry: &ConversationEntry) -> Style {
        match entry.kind {
            EntryKind::Error => self.theme.error_style(),
            EntryKind::Warning => self.theme.warning_style(),
            EntryKind::Loading => self.theme.accent_style(),
            EntryKind::Message if entry.role == Role::System => self.theme.dim_style(),
            EntryKind::Message => self.theme.base_style(),
        }
    }

    fn render_entry(&self, entry: &ConversationEntry, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![self.header(entry)];
        let style = self.content_style(entry);

        if entry.is_loading() {
            lines.push(Line::from(Span::styled(
                format!("{}{} {}", INDENT, self.spinner_frame, LOADING_LABEL),
                style,
            )));
        } else {
            for line in wrap_content(&entry.content, width) {
                lines.push(Line::from(Span::styled(format!("{}{}", INDENT, line), style)));
            }
        }

        lines.push(Line::from(""));
        lines
    }

    /// All lines for the current entries at the given inner width
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        self.entries
            .iter()
            .flat_map(|entry| self.render_entry(entry, width))
            .collect()
    }
}

fn wrap_content(content: &str, width: usize) -> Vec<String> {
    let content_width = width.saturating_sub(INDENT.len()).max(1);
    textwrap::wrap(content, content_width)
        .into_iter()
        .map(|cow| cow.into_owned())
        .collect()
}

/// Number of lines the entries occupy at the given inner width
pub fn calculate_message_height(entries: &[ConversationEntry], width: usize) -> usize {
    entries
        .iter()
        .map(|entry| {
            let body = if entry.is_loading() {
                1
            } else {
                wrap_content(&entry.content, width).len()
            };
            // header + body + separator
            body + 2
        })
        .sum()
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(" Conversation ", self.theme.accent_bold()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.lines(inner.width as usize);
        let height = inner.height as usize;
        let max_back = lines.len().saturating_sub(height);
        let start = max_back - self.scroll_back.min(max_back);

        let visible: Vec<Line> = lines.into_iter().skip(start).take(height).collect();
        Paragraph::new(visible).render(inner, buf);
    }
}
