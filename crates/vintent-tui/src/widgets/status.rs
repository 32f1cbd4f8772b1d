//! Status line: connection indicator, character count and key help

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use vintent_session::ConnectionState;

pub const KEY_HELP: &str = "Enter send · Ctrl+L clear · PgUp/PgDn scroll · Esc quit";

/// Coloured dot plus connection label
pub struct ConnectionIndicator<'a> {
    state: &'a ConnectionState,
    theme: &'a Theme,
    char_count: usize,
    /// Transient note such as a retry notice
    note: Option<&'a str>,
}

impl<'a> ConnectionIndicator<'a> {
    pub fn new(state: &'a ConnectionState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            char_count: 0,
            note: None,
        }
    }

    pub fn char_count(mut self, count: usize) -> Self {
        self.char_count = count;
        self
    }

    pub fn note(mut self, note: Option<&'a str>) -> Self {
        self.note = note;
        self
    }

    pub fn line(&self) -> Line<'static> {
        let sep = Span::styled("  │  ", self.theme.dim_style());
        let mut spans = vec![
            Span::styled(
                "● ",
                Style::default().fg(self.theme.connection_color(self.state)),
            ),
            Span::styled(self.state.label(), self.theme.base_style()),
            sep.clone(),
            Span::styled(
                format!("{} chars", self.char_count),
                self.theme.dim_style(),
            ),
        ];
        if let Some(note) = self.note {
            spans.push(sep.clone());
            spans.push(Span::styled(note.to_string(), self.theme.warning_style()));
        }
        spans.push(sep);
        spans.push(Span::styled(KEY_HELP, self.theme.dim_style()));
        Line::from(spans)
    }
}

impl Widget for ConnectionIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }
}
