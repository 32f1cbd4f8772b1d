//! Single-line utterance input

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Editable line of text with a character cursor
#[derive(Debug, Default)]
pub struct InputBox {
    chars: Vec<char>,
    cursor: usize,
    placeholder: String,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Take the text out, leaving the box empty
    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Apply an editing action. Returns whether anything changed.
    pub fn handle_action(&mut self, action: &Action) -> bool {
        match action {
            Action::Char(c) => {
                self.insert(*c);
                true
            }
            Action::Paste(text) => {
                let before = self.chars.len();
                for c in text.chars() {
                    match c {
                        '\r' => {}
                        '\n' | '\t' => {
                            if self.cursor > 0 && self.chars[self.cursor - 1] != ' ' {
                                self.insert(' ');
                            }
                        }
                        c if c.is_control() => {}
                        c => self.insert(c),
                    }
                }
                self.chars.len() != before
            }
            Action::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
                true
            }
            Action::Delete if self.cursor < self.chars.len() => {
                self.chars.remove(self.cursor);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < self.chars.len() => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = self.chars.len();
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord if self.cursor > 0 => {
                let mut start = self.cursor;
                while start > 0 && self.chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                while start > 0 && !self.chars[start - 1].is_whitespace() {
                    start -= 1;
                }
                self.chars.drain(start..self.cursor);
                self.cursor = start;
                true
            }
            _ => false,
        }
    }

    /// First visible char so the cursor fits in `width` columns
    fn view_start(&self, width: usize) -> usize {
        if width == 0 {
            return self.cursor;
        }
        let mut start = self.cursor;
        // one column is reserved for the cursor cell
        let mut used = 1;
        while start > 0 {
            let w = self.chars[start - 1].width().unwrap_or(0);
            if used + w > width {
                break;
            }
            used += w;
            start -= 1;
        }
        start
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.accent_style())
            .title(Span::styled(" Utterance ", theme.dim_style()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.chars.is_empty() {
            Paragraph::new(self.placeholder.as_str())
                .style(theme.dim_style())
                .render(inner, buf);
        } else {
            let width = inner.width as usize;
            let start = self.view_start(width);
            let mut visible = String::new();
            let mut used = 0;
            for c in &self.chars[start..] {
                let w = c.width().unwrap_or(0);
                if used + w > width {
                    break;
                }
                visible.push(*c);
                used += w;
            }
            Paragraph::new(visible)
                .style(theme.base_style())
                .render(inner, buf);
        }

        let cursor_x: usize = self.chars[self.view_start(inner.width as usize)..self.cursor]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        if cursor_x < inner.width as usize {
            if let Some(cell) = buf.cell_mut((inner.x + cursor_x as u16, inner.y)) {
                cell.set_style(Style::default().bg(theme.accent));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::test_util::buffer_lines;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c));
        }
        input
    }

    #[test]
    fn test_vietnamese_char_count() {
        let input = typed("đặt bàn");
        assert_eq!(input.char_count(), 7);
        assert_eq!(input.text(), "đặt bàn");
    }

    #[test]
    fn test_edit_in_middle() {
        let mut input = typed("bun");
        input.handle_action(&Action::Left);
        input.handle_action(&Action::Backspace);
        input.handle_action(&Action::Char('ú'));
        assert_eq!(input.text(), "bún");
        assert_eq!(input.cursor(), 2);

        input.handle_action(&Action::Home);
        input.handle_action(&Action::Delete);
        assert_eq!(input.text(), "ún");
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut input = InputBox::new();
        assert!(!input.handle_action(&Action::Backspace));
        assert!(!input.handle_action(&Action::Left));
        assert!(!input.handle_action(&Action::Delete));
        assert!(!input.handle_action(&Action::Submit));
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("tôi muốn  ");
        input.handle_action(&Action::DeleteWord);
        assert_eq!(input.text(), "tôi ");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("ăn\r\nbún\x1b".into()));
        assert_eq!(input.text(), "ăn bún");
    }

    #[test]
    fn test_take_empties() {
        let mut input = typed("xin chào");
        assert_eq!(input.take(), "xin chào");
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_render_placeholder_and_scrolled_text() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 12, 3);

        let mut buf = Buffer::empty(area);
        InputBox::new()
            .with_placeholder("Nhập câu")
            .render(area, &mut buf, &theme);
        assert!(buffer_lines(&buf)[1].contains("Nhập câu"));

        let mut buf = Buffer::empty(area);
        typed("abcdefghijklmnop").render(area, &mut buf, &theme);
        // 10 inner columns, one kept for the cursor
        assert!(buffer_lines(&buf)[1].contains("hijklmnop"));
        assert!(!buffer_lines(&buf)[1].contains("abc"));
    }
}
