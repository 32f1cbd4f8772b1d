//! Color theme support

use ratatui::style::{Color, Modifier, Style};
use vintent_session::{ConnectionState, TokenStyle};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (user messages, titles)
    pub accent: Color,
    /// Error color
    pub error: Color,
    /// Success color
    pub success: Color,
    /// Warning color
    pub warning: Color,
    /// Border color
    pub border: Color,
    /// Probability bar fill
    pub bar: Color,
    /// Special BPE tokens (`<s>`, `</s>`)
    pub special_token: Color,
    /// Subword continuation tokens
    pub subword_token: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            border: Color::DarkGray,
            bar: Color::Blue,
            special_token: Color::Magenta,
            subword_token: Color::Yellow,
        }
    }

    /// Get base style
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get dimmed style
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    /// Get accent style
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Get bold accent style
    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get error style
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Get success style
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Get warning style
    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Get border style
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Style for a token chip
    pub fn token_style(&self, style: TokenStyle) -> Style {
        match style {
            TokenStyle::Default => self.base_style(),
            TokenStyle::Special => Style::default()
                .fg(self.special_token)
                .add_modifier(Modifier::BOLD),
            TokenStyle::Subword => Style::default()
                .fg(self.subword_token)
                .add_modifier(Modifier::ITALIC),
        }
    }

    /// Color of the connection dot
    pub fn connection_color(&self, state: &ConnectionState) -> Color {
        match state {
            ConnectionState::Connecting => self.warning,
            ConnectionState::Connected { .. } => self.success,
            ConnectionState::Disconnected => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_colors_distinct() {
        let theme = Theme::dark();
        let connecting = theme.connection_color(&ConnectionState::Connecting);
        let connected = theme.connection_color(&ConnectionState::Connected { device: None });
        let disconnected = theme.connection_color(&ConnectionState::Disconnected);
        assert_ne!(connecting, connected);
        assert_ne!(connected, disconnected);
        assert_eq!(disconnected, theme.error);
    }

    #[test]
    fn test_token_styles_distinct() {
        let theme = Theme::dark();
        let special = theme.token_style(TokenStyle::Special);
        let subword = theme.token_style(TokenStyle::Subword);
        assert_eq!(special.fg, Some(theme.special_token));
        assert_eq!(subword.fg, Some(theme.subword_token));
        assert_ne!(theme.token_style(TokenStyle::Default), special);
    }
}
