//! Analysis panel: intents, probabilities, tokens and the vector sample

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;
use vintent_session::AnalysisView;
use vintent_session::panel::{
    BPE_TITLE, INTENTS_TITLE, PROBABILITIES_TITLE, ProbabilityBar, Section, TOKENS_TITLE,
    TokenChip, VECTOR_TITLE,
};

/// Shown before the first successful analysis
pub const EMPTY_STATE: &str = "Send an utterance to see its analysis";

const LABEL_WIDTH: usize = 14;

/// Right-hand panel widget
pub struct AnalysisPanel<'a> {
    view: Option<&'a AnalysisView>,
    theme: &'a Theme,
}

impl<'a> AnalysisPanel<'a> {
    pub fn new(view: Option<&'a AnalysisView>, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    fn title(&self, text: &'static str) -> Line<'static> {
        Line::from(Span::styled(text, self.theme.accent_bold()))
    }

    fn placeholder(&self, text: &'static str) -> Line<'static> {
        Line::from(Span::styled(
            format!("  {}", text),
            self.theme.dim_style().add_modifier(Modifier::ITALIC),
        ))
    }

    fn bar_line(&self, bar: &ProbabilityBar, width: usize) -> Line<'static> {
        let percent = bar.percent_label();
        let label = fit(&bar.label, LABEL_WIDTH);
        // "  " + label + " " + bar + " " + percent
        let bar_width = width.saturating_sub(2 + LABEL_WIDTH + 2 + percent.len());
        let filled = ((bar.width_percent() / 100.0) * bar_width as f64).round() as usize;
        let filled = filled.min(bar_width);

        Line::from(vec![
            Span::styled(format!("  {} ", label), self.theme.base_style()),
            Span::styled("█".repeat(filled), Style::default().fg(self.theme.bar)),
            Span::styled(
                "░".repeat(bar_width - filled),
                self.theme.dim_style(),
            ),
            Span::styled(format!(" {}", percent), self.theme.base_style()),
        ])
    }

    fn chip_lines(&self, chips: &[TokenChip], width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut current: Vec<Span<'static>> = vec![Span::raw("  ")];
        let mut used = 2;

        for chip in chips {
            let chip_width = chip.text.width();
            if used > 2 && used + 1 + chip_width > width {
                lines.push(Line::from(std::mem::replace(
                    &mut current,
                    vec![Span::raw("  ")],
                )));
                used = 2;
            }
            if used > 2 {
                current.push(Span::raw(" "));
                used += 1;
            }
            current.push(Span::styled(
                chip.text.clone(),
                self.theme.token_style(chip.style),
            ));
            used += chip_width;
        }

        if used > 2 {
            lines.push(Line::from(current));
        }
        lines
    }

    fn chip_section(
        &self,
        lines: &mut Vec<Line<'static>>,
        title: &'static str,
        section: &Section<TokenChip>,
        width: usize,
    ) {
        lines.push(self.title(title));
        match section.placeholder() {
            Some(text) => lines.push(self.placeholder(text)),
            None => lines.extend(self.chip_lines(section.items(), width)),
        }
        lines.push(Line::from(""));
    }

    /// Panel contents at the given inner width
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let Some(view) = self.view else {
            return vec![self.placeholder(EMPTY_STATE)];
        };

        let mut lines = Vec::new();

        lines.push(self.title(INTENTS_TITLE));
        let mut tags = vec![Span::raw("  ")];
        for (i, tag) in view.intents.iter().enumerate() {
            if i > 0 {
                tags.push(Span::raw(" "));
            }
            let style = if tag.is_none {
                self.theme.dim_style()
            } else {
                self.theme.success_style().add_modifier(Modifier::BOLD)
            };
            tags.push(Span::styled(format!("[{}]", tag.label), style));
        }
        lines.push(Line::from(tags));
        lines.push(Line::from(""));

        lines.push(self.title(PROBABILITIES_TITLE));
        match view.probabilities.placeholder() {
            Some(text) => lines.push(self.placeholder(text)),
            None => {
                for bar in view.probabilities.items() {
                    lines.push(self.bar_line(bar, width));
                }
            }
        }
        lines.push(Line::from(""));

        self.chip_section(&mut lines, TOKENS_TITLE, &view.tokens, width);
        self.chip_section(&mut lines, BPE_TITLE, &view.bpe_tokens, width);

        lines.push(self.title(VECTOR_TITLE));
        match (view.vector_text(), view.vector.placeholder()) {
            (Some(text), _) => {
                for line in textwrap::wrap(&text, width.saturating_sub(2).max(1)) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", line),
                        self.theme.base_style(),
                    )));
                }
            }
            (None, Some(text)) => lines.push(self.placeholder(text)),
            (None, None) => {}
        }

        lines
    }
}

/// Pad or truncate to exactly `width` columns
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.to_string().width();
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

impl Widget for AnalysisPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(" Analysis ", self.theme.accent_bold()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        Paragraph::new(self.lines(inner.width as usize)).render(inner, buf);
    }
}
