//! Rendering of analysis results for line mode and one-shot mode

use clap::ValueEnum;
use serde_json::json;
use std::fmt::Write;
use vintent_client::AnalysisResult;
use vintent_session::panel::{
    BPE_TITLE, INTENTS_TITLE, PROBABILITIES_TITLE, Section, TOKENS_TITLE, TokenChip, VECTOR_TITLE,
};
use vintent_session::{
    AnalysisError, AnalysisView, ConversationEntry, EntryKind, Role, reply_text,
};

/// Output format for `--command`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Html,
}

/// Width of the text-mode probability bar
const BAR_WIDTH: usize = 20;

/// One conversation entry as a plain line, e.g. `[14:05] You: xin chào`
pub fn entry_line(entry: &ConversationEntry) -> String {
    let who = match entry.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    };
    let content = match entry.kind {
        EntryKind::Loading => "…",
        _ => entry.content.as_str(),
    };
    format!("[{}] {}: {}", entry.time_label(), who, content)
}

/// Analysis panel as plain text
pub fn render_view_text(view: &AnalysisView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}:", INTENTS_TITLE);
    let tags: Vec<String> = view
        .intents
        .iter()
        .map(|tag| format!("[{}]", tag.label))
        .collect();
    let _ = writeln!(out, "  {}", tags.join(" "));

    let _ = writeln!(out, "{}:", PROBABILITIES_TITLE);
    match view.probabilities.placeholder() {
        Some(text) => {
            let _ = writeln!(out, "  {}", text);
        }
        None => {
            let label_width = view
                .probabilities
                .items()
                .iter()
                .map(|bar| bar.label.chars().count())
                .max()
                .unwrap_or(0);
            for bar in view.probabilities.items() {
                let filled = ((bar.width_percent() / 100.0) * BAR_WIDTH as f64).round() as usize;
                let filled = filled.min(BAR_WIDTH);
                let _ = writeln!(
                    out,
                    "  {:<width$} {}{} {:>6}",
                    bar.label,
                    "█".repeat(filled),
                    "░".repeat(BAR_WIDTH - filled),
                    bar.percent_label(),
                    width = label_width
                );
            }
        }
    }

    write_chips_text(&mut out, TOKENS_TITLE, &view.tokens);
    write_chips_text(&mut out, BPE_TITLE, &view.bpe_tokens);

    let _ = writeln!(out, "{}:", VECTOR_TITLE);
    match (view.vector_text(), view.vector.placeholder()) {
        (Some(text), _) => {
            let _ = writeln!(out, "  {}", text);
        }
        (None, Some(text)) => {
            let _ = writeln!(out, "  {}", text);
        }
        (None, None) => {}
    }

    out
}

fn write_chips_text(out: &mut String, title: &str, section: &Section<TokenChip>) {
    let _ = writeln!(out, "{}:", title);
    match section.placeholder() {
        Some(text) => {
            let _ = writeln!(out, "  {}", text);
        }
        None => {
            let chips: Vec<&str> = section.items().iter().map(|c| c.text.as_str()).collect();
            let _ = writeln!(out, "  {}", chips.join(" "));
        }
    }
}

/// Render a finished analysis in the requested format
pub fn render_outcome(
    format: OutputFormat,
    utterance: &str,
    outcome: &Result<AnalysisResult, AnalysisError>,
) -> String {
    match format {
        OutputFormat::Text => match outcome {
            Ok(result) => {
                let view = AnalysisView::from_result(result);
                format!("{}\n\n{}", reply_text(Ok(result)), render_view_text(&view))
            }
            Err(e) => reply_text(Err(e)),
        },
        OutputFormat::Json => {
            let value = match outcome {
                Ok(result) => json!({ "utterance": utterance, "result": result }),
                Err(e) => json!({
                    "utterance": utterance,
                    "error": e.to_string(),
                    "attempts": e.attempts,
                }),
            };
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        }
        OutputFormat::Html => render_html(utterance, outcome),
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// HTML fragment: the user bubble, the reply bubble and the analysis panel
pub fn render_html(utterance: &str, outcome: &Result<AnalysisResult, AnalysisError>) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<div class="message user"><div class="message-bubble">{}</div></div>"#,
        escape_html(utterance)
    );

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            let _ = writeln!(
                out,
                r#"<div class="message assistant error"><div class="message-bubble">{}</div></div>"#,
                escape_html(&reply_text(Err(e)))
            );
            return out;
        }
    };

    let _ = writeln!(
        out,
        r#"<div class="message assistant"><div class="message-bubble">{}</div></div>"#,
        escape_html(&reply_text(Ok(result)))
    );

    let view = AnalysisView::from_result(result);
    out.push_str(r#"<div class="analysis-content">"#);
    out.push('\n');

    let intents: String = view
        .intents
        .iter()
        .map(|tag| {
            let class = if tag.is_none { "intent-tag none" } else { "intent-tag" };
            format!(r#"<span class="{}">{}</span>"#, class, escape_html(&tag.label))
        })
        .collect();
    write_section(&mut out, INTENTS_TITLE, "intent-tags", &intents);

    let probabilities = match view.probabilities.placeholder() {
        Some(text) => format!("<p>{}</p>", text),
        None => view
            .probabilities
            .items()
            .iter()
            .map(|bar| {
                format!(
                    concat!(
                        r#"<div class="probability-item">"#,
                        r#"<span class="probability-label">{}</span>"#,
                        r#"<div class="probability-bar-container">"#,
                        r#"<div class="probability-bar" style="width: {:.1}%"></div></div>"#,
                        r#"<span class="probability-value">{}</span></div>"#
                    ),
                    escape_html(&bar.label),
                    bar.width_percent(),
                    bar.percent_label()
                )
            })
            .collect(),
    };
    write_section(&mut out, PROBABILITIES_TITLE, "probability-list", &probabilities);

    write_section(&mut out, TOKENS_TITLE, "token-display", &chips_html(&view.tokens));
    write_section(&mut out, BPE_TITLE, "token-display", &chips_html(&view.bpe_tokens));

    let vector = match view.vector.placeholder() {
        Some(text) => format!("<p>{}</p>", text),
        None => view
            .vector
            .items()
            .iter()
            .map(|item| {
                format!(
                    r#"<span class="vector-item"><span class="vector-label">{}</span> {}</span>"#,
                    item.index_label(),
                    item.value_label()
                )
            })
            .collect::<Vec<_>>()
            .join(" "),
    };
    write_section(&mut out, VECTOR_TITLE, "vector-display", &vector);

    out.push_str("</div>\n");
    out
}

fn chips_html(section: &Section<TokenChip>) -> String {
    match section.placeholder() {
        Some(text) => format!("<p>{}</p>", text),
        None => section
            .items()
            .iter()
            .map(|chip| {
                format!(
                    r#"<span class="{}">{}</span>"#,
                    chip.style.class_name(),
                    escape_html(&chip.text)
                )
            })
            .collect(),
    }
}

fn write_section(out: &mut String, title: &str, class: &str, body: &str) {
    let _ = writeln!(
        out,
        r#"<div class="analysis-section"><div class="section-header"><h4>{}</h4></div><div class="section-content"><div class="{}">{}</div></div></div>"#,
        escape_html(title),
        class,
        body
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(json: &str) -> AnalysisResult {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
        assert_eq!(escape_html(r#"a & "b" 'c'"#), "a &amp; &quot;b&quot; &#x27;c&#x27;");
    }

    #[test]
    fn test_html_never_contains_raw_markup_from_input() {
        let outcome = Ok(result(
            r#"{"intents":["<b>x</b>"],"debug_info":{"tokenized":["<img src=x>"],"bpe":["<s>"]}}"#,
        ));
        let html = render_html("<script>alert(1)</script>", &outcome);

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>x</b>"));
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"<span class="token special">&lt;s&gt;</span>"#));
    }

    #[test]
    fn test_html_probability_order_and_placeholders() {
        let outcome = Ok(result(
            r#"{"intents":["refund"],"probabilities":{"buy":0.42,"refund":0.9,"none":0.01}}"#,
        ));
        let html = render_html("hoàn tiền", &outcome);

        let refund = html.find("90.0%</span>").unwrap();
        let buy = html.find("42.0%</span>").unwrap();
        let none = html.find(">1.0%</span>").unwrap();
        assert!(refund < buy && buy < none);
        assert!(html.contains("<p>No tokens</p>"));
        assert!(html.contains("<p>No vector data</p>"));
    }

    #[test]
    fn test_text_rendering() {
        let outcome = Ok(result(
            r#"{"intents":[],"probabilities":{"a":0.5},"debug_info":{"bpe":["ăn@@","bún"],"h_cls_sample":[0.5]}}"#,
        ));
        let text = render_outcome(OutputFormat::Text, "ăn bún", &outcome);

        assert!(text.starts_with("✅ Analysis complete"));
        assert!(text.contains("[none]"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("ăn@@ bún"));
        assert!(text.contains("[0] 0.5000"));
        assert!(text.contains("No tokens"));
    }

    #[test]
    fn test_text_output_never_emits_raw_escapes() {
        let outcome = Ok(result(r#"{"intents":["a\u001b[2Jb"],"probabilities":{"a\u001b[2Jb":0.7}}"#));
        let text = render_outcome(OutputFormat::Text, "x", &outcome);
        assert!(!text.contains('\x1b'));
        assert!(text.starts_with("✅ Detected: a\\u{1b}[2Jb"));

        let outcome = Err(AnalysisError {
            attempts: 1,
            source: vintent_client::Error::Status {
                status: 500,
                reason: "\x1b[2JInternal Server Error".into(),
            },
        });
        let text = render_outcome(OutputFormat::Text, "x", &outcome);
        assert!(!text.contains('\x1b'));
        assert_eq!(text, "❌ Error: HTTP 500: \\u{1b}[2JInternal Server Error");
    }

    #[test]
    fn test_json_error_output() {
        let outcome = Err(AnalysisError {
            attempts: 4,
            source: vintent_client::Error::Status {
                status: 500,
                reason: "Internal Server Error".into(),
            },
        });
        let text = render_outcome(OutputFormat::Json, "xin chào", &outcome);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["attempts"], 4);
        assert_eq!(value["error"], "HTTP 500: Internal Server Error");
        assert_eq!(value["utterance"], "xin chào");
    }

    #[test]
    fn test_json_success_output_keeps_wire_shape() {
        let outcome = Ok(result(r#"{"intents":["buy"]}"#));
        let text = render_outcome(OutputFormat::Json, "mua", &outcome);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["result"]["intents"][0], "buy");
    }
}
