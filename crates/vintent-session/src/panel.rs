//! Analysis panel model
//!
//! [`AnalysisView::from_result`] turns a raw [`AnalysisResult`] into the
//! sections shown next to the chat. It is pure: the same result always
//! produces the same view, and missing fields become placeholders.

use std::cmp::Ordering;
use vintent_client::AnalysisResult;

use crate::conversation::neutralize;

/// At most this many probabilities are shown
pub const MAX_PROBABILITIES: usize = 10;

pub const INTENTS_TITLE: &str = "Detected Intents";
pub const PROBABILITIES_TITLE: &str = "Intent Probabilities";
pub const TOKENS_TITLE: &str = "Tokenization (Underthesea)";
pub const BPE_TITLE: &str = "BPE Tokens (PhoBERT)";
pub const VECTOR_TITLE: &str = "h_cls Vector (First 10 dims)";

/// Label of the placeholder intent tag
pub const NONE_INTENT: &str = "none";

const NO_PROBABILITIES: &str = "No probability data";
const NO_TOKENS: &str = "No tokens";
const NO_BPE_TOKENS: &str = "No BPE tokens";
const NO_VECTOR: &str = "No vector data";

/// Marker the BPE tokenizer appends to non-final word pieces
const SUBWORD_MARKER: &str = "@@";

/// A panel section: either items or a "no data" placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Items(Vec<T>),
    Placeholder(&'static str),
}

impl<T> Section<T> {
    fn from_items(items: Vec<T>, placeholder: &'static str) -> Self {
        if items.is_empty() {
            Section::Placeholder(placeholder)
        } else {
            Section::Items(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Section::Items(items) => items,
            Section::Placeholder(_) => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Section::Items(_) => None,
            Section::Placeholder(p) => Some(*p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentTag {
    pub label: String,
    /// Rendered in the muted "none" style
    pub is_none: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: String,
    pub value: f64,
}

impl ProbabilityBar {
    /// Bar width in percent, clamped to 0..=100
    pub fn width_percent(&self) -> f64 {
        if self.value.is_nan() {
            return 0.0;
        }
        (self.value * 100.0).clamp(0.0, 100.0)
    }

    /// Value as a percentage with one decimal, e.g. `42.0%`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.value * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStyle {
    Default,
    /// `<s>`, `</s>`, `<unk>`, ...
    Special,
    /// Word piece that continues into the next token
    Subword,
}

impl TokenStyle {
    /// CSS-style class name, used by the HTML output
    pub fn class_name(&self) -> &'static str {
        match self {
            TokenStyle::Default => "token",
            TokenStyle::Special => "token special",
            TokenStyle::Subword => "token subword",
        }
    }
}

/// Classify a BPE token. Special markers win over the subword marker.
pub fn classify_bpe(token: &str) -> TokenStyle {
    if token.starts_with('<') && token.ends_with('>') {
        TokenStyle::Special
    } else if token.contains(SUBWORD_MARKER) {
        TokenStyle::Subword
    } else {
        TokenStyle::Default
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenChip {
    pub text: String,
    pub style: TokenStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorItem {
    pub index: usize,
    pub value: f64,
}

impl VectorItem {
    /// `[index]` prefix
    pub fn index_label(&self) -> String {
        format!("[{}]", self.index)
    }

    /// Value with four decimals
    pub fn value_label(&self) -> String {
        format!("{:.4}", self.value)
    }
}

/// Everything the analysis panel displays
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub intents: Vec<IntentTag>,
    pub probabilities: Section<ProbabilityBar>,
    pub tokens: Section<TokenChip>,
    pub bpe_tokens: Section<TokenChip>,
    pub vector: Section<VectorItem>,
}

impl AnalysisView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            intents: intent_tags(result.intents()),
            probabilities: probability_bars(result),
            tokens: Section::from_items(
                result
                    .tokenized()
                    .iter()
                    .map(|t| TokenChip {
                        text: neutralize(t),
                        style: TokenStyle::Default,
                    })
                    .collect(),
                NO_TOKENS,
            ),
            bpe_tokens: Section::from_items(
                result
                    .bpe()
                    .iter()
                    .map(|t| TokenChip {
                        text: neutralize(t),
                        style: classify_bpe(t),
                    })
                    .collect(),
                NO_BPE_TOKENS,
            ),
            vector: Section::from_items(
                result
                    .h_cls_sample()
                    .iter()
                    .enumerate()
                    .map(|(index, &value)| VectorItem { index, value })
                    .collect(),
                NO_VECTOR,
            ),
        }
    }

    /// Vector sample as a single space-separated line, e.g. `[0] 0.1234 [1] -0.5000`
    pub fn vector_text(&self) -> Option<String> {
        match &self.vector {
            Section::Items(items) => Some(
                items
                    .iter()
                    .map(|v| format!("{} {}", v.index_label(), v.value_label()))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Section::Placeholder(_) => None,
        }
    }
}

fn intent_tags(intents: &[String]) -> Vec<IntentTag> {
    if intents.is_empty() {
        return vec![IntentTag {
            label: NONE_INTENT.to_string(),
            is_none: true,
        }];
    }

    intents
        .iter()
        .map(|intent| IntentTag {
            label: neutralize(intent),
            is_none: intent == NONE_INTENT,
        })
        .collect()
}

fn probability_bars(result: &AnalysisResult) -> Section<ProbabilityBar> {
    let Some(probabilities) = &result.probabilities else {
        return Section::Placeholder(NO_PROBABILITIES);
    };

    let mut bars: Vec<ProbabilityBar> = probabilities
        .iter()
        .map(|(label, &value)| ProbabilityBar {
            label: neutralize(label),
            value,
        })
        .collect();

    // Descending; NaN sorts last. Stable, so ties keep server order.
    bars.sort_by(|a, b| match (a.value.is_nan(), b.value.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.value.total_cmp(&a.value),
    });
    bars.truncate(MAX_PROBABILITIES);

    Section::Items(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vintent_client::DebugInfo;
    use vintent_client::indexmap::IndexMap;

    fn with_probabilities(pairs: &[(&str, f64)]) -> AnalysisResult {
        AnalysisResult {
            probabilities: Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect::<IndexMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_probabilities_sorted_descending() {
        let view = AnalysisView::from_result(&with_probabilities(&[
            ("buy", 0.42),
            ("refund", 0.9),
            ("none", 0.01),
        ]));

        let rendered: Vec<(String, String)> = view
            .probabilities
            .items()
            .iter()
            .map(|b| (b.label.clone(), b.percent_label()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("refund".to_string(), "90.0%".to_string()),
                ("buy".to_string(), "42.0%".to_string()),
                ("none".to_string(), "1.0%".to_string()),
            ]
        );
    }

    #[test]
    fn test_probabilities_capped_at_ten() {
        let pairs: Vec<(String, f64)> = (0..20)
            .map(|i| (format!("intent_{:02}", i), i as f64 / 20.0))
            .collect();
        let refs: Vec<(&str, f64)> = pairs.iter().map(|(k, v)| (k.as_str(), *v)).collect();

        let view = AnalysisView::from_result(&with_probabilities(&refs));
        let bars = view.probabilities.items();
        assert_eq!(bars.len(), MAX_PROBABILITIES);
        assert_eq!(bars[0].label, "intent_19");
        assert_eq!(bars[9].label, "intent_10");
    }

    #[test]
    fn test_tied_probabilities_keep_server_order() {
        let view = AnalysisView::from_result(&with_probabilities(&[
            ("book_table", 0.2),
            ("order_food", 0.4),
            ("ask_menu", 0.4),
            ("none", 0.4),
        ]));
        let labels: Vec<&str> = view
            .probabilities
            .items()
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        assert_eq!(labels, ["order_food", "ask_menu", "none", "book_table"]);
    }

    #[test]
    fn test_tie_at_cutoff_keeps_earlier_entry() {
        let mut pairs: Vec<(String, f64)> =
            (0..9).map(|i| (format!("top_{}", i), 0.9)).collect();
        pairs.push(("zeta".to_string(), 0.1));
        pairs.push(("alpha".to_string(), 0.1));
        let refs: Vec<(&str, f64)> = pairs.iter().map(|(k, v)| (k.as_str(), *v)).collect();

        let view = AnalysisView::from_result(&with_probabilities(&refs));
        let bars = view.probabilities.items();
        assert_eq!(bars.len(), MAX_PROBABILITIES);
        assert_eq!(bars[9].label, "zeta");
    }

    #[test]
    fn test_bar_width_clamped() {
        let over = ProbabilityBar {
            label: "x".into(),
            value: 1.3,
        };
        assert_eq!(over.width_percent(), 100.0);
        let under = ProbabilityBar {
            label: "x".into(),
            value: -0.1,
        };
        assert_eq!(under.width_percent(), 0.0);
        let half = ProbabilityBar {
            label: "x".into(),
            value: 0.5,
        };
        assert_eq!(half.width_percent(), 50.0);
    }

    #[test]
    fn test_missing_probabilities_placeholder() {
        let view = AnalysisView::from_result(&AnalysisResult::default());
        assert_eq!(view.probabilities.placeholder(), Some("No probability data"));
    }

    #[test]
    fn test_bpe_classification() {
        let styles: Vec<TokenStyle> = ["<s>", "ăn@@", "bún"]
            .iter()
            .map(|t| classify_bpe(t))
            .collect();
        assert_eq!(
            styles,
            vec![TokenStyle::Special, TokenStyle::Subword, TokenStyle::Default]
        );
    }

    #[test]
    fn test_bpe_edge_cases() {
        assert_eq!(classify_bpe("</s>"), TokenStyle::Special);
        assert_eq!(classify_bpe("<"), TokenStyle::Default);
        assert_eq!(classify_bpe("<x@@>"), TokenStyle::Special);
        assert_eq!(classify_bpe("@@"), TokenStyle::Subword);
    }

    #[test]
    fn test_intents_none_placeholder() {
        let view = AnalysisView::from_result(&AnalysisResult::default());
        assert_eq!(
            view.intents,
            vec![IntentTag {
                label: "none".into(),
                is_none: true
            }]
        );
    }

    #[test]
    fn test_literal_none_intent_styled() {
        let view = AnalysisView::from_result(&AnalysisResult {
            intents: Some(vec!["add_expense".into(), "none".into()]),
            ..Default::default()
        });
        assert!(!view.intents[0].is_none);
        assert!(view.intents[1].is_none);
    }

    #[test]
    fn test_token_sections() {
        let view = AnalysisView::from_result(&AnalysisResult {
            debug_info: Some(DebugInfo {
                tokenized: Some(vec!["Hôm_nay".into(), "tôi".into()]),
                bpe: Some(vec![]),
                h_cls_sample: None,
            }),
            ..Default::default()
        });
        assert_eq!(view.tokens.items().len(), 2);
        assert!(
            view.tokens
                .items()
                .iter()
                .all(|t| t.style == TokenStyle::Default)
        );
        assert_eq!(view.bpe_tokens.placeholder(), Some("No BPE tokens"));
        assert_eq!(view.vector.placeholder(), Some("No vector data"));
    }

    #[test]
    fn test_vector_text() {
        let view = AnalysisView::from_result(&AnalysisResult {
            debug_info: Some(DebugInfo {
                h_cls_sample: Some(vec![0.123456, -0.5, 2.0]),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            view.vector_text().unwrap(),
            "[0] 0.1235 [1] -0.5000 [2] 2.0000"
        );
    }

    #[test]
    fn test_empty_result_renders_all_placeholders() {
        let view = AnalysisView::from_result(&AnalysisResult::default());
        assert_eq!(view.tokens.placeholder(), Some("No tokens"));
        assert_eq!(view.bpe_tokens.placeholder(), Some("No BPE tokens"));
        assert_eq!(view.vector.placeholder(), Some("No vector data"));
        assert!(view.vector_text().is_none());
    }
}
