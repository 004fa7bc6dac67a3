//! Best-effort structured extraction from free-form narrator output
//!
//! Narrators are asked for JSON but may wrap it in markdown, add chatter
//! around it or emit invalid JSON. Extraction never fails: anything that
//! cannot be recovered becomes "no structured data" and the caller uses its
//! deterministic defaults.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Maximum number of subcategories accepted from a narrator
const MAX_SUBCATEGORIES: usize = 10;

/// Structured parts recovered from a category narration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryNarration {
    /// Insight prose; `None` when nothing usable was returned
    pub insight: Option<String>,

    /// Subcategory names; empty when none could be recovered
    pub subcategories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryPayload {
    #[serde(default, alias = "summary")]
    insight: Option<String>,
    #[serde(default)]
    subcategories: Vec<String>,
}

/// Extract a JSON document from markdown code blocks or surrounding text
#[must_use]
pub fn extract_json(text: &str) -> String {
    // ```json ... ```
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    // ``` ... ``` with an optional language tag on the fence line
    if let Some(start) = text.find("```") {
        let after_start = &text[start + 3..];
        let content_start = after_start.find('\n').map_or(0, |i| i + 1);
        if let Some(end) = after_start[content_start..].find("```") {
            return after_start[content_start..content_start + end]
                .trim()
                .to_string();
        }
    }

    // Outermost object
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            return text[start..=end].to_string();
        }
    }

    text.trim().to_string()
}

fn insight_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""(?:insight|summary)"\s*:\s*"((?:[^"\\]|\\.)*)""#)
            .expect("insight field pattern is valid")
    })
}

fn clean_subcategories(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(MAX_SUBCATEGORIES)
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Recover insight text and subcategories from a category narration
///
/// Accepts `{"insight": "...", "subcategories": [...]}` (bare or inside a
/// code block). Broken JSON falls back to salvaging the insight field with a
/// pattern match, and plain prose is taken as the insight itself.
#[must_use]
pub fn parse_category_narration(text: &str) -> CategoryNarration {
    let json = extract_json(text);

    match serde_json::from_str::<CategoryPayload>(&json) {
        Ok(payload) => CategoryNarration {
            insight: payload.insight.as_deref().and_then(non_empty),
            subcategories: clean_subcategories(payload.subcategories),
        },
        Err(e) => {
            if let Some(captured) = insight_field().captures(&json).and_then(|c| c.get(1)) {
                tracing::debug!(error = %e, "Salvaged insight from malformed narrator JSON");
                return CategoryNarration {
                    insight: non_empty(&captured.as_str().replace("\\\"", "\"")),
                    subcategories: Vec::new(),
                };
            }

            if json.trim_start().starts_with('{') {
                tracing::debug!(
                    error = %e,
                    "Discarding unparseable narrator JSON: {}",
                    json.chars().take(200).collect::<String>()
                );
                return CategoryNarration::default();
            }

            CategoryNarration {
                insight: non_empty(text),
                subcategories: Vec::new(),
            }
        }
    }
}
