//! Cleaning and reshaping of model replies
//!
//! Models are asked for bare JSON but frequently wrap it in markdown fences
//! or drift from the requested enums. Parsing here is lenient about shape and
//! strict about JSON validity.

use scribe_common::api::{Icon, Suggestion, SuggestionKind, Tip, TipCategory};
use serde_json::Value;

use crate::gateway::GatewayError;

/// Remove markdown code fences and surrounding whitespace
pub fn strip_code_fences(reply: &str) -> String {
    reply
        .replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn parse_json(reply: &str) -> Result<Value, GatewayError> {
    serde_json::from_str(&strip_code_fences(reply)).map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Array at the top level or under `key`
fn items(value: Value, key: &str) -> Result<Vec<Value>, GatewayError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(GatewayError::Parse(format!("missing '{}' array", key))),
        },
        other => Err(GatewayError::Parse(format!(
            "expected array or object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn suggestion_kind(label: &str) -> SuggestionKind {
    match label.trim().to_lowercase().as_str() {
        "estrutura" => SuggestionKind::Estrutura,
        "clareza" => SuggestionKind::Clareza,
        "referencia" | "referência" => SuggestionKind::Referencia,
        _ => SuggestionKind::Melhoria,
    }
}

/// Parse analyze-text output into suggestions
///
/// Items with neither title nor content are dropped.
pub fn parse_suggestions(reply: &str) -> Result<Vec<Suggestion>, GatewayError> {
    let suggestions = items(parse_json(reply)?, "suggestions")?
        .iter()
        .filter_map(|item| {
            let title = text_field(item, "title");
            let content = text_field(item, "content");
            if title.is_empty() && content.is_empty() {
                return None;
            }
            Some(Suggestion {
                kind: suggestion_kind(&text_field(item, "type")),
                title,
                content,
                icon: Icon::parse(&text_field(item, "icon")).unwrap_or(Icon::Lightbulb),
            })
        })
        .collect();
    Ok(suggestions)
}

/// Parse analyze-document output into numbered tips, sorted by number
pub fn parse_tips(reply: &str) -> Result<Vec<Tip>, GatewayError> {
    let mut tips: Vec<Tip> = items(parse_json(reply)?, "tips")?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let number = item
                .get("number")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(index as u32 + 1);
            let id = match text_field(item, "id") {
                id if id.is_empty() => format!("tip-{}", number),
                id => id,
            };
            Tip {
                id,
                number,
                category: TipCategory::parse(&text_field(item, "category"))
                    .unwrap_or(TipCategory::Estrutura),
                title: text_field(item, "title"),
                description: text_field(item, "description"),
                icon: Icon::parse(&text_field(item, "icon")).unwrap_or(Icon::Lightbulb),
            }
        })
        .collect();
    tips.sort_by_key(|tip| tip.number);
    Ok(tips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```[1]```"), "[1]");
        assert_eq!(strip_code_fences("  \n[1]\n "), "[1]");
        assert_eq!(strip_code_fences("texto ```json{\"a\":1}```\n fim"), "texto {\"a\":1} fim");
    }

    #[test]
    fn test_parse_suggestion_array_in_fences() {
        let reply = r#"```json
[
  {"type": "clareza", "title": "Voz ativa", "content": "Use voz ativa.", "icon": "AlertCircle"},
  {"type": "referencia", "title": "Cite", "content": "Inclua autores recentes.", "icon": "BookOpen"}
]
```"#;
        let suggestions = parse_suggestions(reply).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].kind, SuggestionKind::Clareza);
        assert_eq!(suggestions[1].icon, Icon::BookOpen);
    }

    #[test]
    fn test_parse_suggestions_wrapped_object() {
        let reply = r#"{"suggestions": [{"type": "estrutura", "title": "Ordem", "content": "Reordene.", "icon": "Lightbulb"}]}"#;
        assert_eq!(parse_suggestions(reply).unwrap()[0].kind, SuggestionKind::Estrutura);
    }

    #[test]
    fn test_unknown_enums_fall_back() {
        let reply = r#"[{"type": "estilo", "title": "T", "content": "C", "icon": "Star"}]"#;
        let s = &parse_suggestions(reply).unwrap()[0];
        assert_eq!(s.kind, SuggestionKind::Melhoria);
        assert_eq!(s.icon, Icon::Lightbulb);
    }

    #[test]
    fn test_empty_items_dropped() {
        let reply = r#"[{"type": "clareza"}, {"title": "Só título"}]"#;
        let suggestions = parse_suggestions(reply).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Só título");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            parse_suggestions("Aqui estão as sugestões: ..."),
            Err(GatewayError::Parse(_))
        ));
        assert!(matches!(parse_suggestions("\"texto\""), Err(GatewayError::Parse(_))));
        assert!(matches!(parse_tips("{\"dicas\": []}"), Err(GatewayError::Parse(_))));
    }

    #[test]
    fn test_tips_sorted_and_completed() {
        let reply = r#"{"tips": [
            {"number": 2, "category": "Redação", "title": "B", "description": "b", "icon": "CheckCircle"},
            {"id": "tip-1", "number": 1, "category": "Metodologia", "title": "A", "description": "a", "icon": "Lightbulb"},
            {"category": "Fundamentação", "title": "C", "description": "c", "icon": "AlertCircle"}
        ]}"#;
        let tips = parse_tips(reply).unwrap();
        assert_eq!(tips.iter().map(|t| t.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(tips[1].id, "tip-2");
        assert_eq!(tips[1].category, TipCategory::Redacao);
        // Missing number comes from position
        assert_eq!(tips[2].id, "tip-3");
        assert_eq!(tips[2].category, TipCategory::Fundamentacao);
    }

    #[test]
    fn test_tips_bare_array() {
        let reply = r#"[{"title": "A", "description": "a", "category": "Outra"}]"#;
        let tips = parse_tips(reply).unwrap();
        assert_eq!(tips[0].number, 1);
        assert_eq!(tips[0].category, TipCategory::Estrutura);
        assert_eq!(tips[0].icon, Icon::Lightbulb);
    }
}
