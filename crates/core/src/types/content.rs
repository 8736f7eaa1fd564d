//! Reading content: form input parsing and the short preview shown on cards.
//!
//! Content is a free-form JSON document. Admins type it into a textarea, so
//! the portal receives it as text; seeds and API callers hand over a document
//! directly. Both forms are normalized through [`ContentInput::into_document`]
//! before anything is sent to the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum characters shown for a string value inside an object preview.
pub const ENTRY_VALUE_LIMIT: usize = 50;

/// Maximum characters shown when the content is not an object.
pub const TEXT_LIMIT: usize = 100;

/// Number of object entries shown in a preview.
pub const PREVIEW_ENTRIES: usize = 3;

/// Errors that can occur when turning user input into a content document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Nothing was entered.
    #[error("content is required")]
    Empty,
    /// The text is not valid JSON.
    #[error("content must be valid JSON: {0}")]
    Malformed(String),
}

/// Reading content as supplied by a caller.
///
/// When deserialized, a JSON string is taken as encoded text and anything
/// else as a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentInput {
    /// JSON text, typically from the admin form.
    Encoded(String),
    /// An already structured document.
    Document(Value),
}

impl ContentInput {
    /// Resolve the input into the document that gets stored.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Empty`] for blank text and
    /// [`ContentError::Malformed`] when the text does not parse.
    pub fn into_document(self) -> Result<Value, ContentError> {
        match self {
            Self::Document(value) => Ok(value),
            Self::Encoded(text) => parse_document(&text),
        }
    }
}

impl From<Value> for ContentInput {
    fn from(value: Value) -> Self {
        Self::Document(value)
    }
}

impl From<String> for ContentInput {
    fn from(text: String) -> Self {
        Self::Encoded(text)
    }
}

/// Parse JSON text entered in a form.
///
/// # Errors
///
/// See [`ContentInput::into_document`].
pub fn parse_document(text: &str) -> Result<Value, ContentError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ContentError::Empty);
    }
    serde_json::from_str(text).map_err(|e| ContentError::Malformed(e.to_string()))
}

/// Pretty-printed JSON for the edit textarea.
#[must_use]
pub fn to_editable_text(document: &Value) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}

/// One `key: value` line of an object preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    /// Key with its first underscore replaced by a space.
    pub label: String,
    /// Shortened value text.
    pub value: String,
}

/// What a reading card shows in place of the full document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPreview {
    /// Object or array content: up to three entries.
    Entries(Vec<PreviewEntry>),
    /// Any other content: a single shortened line.
    Text(String),
}

impl ContentPreview {
    /// Build the preview for a stored document.
    ///
    /// ```
    /// use eyeopener_core::ContentPreview;
    /// use serde_json::json;
    ///
    /// let preview = ContentPreview::of(&json!({"card_drawn": "The Star"}));
    /// let ContentPreview::Entries(entries) = preview else { panic!() };
    /// assert_eq!(entries[0].label, "card drawn");
    /// assert_eq!(entries[0].value, "The Star...");
    /// ```
    #[must_use]
    pub fn of(document: &Value) -> Self {
        match document {
            Value::Object(map) => Self::Entries(
                map.iter()
                    .take(PREVIEW_ENTRIES)
                    .map(|(key, value)| PreviewEntry {
                        label: key.replacen('_', " ", 1),
                        value: entry_value(value),
                    })
                    .collect(),
            ),
            // Arrays list like objects keyed by position
            Value::Array(items) => Self::Entries(
                items
                    .iter()
                    .take(PREVIEW_ENTRIES)
                    .enumerate()
                    .map(|(index, value)| PreviewEntry {
                        label: index.to_string(),
                        value: entry_value(value),
                    })
                    .collect(),
            ),
            Value::String(s) => Self::Text(format!("{}...", truncate(s, TEXT_LIMIT))),
            other => Self::Text(format!("{}...", truncate(&other.to_string(), TEXT_LIMIT))),
        }
    }
}

fn entry_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{}...", truncate(s, ENTRY_VALUE_LIMIT)),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoded_object_becomes_document() {
        let doc = ContentInput::Encoded(r#"{"a":1}"#.to_owned())
            .into_document()
            .unwrap();
        assert_eq!(doc, json!({"a": 1}));
        assert!(!doc.is_string());
    }

    #[test]
    fn test_document_passes_through() {
        let doc = ContentInput::from(json!(["x", 2])).into_document().unwrap();
        assert_eq!(doc, json!(["x", 2]));
    }

    #[test]
    fn test_malformed_text_is_rejected() {
        let err = ContentInput::Encoded("{a:}".to_owned())
            .into_document()
            .unwrap_err();
        assert!(matches!(err, ContentError::Malformed(_)));
    }

    #[test]
    fn test_blank_text_is_rejected() {
        assert_eq!(parse_document("  \n"), Err(ContentError::Empty));
    }

    #[test]
    fn test_untagged_deserialize() {
        let input: ContentInput = serde_json::from_str(r#""{\"a\":1}""#).unwrap();
        assert_eq!(input, ContentInput::Encoded(r#"{"a":1}"#.to_owned()));
        let input: ContentInput = serde_json::from_str(r#"{"a":1}"#).unwrap();
        assert_eq!(input, ContentInput::Document(json!({"a": 1})));
    }

    #[test]
    fn test_preview_takes_three_entries() {
        let doc = json!({
            "card_one": "The Fool",
            "card_two": "The Magician",
            "card_three": "The High Priestess",
            "card_four": "The Empress"
        });
        let ContentPreview::Entries(entries) = ContentPreview::of(&doc) else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].label, "card one");
    }

    #[test]
    fn test_preview_replaces_only_first_underscore() {
        let doc = json!({"life_path_number": 7});
        let ContentPreview::Entries(entries) = ContentPreview::of(&doc) else {
            panic!("expected entries");
        };
        assert_eq!(entries[0].label, "life path_number");
        assert_eq!(entries[0].value, "7");
    }

    #[test]
    fn test_preview_cuts_long_strings() {
        let long = "x".repeat(80);
        let ContentPreview::Entries(entries) = ContentPreview::of(&json!({ "text": long }))
        else {
            panic!("expected entries");
        };
        assert_eq!(entries[0].value, format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn test_preview_non_object() {
        let long = "ü".repeat(120);
        assert_eq!(
            ContentPreview::of(&json!(long)),
            ContentPreview::Text(format!("{}...", "ü".repeat(100)))
        );
        assert_eq!(
            ContentPreview::of(&json!(42)),
            ContentPreview::Text("42...".to_owned())
        );
    }

    #[test]
    fn test_preview_array_entries_by_position() {
        let doc = json!(["sage", "salt", {"moon": "waxing"}, "bell"]);
        let ContentPreview::Entries(entries) = ContentPreview::of(&doc) else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].label, "0");
        assert_eq!(entries[0].value, "sage...");
        assert_eq!(entries[1].label, "1");
        assert_eq!(entries[1].value, "salt...");
        assert_eq!(entries[2].label, "2");
        assert_eq!(entries[2].value, r#"{"moon":"waxing"}"#);
    }

    #[test]
    fn test_editable_text_is_pretty() {
        let text = to_editable_text(&json!({"a": 1}));
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }
}
