//! Resolved values and the wire objects they carry.
//!
//! Conversion rules hand [`Resolved`] values up to their parents instead of raw JSON so that a
//! parent can tell a confirm dialog from an option from an option group, and read an option's
//! `selected` flag, without inspecting wire fields. The marker is dropped by
//! [`Resolved::into_wire`].
use serde::Serialize;
use serde_json::{Map, Value};

use crate::node::{ButtonStyle, TextKind};

/// `{type, text, emoji?, verbatim?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbatim: Option<bool>,
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { kind: TextKind::PlainText, text: text.into(), emoji: None, verbatim: None }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self { kind: TextKind::Mrkdwn, text: text.into(), emoji: None, verbatim: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionObject {
    pub text: TextObject,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionGroupObject {
    pub label: TextObject,
    pub options: Vec<OptionObject>,
}

/// Confirmation dialog. Never carries a `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
}

/// One converted node, tagged with what it is.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Text(TextObject),
    Confirm(ConfirmObject),
    Option(OptionObject),
    OptionGroup(OptionGroupObject),
    /// Interactive or image element.
    Element(Value),
    /// Block-level element.
    Block(Value),
    /// Message, modal or home document.
    Surface(Value),
}

impl Resolved {
    /// Human readable marker, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Resolved::Text(_) => "text",
            Resolved::Confirm(_) => "confirm dialog",
            Resolved::Option(_) => "option",
            Resolved::OptionGroup(_) => "option group",
            Resolved::Element(_) => "element",
            Resolved::Block(_) => "block",
            Resolved::Surface(_) => "surface",
        }
    }

    pub fn into_wire(self) -> Value {
        match self {
            Resolved::Text(text) => serde_json::json!(text),
            Resolved::Confirm(confirm) => serde_json::json!(confirm),
            Resolved::Option(option) => serde_json::json!(option),
            Resolved::OptionGroup(group) => serde_json::json!(group),
            Resolved::Element(value) | Resolved::Block(value) | Resolved::Surface(value) => value,
        }
    }
}

/// Drop `null` members of a wire object. Conversion rules build objects with `json!` and use
/// `None` for "not given"; the target schema wants those keys absent rather than null.
pub fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map.into_iter().filter(|(_, v)| !v.is_null()).collect();
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selected_flag_never_reaches_the_wire() {
        let option = OptionObject {
            text: TextObject::plain("A"),
            value: "a".into(),
            description: None,
            url: Some("https://example.com".into()),
            selected: true,
        };
        assert_eq!(
            Resolved::Option(option).into_wire(),
            json!({
                "text": { "type": "plain_text", "text": "A" },
                "value": "a",
                "url": "https://example.com"
            })
        );
    }

    #[test]
    fn prune_keeps_false_and_empty_values() {
        let value = prune(json!({ "a": null, "b": false, "c": [], "d": "" }));
        assert_eq!(value, json!({ "b": false, "c": [], "d": "" }));
    }
}
