//! Node catalogue: the closed set of node kinds a tree may contain and the props each one carries.
//!
//! Trees are normally built in Rust with struct literals (`..Default::default()` fills the
//! rest), but every node also deserializes from JSON (`{"kind": "Button", "action": "go",
//! "children": "Go"}`). Callbacks and deferred children only exist on the Rust side.

use std::fmt;

use futures::Future;
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

use crate::deferred::Deferred;
use crate::registry::{ActionCallback, SearchCallback};

// ————————————————————————————————————————————————————————————————————————————
// CHILDREN
// ————————————————————————————————————————————————————————————————————————————

/// Anything that may sit in a child or node-typed prop position.
///
/// From JSON: a string, a number, an array (fragment) or a node object.
#[derive(Debug)]
pub enum Child {
    /// Implicit plain text leaf.
    Text(String),
    /// Implicit plain text leaf. Integral values print without a fraction.
    Number(Number),
    /// Inline list of children; `None` entries are skipped.
    Fragment(Vec<Option<Child>>),
    Node(Box<Node>),
    Deferred(Deferred),
}

impl Child {
    /// A child whose content arrives later. The future is only polled by [`crate::render`].
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Vec<Child>>> + Send + 'static,
    {
        Self::Deferred(Deferred::new(future))
    }

    pub fn fragment<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        Self::Fragment(children.into_iter().map(|c| Some(c.into())).collect())
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite values have no JSON number and become their text.
impl From<f64> for Child {
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(number) => Self::Number(number),
            None => Self::Text(value.to_string()),
        }
    }
}

impl From<Node> for Child {
    fn from(value: Node) -> Self {
        Self::Node(Box::new(value))
    }
}

impl From<Vec<Child>> for Child {
    fn from(value: Vec<Child>) -> Self {
        Self::fragment(value)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NODE
// ————————————————————————————————————————————————————————————————————————————

/// One node of a tree. In JSON, the `kind` field names the variant and the other fields are its
/// props.
#[derive(Debug)]
pub enum Node {
    Text(Text),
    Button(Button),
    Section(Section),
    Actions(Actions),
    Image(Image),
    ImageBlock(ImageBlock),
    Divider(Divider),
    Context(Context),
    Confirm(Confirm),
    Option(SelectOption),
    OptionGroup(OptionGroup),
    DatePicker(DatePicker),
    Message(Message),
    Modal(Modal),
    Home(Home),
    Input(Input),
    TextField(TextField),
    Checkboxes(Checkboxes),
    OverflowMenu(OverflowMenu),
    RadioButtons(RadioButtons),
    SelectMenu(SelectMenu),
    MultiSelectMenu(MultiSelectMenu),
}

macro_rules! node_kinds {
    ($($variant:ident($props:ident)),* $(,)?) => {
        impl Node {
            /// Every value the `kind` field may take.
            pub const KINDS: &'static [&'static str] = &[$(stringify!($variant)),*];

            /// Tag of this node, as written in the `kind` field of a JSON tree.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Node::$variant(_) => stringify!($variant),)*
                }
            }

            fn from_props<'de, D: Deserializer<'de>>(kind: &str, props: D) -> Result<Node, D::Error> {
                match kind {
                    $(stringify!($variant) => <$props as Deserialize>::deserialize(props).map(Node::$variant),)*
                    other => Err(de::Error::unknown_variant(other, Self::KINDS)),
                }
            }
        }
        $(
            impl From<$props> for Node {
                fn from(props: $props) -> Self {
                    Node::$variant(props)
                }
            }
            impl From<$props> for Child {
                fn from(props: $props) -> Self {
                    Child::Node(Box::new(Node::$variant(props)))
                }
            }
        )*
    };
}

node_kinds! {
    Text(Text),
    Button(Button),
    Section(Section),
    Actions(Actions),
    Image(Image),
    ImageBlock(ImageBlock),
    Divider(Divider),
    Context(Context),
    Confirm(Confirm),
    Option(SelectOption),
    OptionGroup(OptionGroup),
    DatePicker(DatePicker),
    Message(Message),
    Modal(Modal),
    Home(Home),
    Input(Input),
    TextField(TextField),
    Checkboxes(Checkboxes),
    OverflowMenu(OverflowMenu),
    RadioButtons(RadioButtons),
    SelectMenu(SelectMenu),
    MultiSelectMenu(MultiSelectMenu),
}

// ————————————————————————————————————————————————————————————————————————————
// JSON DECODING
// ————————————————————————————————————————————————————————————————————————————

// Both visitors read straight from the caller's deserializer, so a path-tracking deserializer
// sees every nested key and index.

impl<'de> Deserialize<'de> for Child {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ChildVisitor)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NodeVisitor)
    }
}

struct ChildVisitor;

impl<'de> Visitor<'de> for ChildVisitor {
    type Value = Child;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number, an array of children or a node object")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Child, E> {
        Ok(Child::Text(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Child, E> {
        Ok(Child::Text(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Child, E> {
        Ok(Child::Number(value.into()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Child, E> {
        Ok(Child::Number(value.into()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Child, E> {
        Number::from_f64(value)
            .map(Child::Number)
            .ok_or_else(|| E::invalid_value(Unexpected::Float(value), &self))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Child, A::Error> {
        let mut children = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(child) = seq.next_element::<Option<Child>>()? {
            children.push(child);
        }
        Ok(Child::Fragment(children))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Child, A::Error> {
        NodeVisitor.visit_map(map).map(Child::from)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a node object with a `kind`")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let Some(first) = map.next_key::<String>()? else {
            return Err(de::Error::missing_field("kind"));
        };
        if first == "kind" {
            let kind = map.next_value::<String>()?;
            return Node::from_props(&kind, MapAccessDeserializer::new(map));
        }

        // `kind` comes later: buffer the props. Errors inside them lose their inner path.
        let mut props = serde_json::Map::new();
        props.insert(first, map.next_value()?);
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            props.insert(key, value);
        }
        let kind = match props.remove("kind") {
            Some(Value::String(kind)) => kind,
            Some(other) => return Err(de::Error::custom(format!("node kind must be a string, found {other}"))),
            None => return Err(de::Error::missing_field("kind")),
        };
        Node::from_props(&kind, Value::Object(props)).map_err(de::Error::custom)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PROPS: TEXT & LAYOUT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    #[default]
    PlainText,
    Mrkdwn,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Text {
    #[serde(rename = "type", default)]
    pub kind: TextKind,
    pub children: Option<Child>,
    /// Honoured for plain text only.
    pub emoji: Option<bool>,
    /// Honoured for mrkdwn only.
    pub verbatim: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Section {
    pub text: Option<Child>,
    pub children: Option<Child>,
    pub accessory: Option<Child>,
    pub fields: Option<Child>,
    pub block_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Actions {
    pub children: Option<Child>,
    pub block_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Context {
    pub children: Option<Child>,
    pub block_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Divider {
    pub block_id: Option<String>,
}

/// Image element (accessory or context member).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Image {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Image block.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageBlock {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
    pub title: Option<Child>,
    pub block_id: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// PROPS: COMPOSITION OBJECTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Confirm {
    pub title: Option<Child>,
    /// Dialog body.
    pub children: Option<Child>,
    pub confirm: Option<Child>,
    pub deny: Option<Child>,
    pub style: Option<ButtonStyle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectOption {
    #[serde(default)]
    pub value: String,
    pub children: Option<Child>,
    pub description: Option<Child>,
    pub url: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionGroup {
    pub label: Option<Child>,
    pub children: Option<Child>,
}

// ————————————————————————————————————————————————————————————————————————————
// PROPS: INTERACTIVE ELEMENTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Button {
    #[serde(default)]
    pub action: String,
    pub children: Option<Child>,
    pub style: Option<ButtonStyle>,
    pub url: Option<String>,
    pub value: Option<String>,
    pub accessibility_label: Option<String>,
    pub confirm: Option<Child>,
    #[serde(skip)]
    pub on_click: Option<ActionCallback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatePicker {
    #[serde(default)]
    pub action: String,
    pub placeholder: Option<Child>,
    /// `YYYY-MM-DD`.
    pub initial_date: Option<String>,
    pub confirm: Option<Child>,
    #[serde(skip)]
    pub on_change: Option<ActionCallback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextField {
    #[serde(default)]
    pub action: String,
    pub placeholder: Option<Child>,
    pub initial_value: Option<String>,
    pub multiline: Option<bool>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Checkboxes {
    #[serde(default)]
    pub action: String,
    pub children: Option<Child>,
    pub confirm: Option<Child>,
    #[serde(skip)]
    pub on_change: Option<ActionCallback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverflowMenu {
    #[serde(default)]
    pub action: String,
    pub children: Option<Child>,
    pub confirm: Option<Child>,
    #[serde(skip)]
    pub on_change: Option<ActionCallback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RadioButtons {
    #[serde(default)]
    pub action: String,
    pub children: Option<Child>,
    pub confirm: Option<Child>,
    #[serde(skip)]
    pub on_change: Option<ActionCallback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    Im,
    Mpim,
    Private,
    Public,
}

/// Conversation list filter. Keys are camelCase on input and API-cased on the wire.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConversationFilter {
    pub include: Option<Vec<ConversationType>>,
    pub exclude_external_shared_channels: Option<bool>,
    pub exclude_bot_users: Option<bool>,
}

/// Where a single-select menu gets its choices from; the `type` prop picks the variant.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SelectSource {
    Static {
        children: Option<Child>,
    },
    Users {
        initial_user: Option<String>,
    },
    Channels {
        initial_channel: Option<String>,
    },
    External {
        initial_option: Option<Child>,
        min_query_length: Option<u32>,
        #[serde(skip)]
        on_search_options: Option<SearchCallback>,
    },
    Conversations {
        initial_conversation: Option<String>,
        default_to_current_conversation: Option<bool>,
        filter: Option<ConversationFilter>,
    },
}

impl Default for SelectSource {
    fn default() -> Self {
        Self::Static { children: None }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum MultiSelectSource {
    Static {
        children: Option<Child>,
    },
    Users {
        initial_users: Option<Vec<String>>,
    },
    Channels {
        initial_channels: Option<Vec<String>>,
    },
    External {
        initial_options: Option<Child>,
        min_query_length: Option<u32>,
        #[serde(skip)]
        on_search_options: Option<SearchCallback>,
    },
    Conversations {
        initial_conversations: Option<Vec<String>>,
        default_to_current_conversation: Option<bool>,
        filter: Option<ConversationFilter>,
    },
}

impl Default for MultiSelectSource {
    fn default() -> Self {
        Self::Static { children: None }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMenu {
    #[serde(default)]
    pub action: String,
    pub placeholder: Option<Child>,
    pub confirm: Option<Child>,
    #[serde(flatten)]
    pub source: SelectSource,
    #[serde(skip)]
    pub on_change: Option<ActionCallback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSelectMenu {
    #[serde(default)]
    pub action: String,
    pub placeholder: Option<Child>,
    pub confirm: Option<Child>,
    pub max_selected_items: Option<u32>,
    #[serde(flatten)]
    pub source: MultiSelectSource,
    #[serde(skip)]
    pub on_change: Option<ActionCallback>,
}

// ————————————————————————————————————————————————————————————————————————————
// PROPS: BLOCKS & SURFACES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Input {
    pub label: Option<Child>,
    pub hint: Option<Child>,
    /// Exactly one element.
    pub children: Option<Child>,
    pub block_id: Option<String>,
    pub optional: Option<bool>,
    pub dispatch_action: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Message {
    pub children: Option<Child>,
    /// Notification fallback text.
    pub text: Option<String>,
    pub thread_ts: Option<String>,
    pub mrkdwn: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Modal {
    pub title: Option<Child>,
    pub children: Option<Child>,
    pub submit: Option<Child>,
    pub close: Option<Child>,
    pub callback_id: Option<String>,
    pub private_metadata: Option<String>,
    pub clear_on_close: Option<bool>,
    pub notify_on_close: Option<bool>,
    pub external_id: Option<String>,
    pub submit_disabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Home {
    pub children: Option<Child>,
    pub callback_id: Option<String>,
    pub private_metadata: Option<String>,
    pub external_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_nested_tree_from_json() {
        let node: Node = serde_json::from_value(json!({
            "kind": "Message",
            "text": "fallback",
            "children": [
                { "kind": "Section", "children": "hello", "accessory": {
                    "kind": "Button", "action": "go", "children": "Go", "style": "primary"
                }},
                null,
                { "kind": "Divider" }
            ]
        }))
        .unwrap();

        let Node::Message(message) = node else { panic!("expected a message") };
        assert_eq!(message.text.as_deref(), Some("fallback"));
        let Some(Child::Fragment(children)) = message.children else { panic!("expected a fragment") };
        assert_eq!(children.len(), 3);
        assert!(children[1].is_none());
    }

    #[test]
    fn select_menu_type_tag_picks_the_source() {
        let node: Node = serde_json::from_value(json!({
            "kind": "SelectMenu",
            "type": "external",
            "action": "pick",
            "minQueryLength": 2
        }))
        .unwrap();

        let Node::SelectMenu(menu) = node else { panic!("expected a select menu") };
        assert!(matches!(
            menu.source,
            SelectSource::External { min_query_length: Some(2), .. }
        ));
    }

    #[test]
    fn unknown_select_type_is_rejected() {
        let err = serde_json::from_value::<Node>(json!({
            "kind": "SelectMenu",
            "type": "emoji",
            "action": "pick"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("emoji"));
    }

    #[test]
    fn numbers_and_text_kind_default() {
        let node: Node = serde_json::from_value(json!({ "kind": "Text", "children": 42 })).unwrap();
        let Node::Text(text) = node else { panic!("expected text") };
        assert_eq!(text.kind, TextKind::PlainText);
        assert!(matches!(text.children, Some(Child::Number(_))));
    }

    #[test]
    fn unknown_props_are_rejected() {
        let err = serde_json::from_value::<Node>(json!({
            "kind": "Button",
            "action_id": "go",
            "children": "Go"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field `action_id`"), "{err}");

        let err = serde_json::from_value::<Node>(json!({ "kind": "Button", "action": "go", "onClick": "x" }))
            .unwrap_err();
        assert!(err.to_string().contains("onClick"), "{err}");
    }

    #[test]
    fn kind_may_come_after_the_props() {
        let node: Node = serde_json::from_str(r#"{ "action": "go", "children": "Go", "kind": "Button" }"#).unwrap();
        let Node::Button(button) = node else { panic!("expected a button") };
        assert_eq!(button.action, "go");

        let err = serde_json::from_str::<Node>(r#"{ "action": "go" }"#).unwrap_err();
        assert!(err.to_string().contains("missing field `kind`"), "{err}");
    }

    #[test]
    fn unknown_kind_names_the_choices() {
        let err = serde_json::from_value::<Node>(json!({ "kind": "Carousel" })).unwrap_err();
        assert!(err.to_string().contains("unknown variant `Carousel`"), "{err}");
        assert!(Node::KINDS.contains(&"MultiSelectMenu"));
    }

    #[test]
    fn float_children() {
        assert!(matches!(Child::from(1.5), Child::Number(n) if n.as_f64() == Some(1.5)));
        assert!(matches!(Child::from(f64::NAN), Child::Text(text) if text == "NaN"));
    }
}
