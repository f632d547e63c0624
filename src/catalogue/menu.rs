//! Select menus, single and multi, over the five option sources.
//!
//! The wire `type` is `<source>_select` or `multi_<source>_select`. Static menus read options
//! (or option groups) from their children and take the initial selection from the options
//! marked selected. External menus know no options up front, so their initial selection comes
//! verbatim from a prop; the other sources take plain identifiers.
use serde_json::{json, Map, Value};

use crate::coerce;
use crate::document::{prune, OptionObject, Resolved};
use crate::engine::Reconciler;
use crate::error::{RenderError, RenderResult};
use crate::node::{Child, ConversationFilter, MultiSelectMenu, MultiSelectSource, SelectMenu, SelectSource};
use crate::registry::{Claim, InteractionKind, SearchCallback};

use super::Convert;

impl SelectSource {
    pub fn name(&self) -> &'static str {
        match self {
            SelectSource::Static { .. } => "static",
            SelectSource::Users { .. } => "users",
            SelectSource::Channels { .. } => "channels",
            SelectSource::External { .. } => "external",
            SelectSource::Conversations { .. } => "conversations",
        }
    }

    fn on_search(&self) -> Option<&SearchCallback> {
        match self {
            SelectSource::External { on_search_options, .. } => on_search_options.as_ref(),
            _ => None,
        }
    }
}

impl MultiSelectSource {
    pub fn name(&self) -> &'static str {
        match self {
            MultiSelectSource::Static { .. } => "static",
            MultiSelectSource::Users { .. } => "users",
            MultiSelectSource::Channels { .. } => "channels",
            MultiSelectSource::External { .. } => "external",
            MultiSelectSource::Conversations { .. } => "conversations",
        }
    }

    fn on_search(&self) -> Option<&SearchCallback> {
        match self {
            MultiSelectSource::External { on_search_options, .. } => on_search_options.as_ref(),
            _ => None,
        }
    }
}

fn filter_wire(filter: &ConversationFilter) -> Value {
    prune(json!({
        "include": filter.include,
        "exclude_external_shared_channels": filter.exclude_external_shared_channels,
        "exclude_bot_users": filter.exclude_bot_users,
    }))
}

/// Options given directly as an initial selection, url-stripped.
fn given_options(
    cx: &mut Reconciler<'_>,
    kind: &'static str,
    prop: &'static str,
    child: Option<&Child>,
) -> RenderResult<Vec<OptionObject>> {
    cx.reconcile(child)?
        .into_iter()
        .map(|item| match item {
            Resolved::Option(option) => Ok(coerce::strip_url(&option)),
            other => Err(RenderError::unexpected(kind, prop, "option", other.describe())),
        })
        .collect()
}

/// `type`, `action_id`, placeholder and confirm, shared by both menu families.
fn head(
    cx: &mut Reconciler<'_>,
    kind: &'static str,
    wire_type: String,
    action: &str,
    placeholder: Option<&Child>,
    confirm: Option<&Child>,
) -> RenderResult<Map<String, Value>> {
    let placeholder = cx.plain_text(kind, "placeholder", placeholder)?;
    let confirm = cx.confirm(kind, confirm)?;
    let mut out = Map::new();
    out.insert("type".into(), Value::from(wire_type));
    out.insert("action_id".into(), Value::from(action));
    out.insert("placeholder".into(), json!(placeholder));
    out.insert("confirm".into(), json!(confirm));
    Ok(out)
}

impl Convert for SelectMenu {
    const KIND: &'static str = "SelectMenu";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::OptionSelect,
            on_action: self.on_change.as_ref(),
            on_search: self.source.on_search(),
        })?;
        let wire_type = format!("{}_select", self.source.name());
        let mut out = head(cx, Self::KIND, wire_type, &self.action, self.placeholder.as_ref(), self.confirm.as_ref())?;

        match &self.source {
            SelectSource::Static { children } => {
                let options = cx.options(Self::KIND, children.as_ref())?;
                if let Some((key, list)) = options.wire_entry() {
                    out.insert(key.into(), list);
                }
                out.insert("initial_option".into(), json!(coerce::first_selected(&options)));
            }
            SelectSource::Users { initial_user } => {
                out.insert("initial_user".into(), json!(initial_user));
            }
            SelectSource::Channels { initial_channel } => {
                out.insert("initial_channel".into(), json!(initial_channel));
            }
            SelectSource::External { initial_option, min_query_length, .. } => {
                let mut given = given_options(cx, Self::KIND, "initialOption", initial_option.as_ref())?;
                if given.len() > 1 {
                    return Err(RenderError::unexpected(Self::KIND, "initialOption", "a single option", "several"));
                }
                out.insert("initial_option".into(), json!(given.pop()));
                out.insert("min_query_length".into(), json!(min_query_length));
            }
            SelectSource::Conversations { initial_conversation, default_to_current_conversation, filter } => {
                out.insert("initial_conversation".into(), json!(initial_conversation));
                out.insert("default_to_current_conversation".into(), json!(default_to_current_conversation));
                out.insert("filter".into(), json!(filter.as_ref().map(filter_wire)));
            }
        }

        Ok(Some(Resolved::Element(prune(Value::Object(out)))))
    }
}

impl Convert for MultiSelectMenu {
    const KIND: &'static str = "MultiSelectMenu";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::MultiOptionSelect,
            on_action: self.on_change.as_ref(),
            on_search: self.source.on_search(),
        })?;
        let wire_type = format!("multi_{}_select", self.source.name());
        let mut out = head(cx, Self::KIND, wire_type, &self.action, self.placeholder.as_ref(), self.confirm.as_ref())?;

        match &self.source {
            MultiSelectSource::Static { children } => {
                let options = cx.options(Self::KIND, children.as_ref())?;
                if let Some((key, list)) = options.wire_entry() {
                    out.insert(key.into(), list);
                }
                out.insert("initial_options".into(), json!(coerce::selected(&options)));
            }
            MultiSelectSource::Users { initial_users } => {
                out.insert("initial_users".into(), json!(initial_users));
            }
            MultiSelectSource::Channels { initial_channels } => {
                out.insert("initial_channels".into(), json!(initial_channels));
            }
            MultiSelectSource::External { initial_options, min_query_length, .. } => {
                let given = given_options(cx, Self::KIND, "initialOptions", initial_options.as_ref())?;
                if !given.is_empty() {
                    out.insert("initial_options".into(), json!(given));
                }
                out.insert("min_query_length".into(), json!(min_query_length));
            }
            MultiSelectSource::Conversations { initial_conversations, default_to_current_conversation, filter } => {
                out.insert("initial_conversations".into(), json!(initial_conversations));
                out.insert("default_to_current_conversation".into(), json!(default_to_current_conversation));
                out.insert("filter".into(), json!(filter.as_ref().map(filter_wire)));
            }
        }
        out.insert("max_selected_items".into(), json!(self.max_selected_items));

        Ok(Some(Resolved::Element(prune(Value::Object(out)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ConversationType, OptionGroup, SelectOption};
    use crate::registry::Registry;

    fn option(value: &str, selected: bool) -> Child {
        SelectOption {
            value: value.into(),
            children: Some(value.to_uppercase().into()),
            url: Some(format!("https://example.com/{value}")),
            selected,
            ..Default::default()
        }
        .into()
    }

    fn wire(node: impl Convert) -> RenderResult<Value> {
        let mut registry = Registry::new();
        let mut cx = Reconciler::new(&mut registry);
        Ok(node.convert(&mut cx)?.map(Resolved::into_wire).unwrap_or(Value::Null))
    }

    #[test]
    fn static_select_with_groups_emits_option_groups() {
        let menu = SelectMenu {
            action: "fruit".into(),
            placeholder: Some("Pick one".into()),
            source: SelectSource::Static {
                children: Some(Child::fragment([
                    Child::from(OptionGroup { label: Some("Red".into()), children: Some(option("apple", false)) }),
                    Child::from(OptionGroup {
                        label: Some("Yellow".into()),
                        children: Some(Child::fragment([option("banana", true), option("lemon", true)])),
                    }),
                ])),
            },
            ..Default::default()
        };
        let value = wire(menu).unwrap();
        assert_eq!(value["type"], "static_select");
        assert!(value.get("options").is_none());
        assert_eq!(value["option_groups"].as_array().unwrap().len(), 2);
        assert_eq!(value["initial_option"]["value"], "banana");
        assert!(value["initial_option"].get("url").is_none());
    }

    #[test]
    fn multi_static_select_initial_options_are_the_selected_ones() {
        let menu = MultiSelectMenu {
            action: "fruits".into(),
            max_selected_items: Some(2),
            source: MultiSelectSource::Static {
                children: Some(Child::fragment([option("a", true), option("b", false), option("c", true)])),
            },
            ..Default::default()
        };
        let value = wire(menu).unwrap();
        assert_eq!(value["type"], "multi_static_select");
        assert_eq!(value["options"].as_array().unwrap().len(), 3);
        assert_eq!(
            value["initial_options"],
            json!([
                { "text": { "type": "plain_text", "text": "A" }, "value": "a" },
                { "text": { "type": "plain_text", "text": "C" }, "value": "c" }
            ])
        );
        assert_eq!(value["max_selected_items"], 2);
    }

    #[test]
    fn external_select_takes_initial_option_verbatim() {
        let menu = SelectMenu {
            action: "search".into(),
            source: SelectSource::External {
                initial_option: Some(option("x", false)),
                min_query_length: Some(3),
                on_search_options: None,
            },
            ..Default::default()
        };
        assert_eq!(
            wire(menu).unwrap(),
            json!({
                "type": "external_select",
                "action_id": "search",
                "initial_option": { "text": { "type": "plain_text", "text": "X" }, "value": "x" },
                "min_query_length": 3
            })
        );
    }

    #[test]
    fn external_select_without_threshold() {
        let menu = SelectMenu {
            action: "search".into(),
            source: SelectSource::External { initial_option: None, min_query_length: None, on_search_options: None },
            ..Default::default()
        };
        let value = wire(menu).unwrap();
        assert!(value.get("min_query_length").is_none());
        assert!(value.get("initial_option").is_none());
    }

    #[test]
    fn users_and_channels_copy_identifiers() {
        let users = MultiSelectMenu {
            action: "people".into(),
            source: MultiSelectSource::Users { initial_users: Some(vec!["U1".into(), "U2".into()]) },
            ..Default::default()
        };
        assert_eq!(wire(users).unwrap()["initial_users"], json!(["U1", "U2"]));

        let channel = SelectMenu {
            action: "room".into(),
            source: SelectSource::Channels { initial_channel: Some("C1".into()) },
            ..Default::default()
        };
        let value = wire(channel).unwrap();
        assert_eq!(value["type"], "channels_select");
        assert_eq!(value["initial_channel"], "C1");
    }

    #[test]
    fn conversations_filter_is_api_cased() {
        let menu = SelectMenu {
            action: "where".into(),
            source: SelectSource::Conversations {
                initial_conversation: None,
                default_to_current_conversation: Some(true),
                filter: Some(ConversationFilter {
                    include: Some(vec![ConversationType::Public, ConversationType::Im]),
                    exclude_external_shared_channels: Some(true),
                    exclude_bot_users: Some(false),
                }),
            },
            ..Default::default()
        };
        let value = wire(menu).unwrap();
        assert_eq!(
            value["filter"],
            json!({
                "include": ["public", "im"],
                "exclude_external_shared_channels": true,
                "exclude_bot_users": false
            })
        );
        assert_eq!(value["default_to_current_conversation"], true);
    }
}
