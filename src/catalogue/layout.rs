//! Block-level layout: sections, action rows, context rows, dividers, images and inputs.
use serde_json::{json, Value};

use crate::coerce;
use crate::document::{prune, Resolved};
use crate::engine::Reconciler;
use crate::error::{RenderError, RenderResult};
use crate::node::{Actions, Context, Divider, Image, ImageBlock, Input, Section};

use super::Convert;

impl Convert for Section {
    const KIND: &'static str = "Section";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        // a section's main text is demoted to plain text whatever kind it was declared with;
        // `fields` keep their kind
        let text_source = self.text.as_ref().or(self.children.as_ref());
        let mark = cx.mark();
        let text = cx.plain_text(Self::KIND, "text", text_source)?;

        let fields = cx
            .reconcile(self.fields.as_ref())?
            .into_iter()
            .map(|item| match item {
                Resolved::Text(text) => Ok(coerce::honour_kind(text)),
                other => Err(RenderError::unexpected(Self::KIND, "fields", "text", other.describe())),
            })
            .collect::<RenderResult<Vec<_>>>()?;

        if text.is_none() && fields.is_empty() && !cx.waiting_since(mark) {
            return Err(RenderError::missing(Self::KIND, "text"));
        }

        let accessory = cx.element(Self::KIND, "accessory", self.accessory.as_ref())?;

        Ok(Some(Resolved::Block(prune(json!({
            "type": "section",
            "text": text,
            "fields": if fields.is_empty() { None } else { Some(fields) },
            "accessory": accessory,
            "block_id": self.block_id,
        })))))
    }
}

impl Convert for Actions {
    const KIND: &'static str = "Actions";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let elements = cx
            .reconcile(self.children.as_ref())?
            .into_iter()
            .map(|item| match item {
                Resolved::Element(element) => Ok(element),
                other => Err(RenderError::unexpected(Self::KIND, "children", "element", other.describe())),
            })
            .collect::<RenderResult<Vec<_>>>()?;

        Ok(Some(Resolved::Block(prune(json!({
            "type": "actions",
            "elements": elements,
            "block_id": self.block_id,
        })))))
    }
}

impl Convert for Context {
    const KIND: &'static str = "Context";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let elements = cx
            .reconcile(self.children.as_ref())?
            .into_iter()
            .map(|item| match item {
                Resolved::Text(text) => Ok(json!(coerce::honour_kind(text))),
                Resolved::Element(element) if element["type"] == "image" => Ok(element),
                other => Err(RenderError::unexpected(
                    Self::KIND,
                    "children",
                    "text or image",
                    other.describe(),
                )),
            })
            .collect::<RenderResult<Vec<Value>>>()?;

        Ok(Some(Resolved::Block(prune(json!({
            "type": "context",
            "elements": elements,
            "block_id": self.block_id,
        })))))
    }
}

impl Convert for Divider {
    const KIND: &'static str = "Divider";

    fn convert(&self, _cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        Ok(Some(Resolved::Block(prune(json!({
            "type": "divider",
            "block_id": self.block_id,
        })))))
    }
}

fn image_fields(kind: &'static str, url: &str, alt: &str) -> RenderResult<(String, String)> {
    if url.is_empty() {
        return Err(RenderError::missing(kind, "url"));
    }
    if alt.is_empty() {
        return Err(RenderError::missing(kind, "alt"));
    }
    Ok((url.to_string(), alt.to_string()))
}

impl Convert for Image {
    const KIND: &'static str = "Image";

    fn convert(&self, _cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let (image_url, alt_text) = image_fields(Self::KIND, &self.url, &self.alt)?;
        Ok(Some(Resolved::Element(json!({
            "type": "image",
            "image_url": image_url,
            "alt_text": alt_text,
        }))))
    }
}

impl Convert for ImageBlock {
    const KIND: &'static str = "ImageBlock";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let (image_url, alt_text) = image_fields(Self::KIND, &self.url, &self.alt)?;
        let title = cx.plain_text(Self::KIND, "title", self.title.as_ref())?;
        Ok(Some(Resolved::Block(prune(json!({
            "type": "image",
            "image_url": image_url,
            "alt_text": alt_text,
            "title": title,
            "block_id": self.block_id,
        })))))
    }
}

impl Convert for Input {
    const KIND: &'static str = "Input";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let label = cx.required_plain_text(Self::KIND, "label", self.label.as_ref())?;
        let mark = cx.mark();
        let element = cx.element(Self::KIND, "children", self.children.as_ref())?;
        let element = cx.require(mark, element, Self::KIND, "children")?;
        let hint = cx.plain_text(Self::KIND, "hint", self.hint.as_ref())?;

        Ok(Some(Resolved::Block(prune(json!({
            "type": "input",
            "label": label,
            "element": element,
            "hint": hint,
            "optional": self.optional,
            "dispatch_action": self.dispatch_action,
            "block_id": self.block_id,
        })))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Button, Child, Text, TextKind};
    use crate::registry::Registry;

    fn wire(node: impl Convert) -> RenderResult<Value> {
        let mut registry = Registry::new();
        let mut cx = Reconciler::new(&mut registry);
        Ok(node.convert(&mut cx)?.map(Resolved::into_wire).unwrap_or(Value::Null))
    }

    #[test]
    fn section_text_from_mrkdwn_node_becomes_plain() {
        let section = Section {
            children: Some(Text { kind: TextKind::Mrkdwn, children: Some("*bold*".into()), verbatim: Some(true), ..Default::default() }.into()),
            block_id: Some("intro".into()),
            ..Default::default()
        };
        assert_eq!(
            wire(section).unwrap(),
            json!({
                "type": "section",
                "text": { "type": "plain_text", "text": "*bold*" },
                "block_id": "intro"
            })
        );
    }

    #[test]
    fn section_fields_keep_their_kind_and_accessory_is_an_element() {
        let section = Section {
            fields: Some(Child::fragment([
                Child::from(Text { kind: TextKind::Mrkdwn, children: Some("*a*".into()), ..Default::default() }),
                Child::from("b"),
            ])),
            accessory: Some(Button { action: "more".into(), children: Some("More".into()), ..Default::default() }.into()),
            ..Default::default()
        };
        let value = wire(section).unwrap();
        assert_eq!(value["fields"][0]["type"], "mrkdwn");
        assert_eq!(value["fields"][1]["type"], "plain_text");
        assert_eq!(value["accessory"]["action_id"], "more");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn section_without_any_text_is_a_shape_error() {
        let err = wire(Section::default()).unwrap_err();
        assert!(matches!(err, RenderError::MissingProp { kind: "Section", prop: "text" }));
    }

    #[test]
    fn context_rejects_buttons() {
        let context = Context {
            children: Some(Button { action: "x".into(), children: Some("X".into()), ..Default::default() }.into()),
            ..Default::default()
        };
        assert!(matches!(
            wire(context).unwrap_err(),
            RenderError::UnexpectedKind { kind: "Context", expected: "text or image", .. }
        ));
    }

    #[test]
    fn image_block_title_is_plain() {
        let block = ImageBlock {
            url: "https://example.com/cat.png".into(),
            alt: "cat".into(),
            title: Some(Text { kind: TextKind::Mrkdwn, children: Some("_cat_".into()), ..Default::default() }.into()),
            block_id: None,
        };
        assert_eq!(
            wire(block).unwrap(),
            json!({
                "type": "image",
                "image_url": "https://example.com/cat.png",
                "alt_text": "cat",
                "title": { "type": "plain_text", "text": "_cat_" }
            })
        );
    }

    #[test]
    fn input_needs_an_element() {
        let input = Input { label: Some("Name".into()), ..Default::default() };
        assert!(matches!(
            wire(input).unwrap_err(),
            RenderError::MissingProp { kind: "Input", prop: "children" }
        ));
    }
}
