//! Root surfaces: message, modal and app home. Their `blocks` come from their children.
use serde_json::{json, Value};

use crate::document::{prune, Resolved};
use crate::engine::Reconciler;
use crate::error::{RenderError, RenderResult};
use crate::node::{Child, Home, Message, Modal};

use super::Convert;

/// Resolved children as a block list, in order. Absent children are already skipped.
fn blocks(cx: &mut Reconciler<'_>, kind: &'static str, children: Option<&Child>) -> RenderResult<Vec<Value>> {
    cx.reconcile(children)?
        .into_iter()
        .map(|item| match item {
            Resolved::Block(block) => Ok(block),
            other => Err(RenderError::unexpected(kind, "children", "block", other.describe())),
        })
        .collect()
}

impl Convert for Message {
    const KIND: &'static str = "Message";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let blocks = blocks(cx, Self::KIND, self.children.as_ref())?;
        Ok(Some(Resolved::Surface(prune(json!({
            "blocks": blocks,
            "text": self.text,
            "thread_ts": self.thread_ts,
            "mrkdwn": self.mrkdwn,
        })))))
    }
}

impl Convert for Modal {
    const KIND: &'static str = "Modal";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let title = cx.required_plain_text(Self::KIND, "title", self.title.as_ref())?;
        let blocks = blocks(cx, Self::KIND, self.children.as_ref())?;
        let submit = cx.plain_text(Self::KIND, "submit", self.submit.as_ref())?;
        let close = cx.plain_text(Self::KIND, "close", self.close.as_ref())?;

        Ok(Some(Resolved::Surface(prune(json!({
            "type": "modal",
            "title": title,
            "blocks": blocks,
            "submit": submit,
            "close": close,
            "private_metadata": self.private_metadata,
            "callback_id": self.callback_id,
            "clear_on_close": self.clear_on_close,
            "notify_on_close": self.notify_on_close,
            "external_id": self.external_id,
            "submit_disabled": self.submit_disabled,
        })))))
    }
}

impl Convert for Home {
    const KIND: &'static str = "Home";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let blocks = blocks(cx, Self::KIND, self.children.as_ref())?;
        Ok(Some(Resolved::Surface(prune(json!({
            "type": "home",
            "blocks": blocks,
            "private_metadata": self.private_metadata,
            "callback_id": self.callback_id,
            "external_id": self.external_id,
        })))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Divider, Text, TextKind};
    use crate::registry::Registry;

    fn wire(node: impl Convert) -> RenderResult<Value> {
        let mut registry = Registry::new();
        let mut cx = Reconciler::new(&mut registry);
        Ok(node.convert(&mut cx)?.map(Resolved::into_wire).unwrap_or(Value::Null))
    }

    #[test]
    fn empty_message() {
        assert_eq!(wire(Message::default()).unwrap(), json!({ "blocks": [] }));
        let message = Message { text: Some("fallback".into()), ..Default::default() };
        assert_eq!(wire(message).unwrap(), json!({ "blocks": [], "text": "fallback" }));
    }

    #[test]
    fn modal_captions_are_plain() {
        let mrkdwn = |s: &str| -> Option<Child> {
            Some(Text { kind: TextKind::Mrkdwn, children: Some(s.into()), ..Default::default() }.into())
        };
        let modal = Modal {
            title: mrkdwn("*Title*"),
            submit: mrkdwn("*Go*"),
            close: mrkdwn("*Back*"),
            children: Some(Divider::default().into()),
            callback_id: Some("cb".into()),
            ..Default::default()
        };
        let value = wire(modal).unwrap();
        for key in ["title", "submit", "close"] {
            assert_eq!(value[key]["type"], "plain_text", "{key}");
        }
        assert_eq!(value["blocks"], json!([{ "type": "divider" }]));
        assert_eq!(value["callback_id"], "cb");
    }

    #[test]
    fn modal_needs_a_title() {
        assert!(matches!(
            wire(Modal::default()).unwrap_err(),
            RenderError::MissingProp { kind: "Modal", prop: "title" }
        ));
    }

    #[test]
    fn home_rejects_bare_text_children() {
        let home = Home { children: Some("hello".into()), ..Default::default() };
        assert!(matches!(
            wire(home).unwrap_err(),
            RenderError::UnexpectedKind { kind: "Home", expected: "block", found: "text", .. }
        ));
    }
}
