//! Composition objects: confirm dialogs, options and option groups.
//!
//! None of these is a wire node of its own. They resolve to marked values that the enclosing
//! element consumes.
use crate::coerce;
use crate::document::{ConfirmObject, OptionGroupObject, OptionObject, Resolved};
use crate::engine::Reconciler;
use crate::error::{RenderError, RenderResult};
use crate::node::{Confirm, OptionGroup, SelectOption};

use super::Convert;

impl Convert for Confirm {
    const KIND: &'static str = "Confirm";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let title = cx.plain_text(Self::KIND, "title", self.title.as_ref())?;
        let text = cx.text(Self::KIND, "children", self.children.as_ref())?.map(coerce::honour_kind);
        let confirm = cx.plain_text(Self::KIND, "confirm", self.confirm.as_ref())?;
        let deny = cx.plain_text(Self::KIND, "deny", self.deny.as_ref())?;
        Ok(Some(Resolved::Confirm(ConfirmObject { title, text, confirm, deny, style: self.style })))
    }
}

impl Convert for SelectOption {
    const KIND: &'static str = "Option";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        if self.value.is_empty() {
            return Err(RenderError::missing(Self::KIND, "value"));
        }
        let mark = cx.mark();
        let text = cx.text(Self::KIND, "children", self.children.as_ref())?.filter(|t| !t.text.is_empty());
        let text = cx.require(mark, text, Self::KIND, "children")?;
        let description = cx.plain_text(Self::KIND, "description", self.description.as_ref())?;
        Ok(Some(Resolved::Option(OptionObject {
            text: coerce::honour_kind(text),
            value: self.value.clone(),
            description,
            url: self.url.clone(),
            selected: self.selected,
        })))
    }
}

impl Convert for OptionGroup {
    const KIND: &'static str = "OptionGroup";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let label = cx.required_plain_text(Self::KIND, "label", self.label.as_ref())?;
        let options = cx
            .reconcile(self.children.as_ref())?
            .into_iter()
            .map(|item| match item {
                Resolved::Option(option) => Ok(option),
                other => Err(RenderError::unexpected(Self::KIND, "children", "option", other.describe())),
            })
            .collect::<RenderResult<Vec<_>>>()?;
        Ok(Some(Resolved::OptionGroup(OptionGroupObject { label, options })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Child, Text, TextKind};
    use crate::registry::Registry;
    use serde_json::json;

    fn mrkdwn(text: &str) -> Child {
        Text { kind: TextKind::Mrkdwn, children: Some(text.into()), ..Default::default() }.into()
    }

    #[test]
    fn confirm_dialog_has_no_type_and_plain_captions() {
        let confirm = Confirm {
            title: Some(mrkdwn("*Sure?*")),
            children: Some(mrkdwn("This _cannot_ be undone")),
            confirm: Some(mrkdwn("Yes")),
            deny: Some("No".into()),
            style: None,
        };
        let mut registry = Registry::new();
        let resolved = confirm.convert(&mut Reconciler::new(&mut registry)).unwrap().unwrap();
        assert_eq!(
            resolved.into_wire(),
            json!({
                "title": { "type": "plain_text", "text": "*Sure?*" },
                "text": { "type": "mrkdwn", "text": "This _cannot_ be undone" },
                "confirm": { "type": "plain_text", "text": "Yes" },
                "deny": { "type": "plain_text", "text": "No" }
            })
        );
    }

    #[test]
    fn option_requires_value() {
        let option = SelectOption { children: Some("A".into()), ..Default::default() };
        let mut registry = Registry::new();
        let err = option.convert(&mut Reconciler::new(&mut registry)).unwrap_err();
        assert!(matches!(err, RenderError::MissingProp { kind: "Option", prop: "value" }));
    }

    #[test]
    fn group_rejects_non_options() {
        let group = OptionGroup { label: Some("G".into()), children: Some("loose text".into()) };
        let mut registry = Registry::new();
        let err = group.convert(&mut Reconciler::new(&mut registry)).unwrap_err();
        assert!(matches!(err, RenderError::UnexpectedKind { expected: "option", found: "text", .. }));
    }
}
