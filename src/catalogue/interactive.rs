//! Interactive elements. Each one claims its action identifier in the registry.
use serde_json::json;

use crate::coerce;
use crate::document::{prune, Resolved};
use crate::engine::Reconciler;
use crate::error::RenderResult;
use crate::node::{Button, Checkboxes, DatePicker, OverflowMenu, RadioButtons, TextField};
use crate::registry::{Claim, InteractionKind};

use super::Convert;

impl Convert for Button {
    const KIND: &'static str = "Button";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::Click,
            on_action: self.on_click.as_ref(),
            on_search: None,
        })?;
        let text = cx.required_plain_text(Self::KIND, "children", self.children.as_ref())?;
        let confirm = cx.confirm(Self::KIND, self.confirm.as_ref())?;

        Ok(Some(Resolved::Element(prune(json!({
            "type": "button",
            "action_id": self.action,
            "text": text,
            "style": self.style,
            "url": self.url,
            "value": self.value,
            "accessibility_label": self.accessibility_label,
            "confirm": confirm,
        })))))
    }
}

impl Convert for DatePicker {
    const KIND: &'static str = "DatePicker";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::DateSelect,
            on_action: self.on_change.as_ref(),
            on_search: None,
        })?;
        let placeholder = cx.plain_text(Self::KIND, "placeholder", self.placeholder.as_ref())?;
        let confirm = cx.confirm(Self::KIND, self.confirm.as_ref())?;

        Ok(Some(Resolved::Element(prune(json!({
            "type": "datepicker",
            "action_id": self.action,
            "placeholder": placeholder,
            "initial_date": self.initial_date,
            "confirm": confirm,
        })))))
    }
}

impl Convert for TextField {
    const KIND: &'static str = "TextField";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::None,
            on_action: None,
            on_search: None,
        })?;
        let placeholder = cx.plain_text(Self::KIND, "placeholder", self.placeholder.as_ref())?;

        Ok(Some(Resolved::Element(prune(json!({
            "type": "plain_text_input",
            "action_id": self.action,
            "placeholder": placeholder,
            "initial_value": self.initial_value,
            "multiline": self.multiline,
            "min_length": self.min_length,
            "max_length": self.max_length,
        })))))
    }
}

impl Convert for Checkboxes {
    const KIND: &'static str = "Checkboxes";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::MultiOptionSelect,
            on_action: self.on_change.as_ref(),
            on_search: None,
        })?;
        let options = cx.options(Self::KIND, self.children.as_ref())?;
        let confirm = cx.confirm(Self::KIND, self.confirm.as_ref())?;

        Ok(Some(Resolved::Element(prune(json!({
            "type": "checkboxes",
            "action_id": self.action,
            "options": options.flat_wire(),
            "initial_options": coerce::selected(&options),
            "confirm": confirm,
        })))))
    }
}

impl Convert for RadioButtons {
    const KIND: &'static str = "RadioButtons";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::OptionSelect,
            on_action: self.on_change.as_ref(),
            on_search: None,
        })?;
        let options = cx.options(Self::KIND, self.children.as_ref())?;
        let confirm = cx.confirm(Self::KIND, self.confirm.as_ref())?;

        Ok(Some(Resolved::Element(prune(json!({
            "type": "radio_buttons",
            "action_id": self.action,
            "options": options.flat_wire(),
            "initial_option": coerce::first_selected(&options),
            "confirm": confirm,
        })))))
    }
}

impl Convert for OverflowMenu {
    const KIND: &'static str = "OverflowMenu";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        cx.claim(Claim {
            action_id: &self.action,
            node: Self::KIND,
            kind: InteractionKind::OptionSelect,
            on_action: self.on_change.as_ref(),
            on_search: None,
        })?;
        let options = cx.options(Self::KIND, self.children.as_ref())?;
        let confirm = cx.confirm(Self::KIND, self.confirm.as_ref())?;

        Ok(Some(Resolved::Element(prune(json!({
            "type": "overflow",
            "action_id": self.action,
            "options": options.flat_wire(),
            "confirm": confirm,
        })))))
    }
}
