use crate::coerce;
use crate::document::{Resolved, TextObject};
use crate::engine::Reconciler;
use crate::error::RenderResult;
use crate::node::Text;

use super::Convert;

impl Convert for Text {
    const KIND: &'static str = "Text";

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>> {
        let content = cx.text(Self::KIND, "children", self.children.as_ref())?;
        let text = TextObject {
            kind: self.kind,
            text: content.map(|t| t.text).unwrap_or_default(),
            emoji: self.emoji,
            verbatim: self.verbatim,
        };
        Ok(Some(Resolved::Text(coerce::honour_kind(text))))
    }
}
