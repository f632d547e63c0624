//! Coercion & flattening rules applied by composite conversion rules on their resolved children.
//!
//! - caption positions (labels, titles, placeholders, confirm dialog texts) only take plain text;
//!   richer text is demoted rather than rejected
//! - option lists are either all options or all groups, decided by the first item
//! - initial selections are copies of the selected options without `url`
use serde_json::{Number, Value};

use crate::document::{OptionGroupObject, OptionObject, Resolved, TextObject};
use crate::error::{RenderError, RenderResult};
use crate::node::TextKind;

/// Force a text object to plain text. `verbatim` only means something for mrkdwn, so it goes too.
pub fn plain(mut text: TextObject) -> TextObject {
    if text.kind != TextKind::PlainText {
        text.kind = TextKind::PlainText;
        text.emoji = None;
    }
    text.verbatim = None;
    text
}

/// Drop whichever of `emoji` / `verbatim` the kind does not honour.
pub fn honour_kind(mut text: TextObject) -> TextObject {
    match text.kind {
        TextKind::PlainText => text.verbatim = None,
        TextKind::Mrkdwn => text.emoji = None,
    }
    text
}

/// Text of a numeric child. Integral floats print without a fraction (`1.0` becomes `1`).
pub fn number_text(number: &Number) -> String {
    const EXACT: f64 = 9_007_199_254_740_992.0;
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < EXACT => {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OPTION LISTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum OptionList {
    Flat(Vec<OptionObject>),
    Grouped(Vec<OptionGroupObject>),
}

impl OptionList {
    /// Sort resolved children into a flat or grouped list. Only the first item decides which;
    /// everything after it must agree.
    pub fn collect(kind: &'static str, items: Vec<Resolved>) -> RenderResult<Self> {
        let grouped = match items.first() {
            None => return Ok(OptionList::Flat(Vec::new())),
            Some(Resolved::OptionGroup(_)) => true,
            Some(Resolved::Option(_)) => false,
            Some(other) => {
                return Err(RenderError::unexpected(kind, "children", "options", other.describe()));
            }
        };

        if grouped {
            let groups = items
                .into_iter()
                .map(|item| match item {
                    Resolved::OptionGroup(group) => Ok(group),
                    other => Err(RenderError::unexpected(
                        kind,
                        "children",
                        "option group",
                        other.describe(),
                    )),
                })
                .collect::<RenderResult<Vec<_>>>()?;
            Ok(OptionList::Grouped(groups))
        } else {
            let options = items
                .into_iter()
                .map(|item| match item {
                    Resolved::Option(option) => Ok(option),
                    other => Err(RenderError::unexpected(kind, "children", "option", other.describe())),
                })
                .collect::<RenderResult<Vec<_>>>()?;
            Ok(OptionList::Flat(options))
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            OptionList::Flat(options) => options.is_empty(),
            OptionList::Grouped(groups) => groups.is_empty(),
        }
    }

    /// Every option in declaration order, groups concatenated.
    pub fn flattened(&self) -> Vec<&OptionObject> {
        match self {
            OptionList::Flat(options) => options.iter().collect(),
            OptionList::Grouped(groups) => groups.iter().flat_map(|g| g.options.iter()).collect(),
        }
    }

    /// Wire list for positions that cannot show groups.
    pub fn flat_wire(&self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        Some(Value::Array(self.flattened().into_iter().map(|o| serde_json::json!(o)).collect()))
    }

    /// `("options", [...])` or `("option_groups", [...])`, whichever this list is.
    pub fn wire_entry(&self) -> Option<(&'static str, Value)> {
        match self {
            _ if self.is_empty() => None,
            OptionList::Flat(options) => Some(("options", serde_json::json!(options))),
            OptionList::Grouped(groups) => Some(("option_groups", serde_json::json!(groups))),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SELECTION
// ————————————————————————————————————————————————————————————————————————————

/// Copy of an option as an initial value: same text, value and description, no `url`.
pub fn strip_url(option: &OptionObject) -> OptionObject {
    OptionObject { url: None, ..option.clone() }
}

/// All selected options, url-stripped, in order. `None` when nothing is selected.
pub fn selected(options: &OptionList) -> Option<Vec<OptionObject>> {
    let picked: Vec<OptionObject> = options
        .flattened()
        .into_iter()
        .filter(|o| o.selected)
        .map(strip_url)
        .collect();
    if picked.is_empty() { None } else { Some(picked) }
}

/// First selected option in flattened order, url-stripped.
pub fn first_selected(options: &OptionList) -> Option<OptionObject> {
    options.flattened().into_iter().find(|o| o.selected).map(strip_url)
}
