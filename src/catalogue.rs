//! Conversion rules, one per node kind.
//!
//! A rule maps its node's props to a [`Resolved`] value, asking the [`Reconciler`] for any prop
//! or child that may itself be a node. Rules are where coercion happens: a caption position
//! demotes its text to plain text, an option-bearing element flattens groups and extracts the
//! selection. Rules return `Ok(None)` only when the node contributes nothing.
pub mod composition;
pub mod interactive;
pub mod layout;
pub mod menu;
pub mod surface;
pub mod text;

use crate::document::Resolved;
use crate::engine::Reconciler;
use crate::error::RenderResult;

pub trait Convert {
    /// Node kind, as used in error messages and registry entries.
    const KIND: &'static str;

    fn convert(&self, cx: &mut Reconciler<'_>) -> RenderResult<Option<Resolved>>;
}
