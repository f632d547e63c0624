//! Reconciliation engine.
//!
//! The engine walks a node tree depth first and leaves all field assembly to the per-kind
//! conversion rules in [`crate::catalogue`]: a rule gets the [`Reconciler`] and decides which of
//! its props and children to reconcile, in what order, and how to merge the results. The engine
//! itself knows nothing about kinds beyond the dispatch `match`.
//!
//! Rendering is two-phase. [`resolve`] is one synchronous pass: deferred children that have not
//! arrived yet are left out of the result and reported as [`PendingResolution`]s. [`render`]
//! settles those, writes them back into their slots, and resolves again until a pass finds
//! nothing pending.
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::catalogue::Convert;
use crate::coerce::{self, OptionList};
use crate::deferred::{settle_all, PendingResolution, Visit};
use crate::document::{ConfirmObject, Resolved, TextObject};
use crate::error::{RenderError, RenderResult};
use crate::node::{Child, Node};
use crate::registry::{Claim, Registry};

/// Upper bound on resolve → settle rounds for one render.
pub const MAX_RESOLVE_PASSES: usize = 32;

// ————————————————————————————————————————————————————————————————————————————
// RECONCILER
// ————————————————————————————————————————————————————————————————————————————

/// State shared by every conversion rule during one pass.
#[derive(Debug)]
pub struct Reconciler<'r> {
    registry: &'r mut Registry,
    pending: Vec<PendingResolution>,
    /// Deferred positions met so far that contributed nothing to this pass.
    waiting: usize,
}

impl<'r> Reconciler<'r> {
    pub fn new(registry: &'r mut Registry) -> Self {
        Self { registry, pending: Vec::new(), waiting: 0 }
    }

    /// True once the pass has met no deferred child that is still outstanding.
    pub fn is_complete(&self) -> bool {
        self.waiting == 0
    }

    /// Pending work discovered so far, in traversal order.
    pub fn into_pending(self) -> Vec<PendingResolution> {
        self.pending
    }

    pub fn reconcile_node(&mut self, node: &Node) -> RenderResult<Option<Resolved>> {
        trace!(kind = node.kind(), "convert");
        match node {
            Node::Text(props) => props.convert(self),
            Node::Button(props) => props.convert(self),
            Node::Section(props) => props.convert(self),
            Node::Actions(props) => props.convert(self),
            Node::Image(props) => props.convert(self),
            Node::ImageBlock(props) => props.convert(self),
            Node::Divider(props) => props.convert(self),
            Node::Context(props) => props.convert(self),
            Node::Confirm(props) => props.convert(self),
            Node::Option(props) => props.convert(self),
            Node::OptionGroup(props) => props.convert(self),
            Node::DatePicker(props) => props.convert(self),
            Node::Message(props) => props.convert(self),
            Node::Modal(props) => props.convert(self),
            Node::Home(props) => props.convert(self),
            Node::Input(props) => props.convert(self),
            Node::TextField(props) => props.convert(self),
            Node::Checkboxes(props) => props.convert(self),
            Node::OverflowMenu(props) => props.convert(self),
            Node::RadioButtons(props) => props.convert(self),
            Node::SelectMenu(props) => props.convert(self),
            Node::MultiSelectMenu(props) => props.convert(self),
        }
    }

    /// Resolve a child position into its values, fragments flattened, absent entries skipped.
    pub fn reconcile(&mut self, child: Option<&Child>) -> RenderResult<Vec<Resolved>> {
        let mut out = Vec::new();
        if let Some(child) = child {
            self.reconcile_into(child, &mut out)?;
        }
        Ok(out)
    }

    fn reconcile_into(&mut self, child: &Child, out: &mut Vec<Resolved>) -> RenderResult<()> {
        match child {
            Child::Text(text) => out.push(Resolved::Text(TextObject::plain(text.as_str()))),
            Child::Number(number) => out.push(Resolved::Text(TextObject::plain(coerce::number_text(number)))),
            Child::Fragment(children) => {
                for child in children.iter().flatten() {
                    self.reconcile_into(child, out)?;
                }
            }
            Child::Node(node) => {
                if let Some(resolved) = self.reconcile_node(node)? {
                    out.push(resolved);
                }
            }
            Child::Deferred(deferred) => match deferred.visit() {
                Visit::Ready(children) => {
                    for child in children.iter() {
                        self.reconcile_into(child, out)?;
                    }
                }
                // placeholder: contributes nothing to this pass
                Visit::Pending(pending) => {
                    self.waiting += 1;
                    self.pending.push(pending);
                }
                Visit::InFlight => self.waiting += 1,
                Visit::Failed(message) => return Err(RenderError::Pending(anyhow::anyhow!(message))),
            },
        }
        Ok(())
    }

    // ——— typed helpers used by conversion rules ———

    /// Position in the pass to check [`Reconciler::require`] against.
    pub fn mark(&self) -> usize {
        self.waiting
    }

    /// Whether a deferred child left something out since `mark`.
    pub fn waiting_since(&self, mark: usize) -> bool {
        self.waiting > mark
    }

    /// A required value. If it is absent only because deferred children met since `mark` have
    /// not arrived, a default placeholder stands in; such a pass is never the final one.
    pub fn require<T: Default>(
        &self,
        mark: usize,
        value: Option<T>,
        kind: &'static str,
        prop: &'static str,
    ) -> RenderResult<T> {
        match value {
            Some(value) => Ok(value),
            None if self.waiting_since(mark) => Ok(T::default()),
            None => Err(RenderError::missing(kind, prop)),
        }
    }

    /// Text content of a child position as one text object. Several text pieces are joined; the
    /// first piece decides kind and flags. Anything other than text is a type error.
    pub fn text(
        &mut self,
        kind: &'static str,
        prop: &'static str,
        child: Option<&Child>,
    ) -> RenderResult<Option<TextObject>> {
        let mut joined: Option<TextObject> = None;
        for resolved in self.reconcile(child)? {
            let Resolved::Text(piece) = resolved else {
                return Err(RenderError::unexpected(kind, prop, "text", resolved.describe()));
            };
            match joined.as_mut() {
                None => joined = Some(piece),
                Some(text) => text.text.push_str(&piece.text),
            }
        }
        Ok(joined)
    }

    /// Like [`Reconciler::text`], forced to plain text.
    pub fn plain_text(
        &mut self,
        kind: &'static str,
        prop: &'static str,
        child: Option<&Child>,
    ) -> RenderResult<Option<TextObject>> {
        Ok(self.text(kind, prop, child)?.map(coerce::plain))
    }

    /// Plain text that must be present and non-empty.
    pub fn required_plain_text(
        &mut self,
        kind: &'static str,
        prop: &'static str,
        child: Option<&Child>,
    ) -> RenderResult<TextObject> {
        let mark = self.mark();
        let text = self.plain_text(kind, prop, child)?.filter(|text| !text.text.is_empty());
        self.require(mark, text, kind, prop)
    }

    /// At most one value from a position. Extra values are a type error.
    pub fn single(
        &mut self,
        kind: &'static str,
        prop: &'static str,
        child: Option<&Child>,
    ) -> RenderResult<Option<Resolved>> {
        let mut resolved = self.reconcile(child)?;
        if resolved.len() > 1 {
            return Err(RenderError::unexpected(kind, prop, "a single node", "several"));
        }
        Ok(resolved.pop())
    }

    pub fn confirm(
        &mut self,
        kind: &'static str,
        child: Option<&Child>,
    ) -> RenderResult<Option<ConfirmObject>> {
        match self.single(kind, "confirm", child)? {
            None => Ok(None),
            Some(Resolved::Confirm(confirm)) => Ok(Some(confirm)),
            Some(other) => Err(RenderError::unexpected(kind, "confirm", "confirm dialog", other.describe())),
        }
    }

    /// A single interactive or image element.
    pub fn element(
        &mut self,
        kind: &'static str,
        prop: &'static str,
        child: Option<&Child>,
    ) -> RenderResult<Option<Value>> {
        match self.single(kind, prop, child)? {
            None => Ok(None),
            Some(Resolved::Element(element)) => Ok(Some(element)),
            Some(other) => Err(RenderError::unexpected(kind, prop, "element", other.describe())),
        }
    }

    pub fn options(&mut self, kind: &'static str, child: Option<&Child>) -> RenderResult<OptionList> {
        let items = self.reconcile(child)?;
        OptionList::collect(kind, items)
    }

    /// Reserve an action identifier for this pass and record its callbacks.
    pub fn claim(&mut self, claim: Claim<'_>) -> RenderResult<()> {
        if claim.action_id.is_empty() {
            return Err(RenderError::missing(claim.node, "action"));
        }
        self.registry.claim(claim)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ENTRY POINTS
// ————————————————————————————————————————————————————————————————————————————

/// One synchronous pass over `node`. Claims go into `registry`; deferred children that are not
/// ready yet are returned for the caller to settle.
pub fn resolve(
    node: &Node,
    registry: &mut Registry,
) -> RenderResult<(Option<Resolved>, Vec<PendingResolution>)> {
    let mut cx = Reconciler::new(registry);
    let resolved = cx.reconcile_node(node)?;
    Ok((resolved, cx.into_pending()))
}

/// Final wire document plus the interaction registry of the pass that produced it.
#[derive(Debug)]
pub struct Rendered {
    pub document: Value,
    pub registry: Registry,
}

/// Resolve, settle deferred children, and repeat until the tree is final.
///
/// Each pass starts from an empty registry, so only the final tree's claims are kept.
pub async fn render(node: &Node) -> RenderResult<Rendered> {
    for pass in 1..=MAX_RESOLVE_PASSES {
        let mut registry = Registry::new();
        let mut cx = Reconciler::new(&mut registry);
        let resolved = cx.reconcile_node(node)?;
        let complete = cx.is_complete();
        let pending = cx.into_pending();
        if complete {
            debug!(pass, kind = node.kind(), actions = registry.len(), "render settled");
            let document = resolved.map(Resolved::into_wire).unwrap_or(Value::Null);
            return Ok(Rendered { document, registry });
        }
        if pending.is_empty() {
            // only work handed out to someone else is outstanding
            return Err(RenderError::Unsettled { passes: pass });
        }
        debug!(pass, pending = pending.len(), "awaiting deferred children");
        settle_all(pending).await?;
    }
    Err(RenderError::Unsettled { passes: MAX_RESOLVE_PASSES })
}

/// Render a list of options or option groups as an options-search response.
pub async fn render_options(children: Child) -> RenderResult<Value> {
    for pass in 1..=MAX_RESOLVE_PASSES {
        let mut registry = Registry::new();
        let mut cx = Reconciler::new(&mut registry);
        let resolved = cx.reconcile(Some(&children))?;
        let complete = cx.is_complete();
        let pending = cx.into_pending();
        if complete {
            let list = OptionList::collect("options", resolved)?;
            return Ok(match list.wire_entry() {
                Some((key, value)) => json!({ key: value }),
                None => json!({ "options": [] }),
            });
        }
        if pending.is_empty() {
            return Err(RenderError::Unsettled { passes: pass });
        }
        settle_all(pending).await?;
    }
    Err(RenderError::Unsettled { passes: MAX_RESOLVE_PASSES })
}
