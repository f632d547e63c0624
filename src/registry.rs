//! Interaction registry: action identifier → callbacks, filled during a render pass.
//!
//! Every node that carries an action identifier claims it, whether or not it has a callback,
//! so two nodes sharing one identifier are caught at render time instead of misrouting an
//! inbound event later.
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{Future, FutureExt};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::error::{RenderError, RenderResult};
use crate::node::Child;

// ————————————————————————————————————————————————————————————————————————————
// CALLBACKS
// ————————————————————————————————————————————————————————————————————————————

type ActionFn = dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;
type SearchFn = dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<Vec<Child>>> + Send + Sync;

/// Handler for an inbound interaction. Receives the decoded event payload as is.
#[derive(Clone)]
pub struct ActionCallback(Arc<ActionFn>);

impl ActionCallback {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self(Arc::new(move |payload| f(payload).boxed()))
    }

    pub fn call(&self, payload: Value) -> BoxFuture<'static, anyhow::Result<()>> {
        (self.0)(payload)
    }
}

impl fmt::Debug for ActionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionCallback(..)")
    }
}

/// Option search for external menus. Answers with option (or option group) nodes.
#[derive(Clone)]
pub struct SearchCallback(Arc<SearchFn>);

impl SearchCallback {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<Child>>> + Send + 'static,
    {
        Self(Arc::new(move |payload| f(payload).boxed()))
    }

    pub fn call(&self, payload: Value) -> BoxFuture<'static, anyhow::Result<Vec<Child>>> {
        (self.0)(payload)
    }
}

impl fmt::Debug for SearchCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SearchCallback(..)")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REGISTRY
// ————————————————————————————————————————————————————————————————————————————

/// Shape of the event an entry expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Click,
    OptionSelect,
    MultiOptionSelect,
    DateSelect,
    /// Claims an identifier but never receives events (text inputs).
    None,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub kind: InteractionKind,
    /// Node kind that claimed the identifier.
    pub node: &'static str,
    pub on_action: Option<ActionCallback>,
    pub on_search: Option<SearchCallback>,
}

/// Registration request from one interactive node.
#[derive(Debug)]
pub struct Claim<'a> {
    pub action_id: &'a str,
    pub node: &'static str,
    pub kind: InteractionKind,
    pub on_action: Option<&'a ActionCallback>,
    pub on_search: Option<&'a SearchCallback>,
}

#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Identifiers are never overwritten: a second claim is an error.
    pub fn claim(&mut self, claim: Claim<'_>) -> RenderResult<()> {
        if let Some(existing) = self.entries.get(claim.action_id) {
            return Err(RenderError::DuplicateAction {
                action_id: claim.action_id.to_string(),
                first: existing.node,
                second: claim.node,
            });
        }
        trace!(
            action_id = claim.action_id,
            node = claim.node,
            has_callback = claim.on_action.is_some() || claim.on_search.is_some(),
            "claimed action id"
        );
        self.entries.insert(claim.action_id.to_string(), Entry {
            kind: claim.kind,
            node: claim.node,
            on_action: claim.on_action.cloned(),
            on_search: claim.on_search.cloned(),
        });
        Ok(())
    }

    pub fn get(&self, action_id: &str) -> Option<&Entry> {
        self.entries.get(action_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Claimed identifiers in claim order.
    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Run the action callback for an inbound event. `Ok(false)` when nothing is registered.
    pub async fn dispatch(&self, action_id: &str, payload: Value) -> anyhow::Result<bool> {
        let Some(callback) = self.get(action_id).and_then(|e| e.on_action.as_ref()) else {
            return Ok(false);
        };
        callback.call(payload).await?;
        Ok(true)
    }

    /// Run the option search for an external menu and render its answer as the wire payload
    /// (`{"options": [...]}` or `{"option_groups": [...]}`).
    pub async fn search_options(&self, action_id: &str, payload: Value) -> anyhow::Result<Option<Value>> {
        let Some(callback) = self.get(action_id).and_then(|e| e.on_search.as_ref()) else {
            return Ok(None);
        };
        let children = callback.call(payload).await?;
        let response = crate::engine::render_options(Child::fragment(children)).await?;
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn claim<'a>(action_id: &'a str, node: &'static str, on_action: Option<&'a ActionCallback>) -> Claim<'a> {
        Claim { action_id, node, kind: InteractionKind::Click, on_action, on_search: None }
    }

    #[test]
    fn duplicate_claim_is_rejected_and_first_entry_survives() {
        let first = ActionCallback::new(|_| async { Ok(()) });
        let mut registry = Registry::new();
        registry.claim(claim("dup", "Button", Some(&first))).unwrap();

        let err = registry.claim(claim("dup", "SelectMenu", None)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::DuplicateAction { ref action_id, first: "Button", second: "SelectMenu" } if action_id == "dup"
        ));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("dup").unwrap().on_action.is_some());
    }

    #[test]
    fn ids_keep_claim_order() {
        let mut registry = Registry::new();
        for id in ["c", "a", "b"] {
            registry.claim(claim(id, "Button", None)).unwrap();
        }
        assert_eq!(registry.action_ids().collect::<Vec<_>>(), ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn dispatch_routes_to_the_registered_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let callback = ActionCallback::new(move |payload: Value| {
            let counter = Arc::clone(&counter);
            async move {
                assert_eq!(payload["value"], "x");
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let mut registry = Registry::new();
        registry.claim(claim("go", "Button", Some(&callback))).unwrap();
        registry.claim(claim("idle", "Button", None)).unwrap();

        assert!(registry.dispatch("go", serde_json::json!({ "value": "x" })).await.unwrap());
        assert!(!registry.dispatch("idle", Value::Null).await.unwrap());
        assert!(!registry.dispatch("missing", Value::Null).await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
