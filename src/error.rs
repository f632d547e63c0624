//! Render errors.
use thiserror::Error;

/// Anything that aborts a render pass. No partial document escapes once one of these is raised.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A required prop is absent or empty.
    #[error("<{kind}> is missing required prop `{prop}`")]
    MissingProp {
        kind: &'static str,
        prop: &'static str,
    },

    /// A child or prop resolved to something its position does not accept.
    #[error("<{kind}> `{prop}` expects {expected}, found {found}")]
    UnexpectedKind {
        kind: &'static str,
        prop: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Two interactive nodes claimed the same action identifier.
    #[error("duplicate action identifier `{action_id}` (claimed by <{first}> and <{second}>)")]
    DuplicateAction {
        action_id: String,
        first: &'static str,
        second: &'static str,
    },

    /// A deferred child failed while being awaited.
    #[error("deferred child failed: {0:#}")]
    Pending(#[source] anyhow::Error),

    /// Deferred children kept surfacing new deferred children.
    #[error("tree did not settle after {passes} resolve passes")]
    Unsettled { passes: usize },

    /// A JSON node tree could not be decoded.
    #[error("invalid node tree at {path}: {message}")]
    Tree { path: String, message: String },
}

impl RenderError {
    pub(crate) fn missing(kind: &'static str, prop: &'static str) -> Self {
        Self::MissingProp { kind, prop }
    }

    pub(crate) fn unexpected(
        kind: &'static str,
        prop: &'static str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::UnexpectedKind { kind, prop, expected, found }
    }

    /// True for errors caused by how the tree was authored, as opposed to a failing deferred child.
    pub fn is_authoring_error(&self) -> bool {
        !matches!(self, Self::Pending(_) | Self::Unsettled { .. })
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
