//! Render declarative block-kit node trees into wire documents.
//!
//! A tree of [`Node`]s (messages, modals, app home surfaces and everything nested in them) is
//! converted into the nested JSON document the messaging API expects, while interaction
//! callbacks attached to interactive nodes are collected into a [`Registry`] keyed by action
//! identifier.
//!
//! ```no_run
//! # async fn demo() -> blockkit_jsx::RenderResult<()> {
//! use blockkit_jsx::node::{Button, Message, Section};
//!
//! let tree: blockkit_jsx::Node = Message {
//!     text: Some("deploy?".into()),
//!     children: Some(Section {
//!         children: Some("Ship it?".into()),
//!         accessory: Some(Button { action: "ship".into(), children: Some("Ship".into()), ..Default::default() }.into()),
//!         ..Default::default()
//!     }.into()),
//!     ..Default::default()
//! }
//! .into();
//!
//! let rendered = blockkit_jsx::render(&tree).await?;
//! println!("{}", rendered.document);
//! # Ok(())
//! # }
//! ```
pub mod catalogue;
pub mod coerce;
pub mod deferred;
pub mod document;
pub mod engine;
pub mod error;
pub mod node;
pub mod path_de;
pub mod registry;

pub use deferred::{Deferred, PendingResolution};
pub use document::{Resolved, TextObject};
pub use engine::{render, render_options, resolve, Reconciler, Rendered};
pub use error::{RenderError, RenderResult};
pub use node::{Child, Node};
pub use registry::{ActionCallback, Registry, SearchCallback};
