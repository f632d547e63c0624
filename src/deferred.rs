//! Deferred children and the pending work they produce during a resolve pass.
//!
//! A [`Deferred`] is a shared slot. The first pass that meets it takes the future out and hands
//! it back to the caller as a [`PendingResolution`]; settling that writes the children into the
//! same slot, so the next pass finds them at the position the deferred child occupies.
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use futures::{Future, FutureExt};

use crate::error::{RenderError, RenderResult};
use crate::node::Child;

pub type DeferredChildren = BoxFuture<'static, anyhow::Result<Vec<Child>>>;

enum Slot {
    Waiting(DeferredChildren),
    InFlight,
    Ready(Arc<Vec<Child>>),
    /// The future failed; the message is kept so every later pass fails the same way.
    Failed(String),
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a resolve pass finds in a deferred slot. The slot lock is already released.
pub(crate) enum Visit {
    Ready(Arc<Vec<Child>>),
    /// First visit since the slot was filled: the caller owns the work now.
    Pending(PendingResolution),
    /// Handed out earlier and not settled yet.
    InFlight,
    Failed(String),
}

#[derive(Clone)]
pub struct Deferred {
    slot: Arc<Mutex<Slot>>,
}

impl Deferred {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Vec<Child>>> + Send + 'static,
    {
        Self { slot: Arc::new(Mutex::new(Slot::Waiting(future.boxed()))) }
    }

    /// Look at the slot once, taking the future out if it is still waiting.
    pub(crate) fn visit(&self) -> Visit {
        let mut slot = lock(&self.slot);
        match std::mem::replace(&mut *slot, Slot::InFlight) {
            Slot::Waiting(future) => Visit::Pending(PendingResolution {
                slot: Arc::clone(&self.slot),
                future: Some(future),
            }),
            Slot::InFlight => Visit::InFlight,
            Slot::Ready(children) => {
                *slot = Slot::Ready(Arc::clone(&children));
                Visit::Ready(children)
            }
            Slot::Failed(message) => {
                *slot = Slot::Failed(message.clone());
                Visit::Failed(message)
            }
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *lock(&self.slot) {
            Slot::Waiting(_) => "waiting",
            Slot::InFlight => "in flight",
            Slot::Ready(_) => "ready",
            Slot::Failed(_) => "failed",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

/// Deferred work discovered by a resolve pass, in discovery order.
#[must_use = "pending resolutions must be settled before the tree is final"]
pub struct PendingResolution {
    slot: Arc<Mutex<Slot>>,
    future: Option<DeferredChildren>,
}

impl PendingResolution {
    /// Await the children and store them at the slot they were deferred from.
    ///
    /// Dropping this future before it completes puts the work back into the slot.
    pub async fn settle(mut self) -> RenderResult<()> {
        let Some(future) = self.future.as_mut() else {
            return Ok(());
        };
        let result = future.await;
        self.future = None;
        let mut slot = lock(&self.slot);
        match result {
            Ok(children) => {
                *slot = Slot::Ready(Arc::new(children));
                Ok(())
            }
            Err(error) => {
                *slot = Slot::Failed(format!("{error:#}"));
                Err(RenderError::Pending(error))
            }
        }
    }
}

impl Drop for PendingResolution {
    /// Unsettled work goes back into its slot so a later pass rediscovers it.
    fn drop(&mut self) {
        if let Some(future) = self.future.take() {
            let mut slot = lock(&self.slot);
            if matches!(*slot, Slot::InFlight) {
                *slot = Slot::Waiting(future);
            }
        }
    }
}

impl fmt::Debug for PendingResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResolution").finish_non_exhaustive()
    }
}

/// Await every pending resolution. Completion order is free; each result lands in its own slot.
pub async fn settle_all(pending: Vec<PendingResolution>) -> RenderResult<()> {
    futures::future::try_join_all(pending.into_iter().map(PendingResolution::settle)).await?;
    Ok(())
}
