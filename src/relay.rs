//! Persistence and broadcast ports, in-memory adapters, and mark submission.
//!
//! DESIGN
//! ======
//! The store and the bus are external collaborators; the core only needs the
//! two traits below. Submission is the single asynchronous boundary in the
//! system: a committed mark is already in the local mark set and on screen
//! before `spawn_submit` runs, and nothing waits on it.
//!
//! ERROR HANDLING
//! ==============
//! Store and bus failures are logged and dropped. No retry, no rollback of
//! the optimistic local mark; the next full fetch reconciles.

#[cfg(test)]
#[path = "relay_test.rs"]
mod relay_test;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::TryCurrentError;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::camera::SurfaceId;
use crate::error::RelayError;
use crate::mark::{Mark, MarkId, NewMark};
use crate::wire::MarkEvent;

/// Default per-wall broadcast buffer.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Record store for committed marks.
#[async_trait]
pub trait MarkStore: Send + Sync {
    /// Store a new mark and return its id.
    async fn create(&self, mark: NewMark) -> Result<MarkId, RelayError>;

    /// Every stored mark on `surface`.
    async fn list(&self, surface: SurfaceId) -> Result<Vec<Mark>, RelayError>;

    async fn delete(&self, id: MarkId) -> Result<(), RelayError>;

    async fn delete_all(&self) -> Result<(), RelayError>;
}

/// Wall-scoped fan-out of mark events.
#[async_trait]
pub trait MarkBus: Send + Sync {
    /// Publish an event on its wall's channel.
    async fn publish(&self, event: MarkEvent) -> Result<(), RelayError>;

    /// Subscribe to one wall's channel.
    fn subscribe(&self, surface: SurfaceId) -> broadcast::Receiver<MarkEvent>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store keyed by mark id. Keeps the client-generated id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    marks: Arc<RwLock<HashMap<MarkId, Mark>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove marks whose expiry is at or before `now`. Returns how many went.
    ///
    /// Stands in for the external expiry sweep in single-process hosts.
    pub async fn sweep_expired(&self, now: i64) -> usize {
        let mut marks = self.marks.write().await;
        let before = marks.len();
        marks.retain(|_, m| !m.is_expired(now));
        let removed = before - marks.len();
        if removed > 0 {
            info!(removed, "expired marks swept");
        }
        removed
    }
}

#[async_trait]
impl MarkStore for MemoryStore {
    async fn create(&self, mark: NewMark) -> Result<MarkId, RelayError> {
        let id = mark.id;
        self.marks.write().await.insert(id, Mark::from(mark));
        Ok(id)
    }

    async fn list(&self, surface: SurfaceId) -> Result<Vec<Mark>, RelayError> {
        let marks = self.marks.read().await;
        let mut out: Vec<Mark> = marks.values().filter(|m| m.surface_id == surface).cloned().collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn delete(&self, id: MarkId) -> Result<(), RelayError> {
        match self.marks.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RelayError::NotFound(id)),
        }
    }

    async fn delete_all(&self) -> Result<(), RelayError> {
        self.marks.write().await.clear();
        Ok(())
    }
}

// =============================================================================
// MEMORY BUS
// =============================================================================

/// Process-local bus with one broadcast channel per wall.
#[derive(Debug, Clone)]
pub struct MemoryBus {
    channels: Arc<HashMap<SurfaceId, broadcast::Sender<MarkEvent>>>,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl MemoryBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = SurfaceId::ALL
            .into_iter()
            .map(|surface| (surface, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self { channels: Arc::new(channels) }
    }
}

#[async_trait]
impl MarkBus for MemoryBus {
    async fn publish(&self, event: MarkEvent) -> Result<(), RelayError> {
        let Some(tx) = self.channels.get(&event.surface_id) else {
            return Err(RelayError::Closed);
        };
        // No subscribers is not a failure for fire-and-forget fan-out.
        match tx.send(event) {
            Ok(receivers) => debug!(receivers, "mark event published"),
            Err(broadcast::error::SendError(event)) => {
                debug!(channel = %event.channel(), "mark event published with no subscribers");
            }
        }
        Ok(())
    }

    fn subscribe(&self, surface: SurfaceId) -> broadcast::Receiver<MarkEvent> {
        match self.channels.get(&surface) {
            Some(tx) => tx.subscribe(),
            // Every wall gets a channel at construction; this arm only keeps the match total.
            None => broadcast::channel(1).1,
        }
    }
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// Persist `mark`, then publish it. Failures are logged, never retried.
///
/// Returns the stored id when persistence succeeded.
pub async fn submit(store: &dyn MarkStore, bus: &dyn MarkBus, mark: Mark, now: i64) -> Option<MarkId> {
    let mark_id = mark.id;
    let surface = mark.surface_id;

    let stored_id = match store.create(NewMark::from(mark.clone())).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, %mark_id, ?surface, "mark persistence failed");
            return None;
        }
    };

    // Subscribers see the id the store assigned.
    let stored = Mark { id: stored_id, ..mark };
    if let Err(e) = bus.publish(MarkEvent::created(stored, now)).await {
        error!(error = %e, %mark_id, ?surface, "mark broadcast failed");
    }
    Some(stored_id)
}

/// Fire-and-forget [`submit`] on the current tokio runtime.
///
/// Without a runtime the submission goes to the browser event loop on wasm
/// builds with the `web` feature, and is logged and skipped everywhere
/// else. Only the tokio path yields a handle.
pub fn spawn_submit<S, B>(store: Arc<S>, bus: Arc<B>, mark: Mark, now: i64) -> Option<JoinHandle<Option<MarkId>>>
where
    S: MarkStore + 'static,
    B: MarkBus + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(async move { submit(store.as_ref(), bus.as_ref(), mark, now).await })),
        Err(e) => {
            submit_without_runtime(store, bus, mark, now, &e);
            None
        }
    }
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
fn submit_without_runtime<S, B>(store: Arc<S>, bus: Arc<B>, mark: Mark, now: i64, _reason: &TryCurrentError)
where
    S: MarkStore + 'static,
    B: MarkBus + 'static,
{
    debug!(mark_id = %mark.id, "submitting on the browser event loop");
    wasm_bindgen_futures::spawn_local(async move {
        submit(store.as_ref(), bus.as_ref(), mark, now).await;
    });
}

#[cfg(not(all(feature = "web", target_arch = "wasm32")))]
fn submit_without_runtime<S, B>(_store: Arc<S>, _bus: Arc<B>, mark: Mark, _now: i64, reason: &TryCurrentError)
where
    S: MarkStore + 'static,
    B: MarkBus + 'static,
{
    error!(error = %reason, mark_id = %mark.id, surface = ?mark.surface_id, "mark submission skipped: no async runtime");
}
