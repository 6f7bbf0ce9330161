//! # Global Client State
//!
//! Single-writer stores: one task owns the state, commands arrive over a
//! channel, and everyone else reads `watch` snapshots.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   AuthHandle / AppHandle (Clone)                                        │
//! │        │ mpsc::Sender<Command>            ▲ watch::Receiver<State>      │
//! │        ▼                                  │                             │
//! │   ┌──────────────────────────────────────────────────────┐              │
//! │   │ store task: apply command ─► publish ─► persist      │              │
//! │   └──────────────────────────────────────────────────────┘              │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                 Storage ("auth-storage", "app-storage")                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command carries a oneshot acknowledgement, so a caller that awaits
//! a handle method sees its own change in the next snapshot.

pub mod app;
pub mod auth;
pub mod storage;

pub use app::{AppHandle, AppState, AppStore, APP_STORAGE_KEY};
pub use auth::{AuthHandle, AuthState, AuthStore, AUTH_STORAGE_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage};

use tokio::sync::{mpsc, oneshot};

use crate::error::{StoreError, StoreResult};

/// Capacity of each store's command channel.
pub(crate) const COMMAND_BUFFER: usize = 32;

/// Sends a command and waits for the store to acknowledge it.
pub(crate) async fn call<C>(
    tx: &mpsc::Sender<C>,
    store: &str,
    make: impl FnOnce(oneshot::Sender<()>) -> C,
) -> StoreResult<()> {
    let (reply, done) = oneshot::channel();
    tx.send(make(reply))
        .await
        .map_err(|_| StoreError::ChannelError(format!("{} command channel closed", store)))?;
    done.await.map_err(|_| StoreError::ShuttingDown)
}

/// Acknowledges a command; the caller may have stopped waiting.
pub(crate) fn ack(reply: oneshot::Sender<()>) {
    let _ = reply.send(());
}
