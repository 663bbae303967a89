//! # UI Action Queue
//!
//! Marshals user actions from UI threads onto the scene thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │  UI thread  │─────>│   Bounded   │─────>│    Scene    │
//! │ (Dispatcher)│      │   Channel   │      │  (tick())   │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! Scene state is only ever touched by the thread that owns the
//! [`Museum`](crate::Museum). Other threads hold a [`UiDispatcher`] and
//! post [`UiAction`]s; the scene thread drains them at the start of each tick.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

/// Requests the UI can make of the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// Bring the main panel in front of the viewer.
    RecenterMainPanel,
    /// Display an exhibit from the catalog, spawning its model if it has one.
    ShowExhibit(u32),
    /// Spawn a model next to the main panel, replacing the current one.
    ShowModel(String),
    /// Remove the currently shown model.
    HideModel,
}

/// Sender half, held by UI code. Cheap to clone, safe to move across threads.
#[derive(Clone, Debug)]
pub struct UiDispatcher {
    sender: Sender<UiAction>,
}

impl UiDispatcher {
    /// Posts an action (non-blocking).
    ///
    /// Returns `false` if the queue is full or the scene is gone; the action
    /// is dropped in that case.
    #[inline]
    pub fn send(&self, action: UiAction) -> bool {
        match self.sender.try_send(action) {
            Ok(()) => true,
            Err(TrySendError::Full(action)) => {
                warn!(?action, "UI action queue full, dropping action");
                false
            }
            Err(TrySendError::Disconnected(action)) => {
                warn!(?action, "scene thread gone, dropping UI action");
                false
            }
        }
    }
}

/// Receiver half, owned by the scene thread.
#[derive(Debug)]
pub struct UiActionQueue {
    receiver: Receiver<UiAction>,
}

impl UiActionQueue {
    /// Creates a bounded queue and its first dispatcher.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum actions in flight before `send` starts dropping.
    #[must_use]
    pub fn new(capacity: usize) -> (UiDispatcher, Self) {
        let (sender, receiver) = bounded(capacity);
        (UiDispatcher { sender }, Self { receiver })
    }

    /// Takes every pending action, in submission order (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<UiAction> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending actions.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending actions.
    #[inline]
    #[must_use]
    pub fn has_actions(&self) -> bool {
        !self.receiver.is_empty()
    }
}
