//! Vote coordinator.
//!
//! Holds the server-confirmed vote for the post on screen. Nothing is shown
//! optimistically: the slot changes only when the backend answers.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use vladfm_core::{VoteState, VoteValue};
use vladfm_fetch::ApiGateway;

use crate::error::StoreError;
use crate::identity::IdentityProvider;

/// The single vote slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteSlot {
    /// Post the slot belongs to.
    pub post_id: Option<u64>,
    /// Last confirmed state for that post.
    pub confirmed: Option<VoteState>,
    /// Casts in flight for that post.
    pub in_flight: u32,
    /// Bumped whenever the slot changes post. A cast counted under an older
    /// focus does not touch `in_flight`.
    #[serde(skip)]
    focus: u64,
}

impl VoteSlot {
    /// True while at least one cast for the slot's post is in flight.
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    fn refocus(&mut self, post_id: u64) {
        if self.post_id != Some(post_id) {
            self.post_id = Some(post_id);
            self.in_flight = 0;
            self.focus += 1;
        }
    }

    /// Confirmed value for `post_id`, [`VoteValue::None`] when unknown.
    pub fn value_for(&self, post_id: u64) -> VoteValue {
        self.confirmed
            .as_ref()
            .filter(|s| s.post_id == post_id)
            .map_or(VoteValue::None, |s| s.value)
    }
}

/// Reads and writes votes as the local identity.
#[derive(Clone)]
pub struct VoteCoordinator {
    gateway: Arc<dyn ApiGateway>,
    identity: Arc<IdentityProvider>,
    slot: Arc<watch::Sender<VoteSlot>>,
}

impl std::fmt::Debug for VoteCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteCoordinator")
            .field("slot", &*self.slot.borrow())
            .finish_non_exhaustive()
    }
}

impl VoteCoordinator {
    /// Creates a coordinator.
    pub fn new(gateway: Arc<dyn ApiGateway>, identity: Arc<IdentityProvider>) -> Self {
        let (slot, _) = watch::channel(VoteSlot::default());
        Self {
            gateway,
            identity,
            slot: Arc::new(slot),
        }
    }

    /// Snapshot of the slot.
    pub fn slot(&self) -> VoteSlot {
        self.slot.borrow().clone()
    }

    /// Last confirmed state, whichever post it belongs to.
    pub fn confirmed(&self) -> Option<VoteState> {
        self.slot.borrow().confirmed.clone()
    }

    /// Subscribes to slot changes.
    pub fn subscribe(&self) -> watch::Receiver<VoteSlot> {
        self.slot.subscribe()
    }

    /// Loads the local identity's vote on `post_id` and focuses the slot on
    /// that post.
    ///
    /// Returns `None` when the backend has no record. On failure the slot is
    /// left as it was.
    #[instrument(skip(self))]
    pub async fn get_vote(&self, post_id: u64) -> Result<Option<VoteState>, StoreError> {
        let identity = self.identity.identity();
        let state = self.gateway.get_vote(post_id, identity.as_str()).await?;

        self.slot.send_modify(|slot| {
            slot.refocus(post_id);
            slot.confirmed = state.clone();
        });
        debug!(value = ?state.as_ref().map(|s| s.value), "Vote loaded");
        Ok(state)
    }

    /// Casts `value` on `post_id`. [`VoteValue::None`] retracts.
    ///
    /// The slot takes the confirmed state only if it still belongs to
    /// `post_id` (or is empty). No retry on failure.
    #[instrument(skip(self))]
    pub async fn cast_vote(&self, post_id: u64, value: VoteValue) -> Result<VoteState, StoreError> {
        let identity = self.identity.identity();

        let mut counted = None;
        self.slot.send_modify(|slot| {
            if slot.post_id.is_none_or(|id| id == post_id) {
                slot.refocus(post_id);
                slot.in_flight += 1;
                counted = Some(slot.focus);
            }
        });

        let result = self.gateway.cast_vote(post_id, identity.as_str(), value).await;

        let applied = self.slot.send_if_modified(|slot| {
            if slot.post_id != Some(post_id) {
                return false;
            }
            if counted == Some(slot.focus) {
                slot.in_flight = slot.in_flight.saturating_sub(1);
            }
            if let Ok(state) = &result {
                slot.confirmed = Some(state.clone());
            }
            true
        });

        match result {
            Ok(state) => {
                if applied {
                    info!(value = %state.value, score = state.score, "Vote confirmed");
                } else {
                    debug!("Vote confirmed for a post no longer on screen");
                }
                Ok(state)
            }
            Err(e) => {
                warn!(error = %e, "Vote failed, keeping confirmed state");
                Err(e.into())
            }
        }
    }

    /// Casts `clicked`, or retracts when `clicked` is already the confirmed
    /// value.
    pub async fn toggle(&self, post_id: u64, clicked: VoteValue) -> Result<VoteState, StoreError> {
        let current = self.slot.borrow().value_for(post_id);
        self.cast_vote(post_id, current.toggled(clicked)).await
    }

    /// Empties the slot.
    pub fn clear(&self) {
        self.slot.send_modify(|slot| {
            *slot = VoteSlot {
                focus: slot.focus + 1,
                ..VoteSlot::default()
            };
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
