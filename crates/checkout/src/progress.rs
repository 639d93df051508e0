//! Checkout progress snapshots for abandoned-session recovery.
//!
//! Checkout state is memory-only for the session; callers may opt in to
//! snapshotting it (e.g. to a device store) and restoring it later. Stale
//! snapshots are discarded rather than resumed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::state::CheckoutState;

/// How old a snapshot may be and still be restored.
const MAX_SNAPSHOT_AGE_HOURS: i64 = 24;

/// A checkout state snapshot with its capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgress {
    pub state: CheckoutState,
    pub saved_at: DateTime<Utc>,
}

/// Capture the current state for later restoration.
#[must_use]
pub fn snapshot(state: &CheckoutState, now: DateTime<Utc>) -> SavedProgress {
    SavedProgress {
        state: state.clone(),
        saved_at: now,
    }
}

/// Restore a snapshot if it is still fresh.
///
/// Returns `None` for snapshots older than 24 hours (or timestamped in the
/// future, which indicates a clock problem rather than a resumable
/// session). The returned state is fed to the machine through
/// `ResetCheckoutWithState`.
#[must_use]
pub fn restore(saved: SavedProgress, now: DateTime<Utc>) -> Option<CheckoutState> {
    let age = now.signed_duration_since(saved.saved_at);
    if age < Duration::zero() || age > Duration::hours(MAX_SNAPSHOT_AGE_HOURS) {
        return None;
    }
    Some(saved.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CheckoutAction, CheckoutMachine};

    #[test]
    fn test_fresh_snapshot_restores() {
        let now = Utc::now();
        let state = CheckoutState {
            notes: "saved".to_string(),
            ..CheckoutState::default()
        };

        let saved = snapshot(&state, now);
        let restored = restore(saved, now + Duration::hours(2)).expect("fresh");
        assert_eq!(restored, state);
    }

    #[test]
    fn test_stale_snapshot_is_discarded() {
        let now = Utc::now();
        let saved = snapshot(&CheckoutState::default(), now);
        assert_eq!(restore(saved, now + Duration::hours(25)), None);
    }

    #[test]
    fn test_future_snapshot_is_discarded() {
        let now = Utc::now();
        let saved = snapshot(&CheckoutState::default(), now + Duration::hours(1));
        assert_eq!(restore(saved, now), None);
    }

    #[test]
    fn test_restore_feeds_reset_with_state() {
        let now = Utc::now();
        let state = CheckoutState {
            current_step: 2,
            agreed_to_terms: true,
            ..CheckoutState::default()
        };
        let saved = snapshot(&state, now);

        let mut machine = CheckoutMachine::default();
        if let Some(restored) = restore(saved, now) {
            machine.apply(CheckoutAction::ResetCheckoutWithState(Box::new(restored)));
        }
        assert_eq!(machine.state(), &state);
    }

    #[test]
    fn test_snapshot_survives_json_roundtrip() {
        let saved = snapshot(&CheckoutState::default(), Utc::now());
        let json = serde_json::to_string(&saved).expect("serializes");
        let back: SavedProgress = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, saved);
    }
}
