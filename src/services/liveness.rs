//! Liveness classification from heartbeat recency.
//!
//! A pure function of the last-heartbeat timestamp and the current time.
//! Presentation hysteresis (the entrance grace window) is deliberately not
//! implemented here; the reconciler delays when it starts reading this
//! classification for a freshly seen node, which keeps the classifier
//! testable independent of presentation timing.

use crate::models::Liveness;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Classifies an agent's liveness.
///
/// - A `None` heartbeat means the agent has never checked in and classifies
///   as [`Liveness::Alive`]; the "never checked in" distinction is
///   display-only.
/// - Negative elapsed time (clock skew) clamps to zero.
/// - Dead iff `elapsed > dead_after`; the boundary itself is alive.
#[must_use]
pub fn classify(
    last_heartbeat: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    dead_after: Duration,
) -> Liveness {
    let Some(heartbeat) = last_heartbeat else {
        return Liveness::Alive;
    };

    // Clock skew can put the heartbeat in the future; clamp to zero.
    let elapsed = (now - heartbeat).to_std().unwrap_or(Duration::ZERO);

    if elapsed > dead_after {
        Liveness::Dead
    } else {
        Liveness::Alive
    }
}
