use chrono::{Duration, NaiveDateTime};

/// Gate verdict for a match attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Time left until the gate opens.
    Waiting(Duration),
}

/// Checks the inter-match window. A player with no recorded play is always
/// ready; otherwise the remainder of `window` since `last_play` must have
/// elapsed. Exactly at the boundary the player is ready.
pub fn check(last_play: Option<NaiveDateTime>, now: NaiveDateTime, window: Duration) -> Readiness {
    let Some(last) = last_play else {
        return Readiness::Ready;
    };
    let remaining = window - (now - last);
    if remaining > Duration::zero() {
        Readiness::Waiting(remaining)
    } else {
        Readiness::Ready
    }
}
