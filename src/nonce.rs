//! Nonce generation.
//!
//! The signing core treats the nonce as an opaque caller-provided input; the
//! venue requires it to be unique (and recommends it to be increasing) per
//! account. The source is injected so tests can pin nonces and high-rate
//! callers can swap the wall clock for a strictly monotonic counter.

use chrono::Utc;

/// Supplies the nonce attached to each signed action.
pub trait NonceSource {
    /// Draws the next nonce.
    fn next_nonce(&mut self) -> u64;
}

/// Millisecond wall-clock nonces, the venue's recommended default.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl NonceSource for WallClock {
    fn next_nonce(&mut self) -> u64 {
        Utc::now().timestamp_millis() as u64
    }
}

/// Strictly increasing nonces.
///
/// Uses the wall clock but never repeats or goes backwards, for callers that
/// sign faster than the clock resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Monotonic {
    last: u64,
}

impl Monotonic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NonceSource for Monotonic {
    fn next_nonce(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis() as u64;
        self.last = now.max(self.last + 1);
        self.last
    }
}
