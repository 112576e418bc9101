//! Process-wide resources held while narration is active.
//!
//! While a session is playing or paused the app keeps the idle timer
//! disabled and receives remote-control events.  Both are shared,
//! process-wide switches, so each acquisition must be matched by exactly one
//! release.  [`ClaimGuard`] enforces that pairing for the controller,
//! including when the controller is dropped mid-session.

// ---------------------------------------------------------------------------
// PlaybackClaims trait
// ---------------------------------------------------------------------------

/// Platform switches toggled at the edges of a narration session.
pub trait PlaybackClaims: Send {
    fn set_idle_timer_disabled(&mut self, disabled: bool);
    fn begin_receiving_remote_events(&mut self);
    fn end_receiving_remote_events(&mut self);
}

// ---------------------------------------------------------------------------
// ClaimGuard
// ---------------------------------------------------------------------------

/// Owns a [`PlaybackClaims`] and remembers whether the claims are held.
pub struct ClaimGuard {
    claims: Box<dyn PlaybackClaims>,
    held: bool,
}

impl ClaimGuard {
    pub fn new(claims: Box<dyn PlaybackClaims>) -> Self {
        Self {
            claims,
            held: false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Take the claims.  Returns `false` (and does nothing) if already held.
    pub fn acquire(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.claims.set_idle_timer_disabled(true);
        self.claims.begin_receiving_remote_events();
        self.held = true;
        log::debug!("claims: acquired idle timer + remote events");
        true
    }

    /// Give the claims back.  Returns `false` (and does nothing) if not held.
    pub fn release(&mut self) -> bool {
        if !self.held {
            return false;
        }
        self.claims.end_receiving_remote_events();
        self.claims.set_idle_timer_disabled(false);
        self.held = false;
        log::debug!("claims: released idle timer + remote events");
        true
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if self.release() {
            log::info!("claims: released on teardown");
        }
    }
}

impl std::fmt::Debug for ClaimGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimGuard")
            .field("held", &self.held)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
