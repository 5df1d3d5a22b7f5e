use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared signed-in flag consulted by route guards.
#[derive(Clone, Debug)]
pub struct UserSession {
    signed_in: Arc<AtomicBool>,
}

impl UserSession {
    pub fn new(signed_in: bool) -> Self {
        Self {
            signed_in: Arc::new(AtomicBool::new(signed_in)),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    /// Flips the flag and returns the new state.
    pub fn toggle(&self) -> bool {
        !self.signed_in.fetch_xor(true, Ordering::SeqCst)
    }
}
