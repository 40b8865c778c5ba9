//! Cooperative cancellation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative cancellation token.
///
/// The analysis checks this between fixed-point iterations and between
/// top-level declarations. `cancel` may be called from another thread.
#[derive(Debug, Default)]
pub struct Cancel(AtomicBool);

impl Cancel {
  /// Returns a new, not-yet-cancelled token.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests cancellation.
  pub fn cancel(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  /// Returns whether cancellation was requested.
  #[must_use]
  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }

  /// Returns `Err(Cancelled)` iff cancellation was requested.
  ///
  /// # Errors
  ///
  /// When cancellation was requested.
  pub fn check(&self) -> Result<(), Cancelled> {
    if self.is_cancelled() {
      Err(Cancelled)
    } else {
      Ok(())
    }
  }
}

/// The analysis was cancelled. The caller's world holds no partial state:
/// everything under construction is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("the analysis was cancelled")
  }
}

impl std::error::Error for Cancelled {}
