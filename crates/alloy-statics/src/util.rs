//! Misc utilities.

use std::time::Instant;

/// Calls `f` and logs the time it took to do so.
pub(crate) fn time<F, T>(msg: &str, f: F) -> T
where
  F: FnOnce() -> T,
{
  let start = Instant::now();
  let ret = f();
  let elapsed = start.elapsed();
  log::info!("{msg}: {elapsed:?}");
  ret
}
