//! Connectivity probing used to classify failures as [`Error::Network`](crate::error::Error).

// std
use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the host currently has network connectivity.
pub trait ConnectivityProbe
where
	Self: Send + Sync,
{
	/// Returns `false` when the host is known to be offline.
	fn is_online(&self) -> bool;
}

/// Probe that always reports connectivity; connect failures still classify as offline.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeOnline;
impl ConnectivityProbe for AssumeOnline {
	fn is_online(&self) -> bool {
		true
	}
}

/// Probe backed by a flag the host flips from its own reachability notifications.
#[derive(Debug)]
pub struct ConnectivityFlag(AtomicBool);
impl ConnectivityFlag {
	/// Creates a flag with the provided initial state.
	pub fn new(online: bool) -> Self {
		Self(AtomicBool::new(online))
	}

	/// Records the latest connectivity state.
	pub fn set_online(&self, online: bool) {
		self.0.store(online, Ordering::Relaxed);
	}
}
impl Default for ConnectivityFlag {
	fn default() -> Self {
		Self::new(true)
	}
}
impl ConnectivityProbe for ConnectivityFlag {
	fn is_online(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flag_tracks_latest_state() {
		let flag = ConnectivityFlag::default();

		assert!(flag.is_online());

		flag.set_online(false);

		assert!(!flag.is_online());
		assert!(AssumeOnline.is_online());
	}
}
