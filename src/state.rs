//! Async operation bookkeeping shared by every controller.

// self
use crate::_prelude::*;

/// Lifecycle of the most recent async operation.
///
/// Transitions run `Idle → Loading → Success | Error`; an explicit reset returns to `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	/// Nothing has run since construction or the last reset.
	#[default]
	Idle,
	/// A request is in flight.
	Loading,
	/// The latest request succeeded.
	Success,
	/// The latest request failed.
	Error,
}
impl Status {
	/// Returns a stable lowercase label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Status::Idle => "idle",
			Status::Loading => "loading",
			Status::Success => "success",
			Status::Error => "error",
		}
	}

	/// Returns `true` while a request is in flight.
	pub fn is_loading(self) -> bool {
		matches!(self, Status::Loading)
	}

	/// Returns `true` once the operation has resolved either way.
	pub fn is_settled(self) -> bool {
		matches!(self, Status::Success | Status::Error)
	}
}
impl Display for Status {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_serializes_lowercase() {
		let payload = serde_json::to_string(&Status::Success).expect("Status should serialize.");

		assert_eq!(payload, "\"success\"");
		assert_eq!(Status::default(), Status::Idle);
		assert!(Status::Loading.is_loading());
		assert!(Status::Error.is_settled());
		assert!(!Status::Idle.is_settled());
	}
}
