//! Observability helpers for controller operations.
//!
//! Every operation runs inside a `session_client.operation` span carrying the `operation`
//! and `stage` fields. Enable the `metrics` feature to increment the
//! `session_client_operation_total` counter for every attempt/success/failure, labeled by
//! `operation` + `outcome`.

mod metrics;
mod span;

pub use self::{metrics::*, span::*};

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// Credential exchange for tokens.
	Login,
	/// Remote session termination.
	Logout,
	/// Access token renewal.
	Refresh,
	/// Signed-in user lookup.
	FetchCurrentUser,
	/// Editable profile lookup.
	GetProfile,
	/// Profile update.
	UpdateProfile,
	/// Password change.
	ChangePassword,
	/// Post listing.
	ListPosts,
	/// Product listing.
	ListProducts,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Login => "login",
			Operation::Logout => "logout",
			Operation::Refresh => "refresh",
			Operation::FetchCurrentUser => "fetch_current_user",
			Operation::GetProfile => "get_profile",
			Operation::UpdateProfile => "update_profile",
			Operation::ChangePassword => "change_password",
			Operation::ListPosts => "list_posts",
			Operation::ListProducts => "list_products",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a controller operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
