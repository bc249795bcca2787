//! Navigation hook invoked when the backend reports an expired session.

// self
use crate::_prelude::*;

/// Sends the user to the login entry point.
pub trait LoginRedirect
where
	Self: Send + Sync,
{
	/// Navigates to `route`. Called after the tokens have been cleared.
	fn redirect_to_login(&self, route: &str);
}

/// Redirect hook that only logs; suitable for headless embedders.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRedirect;
impl LoginRedirect for LogRedirect {
	fn redirect_to_login(&self, route: &str) {
		tracing::info!(route, "Session expired; login required.");
	}
}

/// Redirect hook that records every requested route.
#[derive(Clone, Debug, Default)]
pub struct RecordedRedirects(Arc<RwLock<Vec<String>>>);
impl RecordedRedirects {
	/// Returns the routes requested so far, oldest first.
	pub fn routes(&self) -> Vec<String> {
		self.0.read().clone()
	}

	/// Returns the number of redirects requested so far.
	pub fn count(&self) -> usize {
		self.0.read().len()
	}
}
impl LoginRedirect for RecordedRedirects {
	fn redirect_to_login(&self, route: &str) {
		self.0.write().push(route.to_owned());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorded_redirects_share_history_across_clones() {
		let redirects = RecordedRedirects::default();
		let hook: Arc<dyn LoginRedirect> = Arc::new(redirects.clone());

		hook.redirect_to_login("/login");
		LogRedirect.redirect_to_login("/login");

		assert_eq!(redirects.routes(), vec!["/login".to_string()]);
		assert_eq!(redirects.count(), 1);
	}
}
