//! Post and product listings with per-request timing.

pub mod model;

pub use model::*;

// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	state::Status,
};

/// Observable state of one listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionState<T> {
	/// Items from the latest successful load.
	pub items: Vec<T>,
	/// Status of the latest load.
	pub status: Status,
	/// Failure message of the latest load.
	pub error: Option<String>,
	/// Wall time spent on the latest load.
	pub elapsed: Duration,
}
impl<T> Default for CollectionState<T> {
	fn default() -> Self {
		Self { items: Vec::new(), status: Status::Idle, error: None, elapsed: Duration::ZERO }
	}
}

/// Loads the post and product listings.
#[derive(Debug)]
pub struct Catalog {
	client: ApiClient,
	posts: watch::Sender<CollectionState<Post>>,
	products: watch::Sender<CollectionState<Product>>,
}
impl Catalog {
	/// Creates a catalog with empty listings.
	pub fn new(client: ApiClient) -> Self {
		let (posts, _) = watch::channel(CollectionState::default());
		let (products, _) = watch::channel(CollectionState::default());

		Self { client, posts, products }
	}

	/// Returns a receiver notified on every post listing change.
	pub fn subscribe_posts(&self) -> watch::Receiver<CollectionState<Post>> {
		self.posts.subscribe()
	}

	/// Returns a receiver notified on every product listing change.
	pub fn subscribe_products(&self) -> watch::Receiver<CollectionState<Product>> {
		self.products.subscribe()
	}

	/// Returns a copy of the post listing.
	pub fn posts(&self) -> CollectionState<Post> {
		self.posts.borrow().clone()
	}

	/// Returns a copy of the product listing.
	pub fn products(&self) -> CollectionState<Product> {
		self.products.borrow().clone()
	}

	/// Fetches the post listing.
	pub async fn load_posts(&self) -> Result<Vec<Post>> {
		let path = self.client.config().endpoints.posts.clone();

		self.load(Operation::ListPosts, &path, &self.posts).await
	}

	/// Fetches the product listing.
	pub async fn load_products(&self) -> Result<Vec<Product>> {
		let path = self.client.config().endpoints.products.clone();

		self.load(Operation::ListProducts, &path, &self.products).await
	}

	/// Empties the post listing and returns it to `Idle`.
	pub fn reset_posts(&self) {
		self.posts.send_replace(CollectionState::default());
	}

	/// Empties the product listing and returns it to `Idle`.
	pub fn reset_products(&self) {
		self.products.send_replace(CollectionState::default());
	}

	async fn load<T>(
		&self,
		operation: Operation,
		path: &str,
		state: &watch::Sender<CollectionState<T>>,
	) -> Result<Vec<T>>
	where
		T: Clone + DeserializeOwned,
	{
		let span = OperationSpan::new(operation, "load");

		obs::record_operation_outcome(operation, OperationOutcome::Attempt);
		state.send_modify(|state| {
			state.status = Status::Loading;
			state.error = None;
		});

		let started = Instant::now();
		let result = span
			.in_span(async { self.client.get(path, &[]).await?.list_as::<T>() })
			.await;
		let elapsed = started.elapsed();

		match result {
			Ok(items) => {
				obs::record_operation_outcome(operation, OperationOutcome::Success);
				tracing::debug!(
					operation = operation.as_str(),
					count = items.len(),
					?elapsed,
					"Listing loaded."
				);
				state.send_modify(|state| {
					state.items = items.clone();
					state.status = Status::Success;
					state.elapsed = elapsed;
				});

				Ok(items)
			},
			Err(err) => {
				obs::record_operation_outcome(operation, OperationOutcome::Failure);
				tracing::warn!(operation = operation.as_str(), error = %err, "Listing failed.");
				state.send_modify(|state| {
					state.status = Status::Error;
					state.error = Some(err.to_string());
					state.elapsed = elapsed;
				});

				Err(err)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		config::ClientConfig,
		http::{HttpTransport, TransportFuture, TransportRequest, TransportResponse},
		store::CredentialStore,
	};

	struct Delayed(Duration);
	impl HttpTransport for Delayed {
		fn send(&self, _request: TransportRequest) -> TransportFuture<'_> {
			let delay = self.0;

			Box::pin(async move {
				tokio::time::sleep(delay).await;

				Ok(TransportResponse::new(200, br#"[{"id":"p1","title":"First"}]"#.to_vec()))
			})
		}
	}

	#[test]
	fn default_collection_is_idle_and_empty() {
		let state = CollectionState::<Post>::default();

		assert!(state.items.is_empty());
		assert_eq!(state.status, Status::Idle);
		assert_eq!(state.elapsed, Duration::ZERO);
	}

	#[tokio::test]
	async fn successful_load_records_elapsed_time() {
		let catalog = Catalog::new(ApiClient::with_transport(
			ClientConfig::default(),
			CredentialStore::in_memory(),
			Arc::new(Delayed(Duration::from_millis(30))),
		));
		let posts = catalog.load_posts().await.expect("Listing should load.");
		let state = catalog.posts();

		assert_eq!(posts.len(), 1);
		assert_eq!(state.status, Status::Success);
		assert!(state.elapsed >= Duration::from_millis(30));
	}
}
