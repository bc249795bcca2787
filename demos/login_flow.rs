//! Demonstrates a full session against a mock backend: login, profile lookup, listing, and
//! logout, with credentials kept in an in-memory store.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use session_client::{
	auth::LoginCredentials,
	catalog::Catalog,
	client::ApiClient,
	config::ClientConfig,
	session::SessionController,
	store::CredentialStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200).json_body(json!({
				"code": 1000,
				"message": "Signed in.",
				"data": {
					"accessToken": "demo-access",
					"refreshToken": "demo-refresh",
					"user": { "id": "u-1", "name": "Demo" }
				}
			}));
		})
		.await;
	let posts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/posts").header("authorization", "Bearer demo-access");
			then.status(200).json_body(json!([{ "id": "p-1", "title": "Welcome" }]));
		})
		.await;
	let logout_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/logout");
			then.status(200).json_body(json!({ "code": 1000, "message": "Signed out." }));
		})
		.await;
	let config = ClientConfig::builder().base_url(server.base_url()).build()?;
	let store = CredentialStore::in_memory();
	let client = ApiClient::new(config, store.clone())?;
	let session = SessionController::new(client.clone());
	let catalog = Catalog::new(client);

	session.login(&LoginCredentials::new("demo@example.com", "demo-password")).await?;

	let user = session.fetch_current_user().await?;

	println!("Signed in as {}.", user.unwrap_or_default());

	for post in catalog.load_posts().await? {
		println!("Post {}: {}.", post.id, post.title);
	}

	println!("Listing took {:?}.", catalog.posts().elapsed);

	session.logout().await?;

	println!("Authenticated after logout: {}.", store.is_authenticated());

	login_mock.assert_async().await;
	posts_mock.assert_async().await;
	logout_mock.assert_async().await;

	Ok(())
}
