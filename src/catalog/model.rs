//! Typed records listed by the catalog endpoints.

// self
use crate::_prelude::*;

/// Published post.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
	/// Post identifier.
	pub id: String,
	/// Headline.
	pub title: String,
	/// Body text.
	pub content: String,
	/// Author identifier.
	pub author_id: String,
	/// Author display name.
	pub author_name: String,
	/// Author avatar URL.
	pub author_thumbnail: Option<String>,
	/// Number of likes.
	pub like_count: u64,
	/// Number of comments.
	pub comment_count: u64,
	/// Number of views.
	pub view_count: u64,
	/// Visibility mode label.
	pub visibility_mode: Option<String>,
	/// Creation timestamp as sent by the backend.
	pub created_at: Option<String>,
	/// Last update timestamp as sent by the backend.
	pub updated_at: Option<String>,
}

/// Catalog product.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
	/// Product identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// URL slug.
	pub slug: String,
	/// Long description.
	pub description: Option<String>,
	/// Teaser text.
	pub short_description: Option<String>,
	/// Current price.
	pub price: f64,
	/// Price before discount.
	pub original_price: Option<f64>,
	/// Units in stock.
	pub stock_quantity: i64,
	/// Whether the product is listed.
	pub is_active: bool,
	/// Whether the product is promoted.
	pub is_featured: bool,
	/// Thumbnail URL.
	pub thumbnail: Option<String>,
	/// Category display name.
	pub category_name: Option<String>,
	/// Brand display name.
	pub brand_name: Option<String>,
	/// Mean review score.
	pub average_rating: Option<f64>,
	/// Number of reviews.
	pub review_count: u64,
	/// Number of units sold.
	pub sale_count: u64,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn records_tolerate_missing_and_unknown_fields() {
		let post: Post = serde_json::from_value(json!({
			"id": "p1",
			"title": "Hello",
			"likeCount": 3,
			"deletedAt": null
		}))
		.expect("Sparse post should decode.");
		let product: Product = serde_json::from_value(json!({
			"id": "x",
			"name": "Mug",
			"price": 12.5,
			"isActive": true,
			"galleryImages": "a.png,b.png"
		}))
		.expect("Sparse product should decode.");

		assert_eq!(post.like_count, 3);
		assert_eq!(post.author_thumbnail, None);
		assert!((product.price - 12.5).abs() < f64::EPSILON);
		assert!(product.is_active);
		assert!(!product.is_featured);
	}
}
