//! Response envelope parsing.
//!
//! The backend answers either with a bare JSON array or with a coded object
//! `{ code, message, data }`. The shape is decided once, at parse time, and represented as
//! [`Envelope`]; callers never re-inspect raw JSON to tell the two apart.

// self
use crate::_prelude::*;

/// Application codes defined by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppCode {
	/// Request succeeded.
	Success,
	/// Input failed validation.
	ValidationError,
	/// Caller is not authenticated.
	Unauthorized,
	/// Caller lacks permission.
	Forbidden,
	/// Resource does not exist.
	NotFound,
	/// Backend failure.
	InternalError,
}
impl AppCode {
	/// Numeric value carried in the envelope.
	pub const fn code(self) -> i64 {
		match self {
			AppCode::Success => 1000,
			AppCode::ValidationError => 1001,
			AppCode::Unauthorized => 1002,
			AppCode::Forbidden => 1003,
			AppCode::NotFound => 1004,
			AppCode::InternalError => 1005,
		}
	}

	/// Maps a numeric code back to a known variant.
	pub const fn from_code(code: i64) -> Option<Self> {
		match code {
			1000 => Some(AppCode::Success),
			1001 => Some(AppCode::ValidationError),
			1002 => Some(AppCode::Unauthorized),
			1003 => Some(AppCode::Forbidden),
			1004 => Some(AppCode::NotFound),
			1005 => Some(AppCode::InternalError),
			_ => None,
		}
	}
}

/// Coded object payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
	/// Application code; absent on endpoints that do not use codes.
	#[serde(default)]
	pub code: Option<i64>,
	/// Human-readable message.
	#[serde(default)]
	pub message: Option<String>,
	/// Payload; `null` when omitted.
	#[serde(default)]
	pub data: Value,
}

/// Parsed top-level response shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
	/// Bare JSON array, trusted verbatim.
	List(Vec<Value>),
	/// Coded object payload.
	Coded(ApiResponse),
}
impl Envelope {
	/// Parses a response body. An empty body yields an empty coded envelope.
	pub fn parse(body: &[u8], status: Option<u16>) -> Result<Self> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self::Coded(ApiResponse::default()));
		}

		let mut de = serde_json::Deserializer::from_slice(body);
		let value: Value =
			serde_path_to_error::deserialize(&mut de).map_err(|e| Error::decode(e, status))?;

		de.end().map_err(|e| {
			Error::decode(
				serde_path_to_error::Error::new(serde_path_to_error::Track::new().path(), e),
				status,
			)
		})?;

		match value {
			Value::Array(items) => Ok(Self::List(items)),
			// Scalars fail here: only objects carry the coded shape.
			other => decode_value::<ApiResponse>(other, status).map(Self::Coded),
		}
	}

	/// Returns the failing code when the envelope is coded with anything but `success_code`.
	pub fn failure_code(&self, success_code: i64) -> Option<i64> {
		match self {
			Self::List(_) => None,
			Self::Coded(response) => response.code.filter(|code| *code != success_code),
		}
	}

	/// Server-provided message, if any.
	pub fn message(&self) -> Option<&str> {
		match self {
			Self::List(_) => None,
			Self::Coded(response) => response.message.as_deref(),
		}
	}

	/// Returns the `data` value of a coded envelope, or the items of a list as an array.
	pub fn into_data(self) -> Value {
		match self {
			Self::List(items) => Value::Array(items),
			Self::Coded(response) => response.data,
		}
	}

	/// Decodes the `data` payload into `T`.
	pub fn data_as<T>(self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		decode_value(self.into_data(), None)
	}

	/// Decodes a list payload into typed items.
	///
	/// A coded envelope whose `data` is an array is accepted as well.
	pub fn list_as<T>(self) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		decode_value(self.into_data(), None)
	}
}

pub(crate) fn decode_value<T>(value: Value, status: Option<u16>) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|e| Error::decode(e, status))
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn arrays_parse_as_lists_verbatim() {
		let envelope = Envelope::parse(br#"[{"id":1},{"code":1001}]"#, Some(200))
			.expect("Array bodies should parse.");

		assert_eq!(envelope, Envelope::List(vec![json!({ "id": 1 }), json!({ "code": 1001 })]));
		assert_eq!(envelope.failure_code(1000), None);
	}

	#[test]
	fn coded_objects_expose_failures() {
		let ok = Envelope::parse(br#"{"code":1000,"message":"ok","data":{"x":1}}"#, Some(200))
			.expect("Coded bodies should parse.");
		let bad = Envelope::parse(br#"{"code":1001,"message":"bad"}"#, Some(200))
			.expect("Coded bodies should parse.");
		let uncoded =
			Envelope::parse(br#"{"data":[1,2]}"#, Some(200)).expect("Uncoded bodies should parse.");

		assert_eq!(ok.failure_code(1000), None);
		assert_eq!(ok.message(), Some("ok"));
		assert_eq!(bad.failure_code(1000), Some(1001));
		assert_eq!(bad.message(), Some("bad"));
		assert_eq!(uncoded.failure_code(1000), None);
		assert_eq!(uncoded.list_as::<u8>().expect("Array data should decode."), vec![1, 2]);
	}

	#[test]
	fn empty_body_is_an_empty_coded_envelope() {
		let envelope = Envelope::parse(b"  ", Some(204)).expect("Empty bodies should parse.");

		assert_eq!(envelope, Envelope::Coded(ApiResponse::default()));
	}

	#[test]
	fn scalars_and_garbage_fail_to_decode() {
		let scalar = Envelope::parse(b"\"ok\"", Some(200)).expect_err("Scalars should fail.");
		let garbage = Envelope::parse(b"<html>", Some(502)).expect_err("HTML should fail.");

		assert!(matches!(scalar, Error::Decode { status: Some(200), .. }));
		assert!(matches!(garbage, Error::Decode { status: Some(502), .. }));
	}

	#[test]
	fn trailing_bytes_after_the_body_fail_to_decode() {
		let trailing = Envelope::parse(br#"{"code":1000} trailing"#, Some(200))
			.expect_err("Trailing bytes should fail.");
		let doubled = Envelope::parse(br#"[1][2]"#, Some(200))
			.expect_err("Concatenated documents should fail.");
		let padded = Envelope::parse(b"{\"code\":1000}\n  ", Some(200))
			.expect("Trailing whitespace should parse.");

		assert!(matches!(trailing, Error::Decode { status: Some(200), .. }));
		assert!(matches!(doubled, Error::Decode { status: Some(200), .. }));
		assert_eq!(padded.failure_code(1000), None);
	}

	#[test]
	fn typed_data_reports_path_on_mismatch() {
		#[derive(Debug, Deserialize)]
		struct User {
			#[allow(dead_code)]
			id: u64,
		}

		let envelope = Envelope::parse(br#"{"code":1000,"data":{"id":"one"}}"#, Some(200))
			.expect("Coded bodies should parse.");
		let err = envelope.data_as::<User>().expect_err("String id should not decode as u64.");

		match err {
			Error::Decode { source, .. } => assert_eq!(source.path().to_string(), "id"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn app_codes_round_trip() {
		for code in [AppCode::Success, AppCode::Unauthorized, AppCode::InternalError] {
			assert_eq!(AppCode::from_code(code.code()), Some(code));
		}

		assert_eq!(AppCode::from_code(42), None);
	}
}
