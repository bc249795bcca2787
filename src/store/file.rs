//! Durable file-backed [`KeyValueStore`] that survives process restarts.

// std
use std::{
	collections::BTreeMap,
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	store::{KeyValueStore, StoreError},
};

/// Persists entries to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, String>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Opens the store dedicated to `origin` inside `dir`.
	///
	/// The file name is derived from a digest of the URL's origin (`scheme://host:port`), so
	/// paths and queries share one store while distinct origins never do.
	pub fn for_origin(dir: impl AsRef<Path>, origin: &Url) -> Result<Self, StoreError> {
		Self::open(dir.as_ref().join(origin_file_name(origin)?))
	}

	/// Location of the backing snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, String>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, String>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: BTreeMap<_, _> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate<F>(&self, apply: F) -> Result<(), StoreError>
	where
		F: FnOnce(&mut HashMap<String, String>) -> bool,
	{
		let mut guard = self.inner.write();
		let mut next = guard.clone();

		if apply(&mut next) {
			self.persist_locked(&next)?;

			*guard = next;
		}

		Ok(())
	}
}
impl KeyValueStore for FileStore {
	fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.inner.read().get(key).cloned())
	}

	fn write(&self, key: &str, value: String) -> Result<(), StoreError> {
		self.mutate(|map| {
			map.insert(key.to_owned(), value);

			true
		})
	}

	fn delete(&self, key: &str) -> Result<(), StoreError> {
		self.mutate(|map| map.remove(key).is_some())
	}

	fn contains(&self, key: &str) -> Result<bool, StoreError> {
		Ok(self.inner.read().contains_key(key))
	}

	fn clear(&self) -> Result<(), StoreError> {
		self.mutate(|map| {
			let changed = !map.is_empty();

			map.clear();

			changed
		})
	}
}

fn origin_file_name(origin: &Url) -> Result<String, StoreError> {
	let origin = origin.origin();

	if !origin.is_tuple() {
		return Err(StoreError::Backend {
			message: "Opaque origins cannot own a credential store".into(),
		});
	}

	let mut hasher = Sha256::new();
	hasher.update(origin.ascii_serialization().as_bytes());
	let digest = hasher.finalize();

	Ok(format!("credentials-{}.json", URL_SAFE_NO_PAD.encode(digest)))
}
