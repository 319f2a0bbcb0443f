//! Simple file-backed [`TokenStore`] that keeps the credential across restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenAction, TokenSecret},
	store::{StoreError, StoreFuture, TokenStore},
};

/// Persists the credential to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
	path: PathBuf,
	inner: Arc<RwLock<Credential>>,
}
impl FileTokenStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Credential, StoreError> {
		if !path.exists() {
			return Ok(Credential::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Credential::default());
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

	fn persist(&self, credential: &Credential) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(credential).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
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

	// The in-memory value only changes once the new snapshot is on disk.
	fn apply(&self, action: TokenAction) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let next = guard.clone().reduce(action);

		self.persist(&next)?;

		*guard = next;

		Ok(())
	}
}
impl TokenStore for FileTokenStore {
	fn credential(&self) -> StoreFuture<'_, Credential> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn set_credential(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.apply(TokenAction::Received(token)) })
	}

	fn mark_needed(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.apply(TokenAction::Needed) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.apply(TokenAction::Cleared) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		env, process,
		sync::atomic::{AtomicU32, Ordering},
		time::{SystemTime, UNIX_EPOCH},
	};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		static SEQ: AtomicU32 = AtomicU32::new(0);

		let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
		let unique = format!(
			"bearer_interceptor_file_store_{}_{}_{}.json",
			process::id(),
			nanos,
			SEQ.fetch_add(1, Ordering::Relaxed),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn credential_survives_reopen() {
		let path = temp_path();
		let store = FileTokenStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		assert_eq!(store.path(), path.as_path());

		rt.block_on(store.set_credential(TokenSecret::new("persisted")))
			.expect("Failed to save credential to file store.");
		rt.block_on(store.mark_needed()).expect("Failed to mark credential as needed.");
		drop(store);

		let reopened = FileTokenStore::open(&path).expect("Failed to reopen file store snapshot.");
		let credential = rt
			.block_on(reopened.credential())
			.expect("Failed to read credential from reopened file store.");

		assert!(credential.needed);
		assert_eq!(credential.value.as_ref().map(TokenSecret::expose), Some("persisted"));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn missing_or_empty_file_starts_from_initial_credential() {
		let path = temp_path();
		let store = FileTokenStore::open(&path).expect("Missing file should open cleanly.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		assert_eq!(
			rt.block_on(store.credential()).expect("Credential read should succeed."),
			Credential::default()
		);

		File::create(&path).expect("Failed to create empty snapshot file.");

		let reopened = FileTokenStore::open(&path).expect("Empty file should open cleanly.");

		assert_eq!(
			rt.block_on(reopened.credential()).expect("Credential read should succeed."),
			Credential::default()
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_a_serialization_error() {
		let path = temp_path();

		fs::write(&path, b"{not json").expect("Failed to write corrupt snapshot.");

		let err = FileTokenStore::open(&path).expect_err("Corrupt snapshot must be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_persist_leaves_memory_untouched() {
		let path = temp_path();
		let store = FileTokenStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set_credential(TokenSecret::new("kept")))
			.expect("Failed to save credential to file store.");

		// A directory squatting on the temp path makes the next write fail.
		let tmp_path = path.with_extension("tmp");

		fs::create_dir(&tmp_path).expect("Failed to create blocking directory.");

		let err = rt
			.block_on(store.mark_needed())
			.expect_err("Persist must fail while the temp path is a directory.");

		assert!(matches!(err, StoreError::Backend { .. }));

		let credential =
			rt.block_on(store.credential()).expect("Credential read should succeed.");

		assert_eq!(credential, Credential::received(TokenSecret::new("kept")));
		assert_eq!(
			FileTokenStore::open(&path)
				.map(|reopened| reopened.inner.read().clone())
				.expect("Failed to reopen file store snapshot."),
			Credential::received(TokenSecret::new("kept"))
		);

		fs::remove_dir(&tmp_path).unwrap_or_else(|e| {
			panic!("Failed to remove blocking directory {}: {e}", tmp_path.display())
		});
		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
