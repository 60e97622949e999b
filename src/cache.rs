//! Cache contracts and the [`CacheGate`] that mediates token serialization.
//!
//! The backing store is an external collaborator: anything implementing the narrow
//! [`DistributedCache`] contract (exists, get bytes, set bytes with a TTL) can sit behind the
//! gate. [`MemoryCache`] ships for single-process deployments and tests.

pub mod clock;
pub mod memory;

pub use clock::*;
pub use memory::MemoryCache;

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::_prelude::*;

/// Boxed future returned by [`DistributedCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Storage contract for the distributed cache behind the gate.
pub trait DistributedCache
where
	Self: Send + Sync,
{
	/// Returns true when an entry, possibly empty, exists under `key`.
	///
	/// Part of the backend contract for callers that only probe presence. [`CacheGate::has`]
	/// reads the bytes instead, since it must also treat zero-length entries as absent.
	fn exists<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool>;

	/// Fetches the raw bytes stored under `key`, if any.
	fn get_bytes<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<Vec<u8>>>;

	/// Stores `value` under `key`, replacing any previous entry.
	fn set_bytes<'a>(
		&'a self,
		key: &'a str,
		value: Vec<u8>,
		options: &'a CacheEntryOptions,
	) -> CacheFuture<'a, ()>;
}

/// Expiration policy applied to a single cache write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheEntryOptions {
	/// Entry lifetime measured from the moment of the write; `None` never expires.
	pub absolute_expiration_relative_to_now: Option<Duration>,
}
impl CacheEntryOptions {
	/// Builds options that expire the entry `ttl` after it is written.
	pub fn expires_after(ttl: Duration) -> Self {
		Self { absolute_expiration_relative_to_now: Some(ttl) }
	}
}

/// Error type produced by the cache gate and [`DistributedCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CacheError {
	/// Cache key was empty or whitespace-only.
	#[error("Cache key cannot be empty or whitespace.")]
	InvalidKey,
	/// Value to cache was missing (serialized to `null`).
	#[error("Cache value cannot be null.")]
	InvalidValue,
	/// Serialization failures raised while encoding or decoding values.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Keyed has/get/set facade over a [`DistributedCache`].
///
/// Every call is a pass-through to the backing store; the gate keeps no secondary copy and takes
/// no locks of its own.
#[derive(Clone)]
pub struct CacheGate {
	backend: Arc<dyn DistributedCache>,
}
impl CacheGate {
	/// Wraps a backing store.
	pub fn new(backend: Arc<dyn DistributedCache>) -> Self {
		Self { backend }
	}

	/// Returns true iff a non-empty entry exists under `key`.
	pub async fn has(&self, key: &str) -> Result<bool, CacheError> {
		let entry = self.backend.get_bytes(key).await?;

		Ok(entry.is_some_and(|bytes| !bytes.is_empty()))
	}

	/// Returns the text stored under `key`.
	pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
		ensure_key(key)?;

		match self.backend.get_bytes(key).await? {
			Some(bytes) => String::from_utf8(bytes)
				.map(Some)
				.map_err(|e| CacheError::Serialization { message: e.to_string() }),
			None => Ok(None),
		}
	}

	/// Decodes the JSON stored under `key`.
	pub async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
	where
		T: DeserializeOwned,
	{
		match self.get(key).await? {
			Some(text) => serde_json::from_str(&text)
				.map(Some)
				.map_err(|e| CacheError::Serialization { message: e.to_string() }),
			None => Ok(None),
		}
	}

	/// Stores `value` under `key` using `options`.
	///
	/// Values that serialize to a JSON string are stored as that raw string; everything else is
	/// stored as JSON text.
	pub async fn set<V>(
		&self,
		key: &str,
		value: &V,
		options: &CacheEntryOptions,
	) -> Result<(), CacheError>
	where
		V: ?Sized + Serialize,
	{
		ensure_key(key)?;

		let text = match serde_json::to_value(value)
			.map_err(|e| CacheError::Serialization { message: e.to_string() })?
		{
			Value::Null => return Err(CacheError::InvalidValue),
			Value::String(s) => s,
			other => other.to_string(),
		};

		self.backend.set_bytes(key, text.into_bytes(), options).await
	}
}
impl Debug for CacheGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CacheGate(..)")
	}
}

fn ensure_key(key: &str) -> Result<(), CacheError> {
	if key.trim().is_empty() { Err(CacheError::InvalidKey) } else { Ok(()) }
}
