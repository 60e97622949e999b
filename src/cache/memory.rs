//! Thread-safe in-memory [`DistributedCache`] for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	cache::{CacheEntryOptions, CacheError, CacheFuture, Clock, DistributedCache, SystemClock},
};

type EntryMap = Arc<RwLock<HashMap<String, Entry>>>;

#[derive(Clone, Debug)]
struct Entry {
	value: Vec<u8>,
	expires_at: Option<OffsetDateTime>,
}
impl Entry {
	fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|at| at <= now)
	}
}

/// In-process cache honoring absolute expirations against an injectable [`Clock`].
///
/// Expired entries are evicted lazily when touched; [`MemoryCache::purge_expired`] sweeps the
/// whole map on demand.
#[derive(Clone)]
pub struct MemoryCache {
	entries: EntryMap,
	clock: Arc<dyn Clock>,
}
impl MemoryCache {
	/// Creates an empty cache driven by `clock`.
	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self { entries: Default::default(), clock }
	}

	/// Removes every expired entry and returns how many were dropped.
	pub fn purge_expired(&self) -> usize {
		let now = self.clock.now();
		let mut guard = self.entries.write();
		let before = guard.len();

		guard.retain(|_, entry| !entry.is_expired_at(now));

		before - guard.len()
	}

	/// Number of live (unexpired) entries.
	pub fn len(&self) -> usize {
		let now = self.clock.now();

		self.entries.read().values().filter(|entry| !entry.is_expired_at(now)).count()
	}

	/// Returns true when no live entry remains.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn get_now(&self, key: &str) -> Option<Vec<u8>> {
		let now = self.clock.now();

		{
			let guard = self.entries.read();

			match guard.get(key) {
				None => return None,
				Some(entry) if !entry.is_expired_at(now) => return Some(entry.value.clone()),
				Some(_) => {},
			}
		}

		let mut guard = self.entries.write();

		if guard.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
			guard.remove(key);
		}

		None
	}

	fn set_now(&self, key: &str, value: Vec<u8>, options: &CacheEntryOptions) {
		let expires_at = options.absolute_expiration_relative_to_now.map(|ttl| self.clock.now() + ttl);

		self.entries.write().insert(key.to_owned(), Entry { value, expires_at });
	}
}
impl Default for MemoryCache {
	fn default() -> Self {
		Self::with_clock(Arc::new(SystemClock))
	}
}
impl Debug for MemoryCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryCache").field("entries", &self.entries.read().len()).finish()
	}
}
impl DistributedCache for MemoryCache {
	fn exists<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		Box::pin(async move { Ok(self.get_now(key).is_some()) })
	}

	fn get_bytes<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move { Ok(self.get_now(key)) })
	}

	fn set_bytes<'a>(
		&'a self,
		key: &'a str,
		value: Vec<u8>,
		options: &'a CacheEntryOptions,
	) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			if options.absolute_expiration_relative_to_now.is_some_and(|ttl| !ttl.is_positive()) {
				return Err(CacheError::Backend {
					message: "expiration relative to now must be positive".into(),
				});
			}

			self.set_now(key, value, options);

			Ok(())
		})
	}
}
