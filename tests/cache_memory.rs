// std
use std::sync::Arc;
// crates.io
use time::{Duration, macros};
// self
use oauth2_gate::cache::{
	CacheEntryOptions, CacheError, CacheGate, DistributedCache, ManualClock, MemoryCache,
};

fn cache_at_epoch() -> (MemoryCache, ManualClock) {
	let clock = ManualClock::new(macros::datetime!(2030-06-01 12:00 UTC));

	(MemoryCache::with_clock(Arc::new(clock.clone())), clock)
}

#[tokio::test]
async fn entries_expire_at_their_deadline() {
	let (cache, clock) = cache_at_epoch();
	let ttl = CacheEntryOptions::expires_after(Duration::minutes(1));

	cache.set_bytes("k", b"v".to_vec(), &ttl).await.expect("Write should succeed.");

	clock.advance(Duration::seconds(59));

	assert!(cache.exists("k").await.expect("Lookup should succeed."));

	clock.advance(Duration::seconds(1));

	assert!(!cache.exists("k").await.expect("Lookup should succeed."));
	assert_eq!(cache.get_bytes("k").await.expect("Read should succeed."), None);
}

#[tokio::test]
async fn entries_without_expiration_live_forever() {
	let (cache, clock) = cache_at_epoch();

	cache
		.set_bytes("pinned", b"v".to_vec(), &CacheEntryOptions::default())
		.await
		.expect("Write should succeed.");
	clock.advance(Duration::days(365));

	assert_eq!(
		cache.get_bytes("pinned").await.expect("Read should succeed."),
		Some(b"v".to_vec())
	);
}

#[tokio::test]
async fn rewriting_a_key_resets_its_deadline() {
	let (cache, clock) = cache_at_epoch();
	let ttl = CacheEntryOptions::expires_after(Duration::minutes(1));

	cache.set_bytes("k", b"old".to_vec(), &ttl).await.expect("Write should succeed.");
	clock.advance(Duration::seconds(45));
	cache.set_bytes("k", b"new".to_vec(), &ttl).await.expect("Rewrite should succeed.");
	clock.advance(Duration::seconds(45));

	assert_eq!(cache.get_bytes("k").await.expect("Read should succeed."), Some(b"new".to_vec()));
}

#[tokio::test]
async fn purge_drops_only_expired_entries() {
	let (cache, clock) = cache_at_epoch();

	cache
		.set_bytes("short", b"a".to_vec(), &CacheEntryOptions::expires_after(Duration::seconds(10)))
		.await
		.expect("Write should succeed.");
	cache
		.set_bytes("long", b"b".to_vec(), &CacheEntryOptions::expires_after(Duration::hours(1)))
		.await
		.expect("Write should succeed.");
	cache
		.set_bytes("pinned", b"c".to_vec(), &CacheEntryOptions::default())
		.await
		.expect("Write should succeed.");

	assert_eq!(cache.len(), 3);

	clock.advance(Duration::minutes(1));

	assert_eq!(cache.len(), 2);
	assert_eq!(cache.purge_expired(), 1);
	assert_eq!(cache.purge_expired(), 0);
	assert!(!cache.is_empty());
}

#[tokio::test]
async fn non_positive_expirations_are_rejected() {
	let (cache, _clock) = cache_at_epoch();

	for ttl in [Duration::ZERO, Duration::seconds(-5)] {
		let err = cache
			.set_bytes("k", b"v".to_vec(), &CacheEntryOptions::expires_after(ttl))
			.await
			.expect_err("Non-positive expirations must be rejected.");

		assert!(matches!(err, CacheError::Backend { .. }));
	}

	assert!(cache.is_empty());
}

#[tokio::test]
async fn gate_round_trips_through_memory_backend() {
	let (cache, clock) = cache_at_epoch();
	let gate = CacheGate::new(Arc::new(cache));
	let ttl = CacheEntryOptions::expires_after(Duration::minutes(5));

	gate.set("greeting", "hello", &ttl).await.expect("String write should succeed.");

	assert!(gate.has("greeting").await.expect("Lookup should succeed."));
	assert_eq!(
		gate.get("greeting").await.expect("Read should succeed.").as_deref(),
		Some("hello")
	);

	clock.advance(Duration::minutes(5));

	assert!(!gate.has("greeting").await.expect("Lookup should succeed."));
	assert_eq!(gate.get("greeting").await.expect("Read should succeed."), None);
}

#[tokio::test]
async fn empty_entries_do_not_count_as_present() {
	let (cache, _clock) = cache_at_epoch();
	let backend = Arc::new(cache);
	let gate = CacheGate::new(backend.clone());

	gate.set("blank", "", &CacheEntryOptions::default()).await.expect("Write should succeed.");

	assert!(!gate.has("blank").await.expect("Lookup should succeed."));
	assert!(backend.exists("blank").await.expect("Backend lookup should succeed."));
	assert_eq!(gate.get("blank").await.expect("Read should succeed.").as_deref(), Some(""));
}
