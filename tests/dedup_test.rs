use news_router::{DedupKey, Deduplicator, SyncDeduplicator};

#[test]
fn key_is_split_sensitive() {
    // same concatenation, different split points
    assert_ne!(
        DedupKey::of_words(&["wo", "rld"]),
        DedupKey::of_words(&["worl", "d"])
    );
    assert_ne!(
        DedupKey::of_words(&["ab", "c"]),
        DedupKey::of_words(&["a", "bc"])
    );
    assert_eq!(
        DedupKey::of_words(&["hello", "world"]),
        DedupKey::of_words(&["hello", "world"])
    );
    // order-sensitive
    assert_ne!(
        DedupKey::of_words(&["a", "b"]),
        DedupKey::of_words(&["b", "a"])
    );
}

#[test]
fn fifo_eviction_at_capacity() {
    let mut dedup = Deduplicator::new(4);
    let keys: Vec<DedupKey> = ["k0", "k1", "k2", "k3", "k4"]
        .iter()
        .map(|s| DedupKey::of_words(&[s]))
        .collect();

    for key in &keys[..4] {
        assert!(dedup.keep(*key), "fresh keys are kept");
    }
    assert_eq!(dedup.len(), 4);

    assert!(!dedup.keep(keys[0]), "k0 is already cached");
    assert!(dedup.keep(keys[4]), "k4 evicts the oldest entry (k0)");
    assert!(!dedup.keep(keys[1]), "k1 is not evicted yet");
    assert!(!dedup.keep(keys[3]), "k3 is still cached");
    assert!(dedup.keep(keys[0]), "k0 was evicted, so it is kept again");
    assert!(
        !dedup.keep(keys[2]),
        "k2 survives, only the oldest entry went out"
    );
    assert_eq!(dedup.len(), 4, "capacity is exactly four");
}

#[test]
#[should_panic(expected = "capacity")]
fn zero_capacity_is_a_misuse() {
    let _ = Deduplicator::new(0);
}

#[test]
fn sync_wrapper_keeps_semantics() {
    let dedup = SyncDeduplicator::from(Deduplicator::new(2));
    let key = DedupKey::of_words(&["x"]);
    assert!(dedup.keep(key));
    assert!(!dedup.keep(key));
}
