//! Miss handling: fullness check, victim choice, erase, refill.

use cachestore::sim::AccessOutcome::{Hit, Miss, MissEvicted};
use cachestore::{CacheConfig, PolicyKind};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::TestHarness;

#[rstest]
#[case(PolicyKind::Lru)]
#[case(PolicyKind::Fifo)]
fn test_fill_then_evict_oldest(#[case] policy: PolicyKind) {
    let mut h = TestHarness::small(policy);

    assert_eq!(h.outcome(0x00), Miss);
    assert_eq!(h.outcome(0x10), Miss);
    assert_eq!(h.outcome(0x20), MissEvicted { victim: 0x00 });
    assert_eq!(h.outcome(0x20), Hit);
    assert_eq!(h.outcome(0x10), Hit);
}

#[test]
fn test_lru_keeps_recently_used() {
    let mut h = TestHarness::small(PolicyKind::Lru);
    h.read(0x00);
    h.read(0x10);
    h.read(0x00);
    assert_eq!(h.outcome(0x20), MissEvicted { victim: 0x10 });
    assert_eq!(h.outcome(0x00), Hit);
}

#[test]
fn test_fifo_evicts_despite_reuse() {
    let mut h = TestHarness::small(PolicyKind::Fifo);
    h.read(0x00);
    h.read(0x10);
    h.read(0x00);
    assert_eq!(h.outcome(0x20), MissEvicted { victim: 0x00 });
    assert_eq!(h.outcome(0x00), MissEvicted { victim: 0x10 });
}

#[test]
fn test_sets_are_independent() {
    let mut h = TestHarness::small(PolicyKind::Lru);
    h.read(0x00);
    h.read(0x10);
    assert_eq!(h.outcome(0x04), Miss);
    assert_eq!(h.outcome(0x14), Miss);
    assert_eq!(h.outcome(0x00), Hit);
    assert_eq!(h.driver.store().occupancy(), 4);
}

#[test]
fn test_written_data_survives_eviction() {
    let mut h = TestHarness::small(PolicyKind::Lru);
    h.write(0x01, 0x11);
    h.write(0x12, 0x22);
    h.read(0x20);
    h.read(0x30);

    assert_eq!(h.driver.backing().block(0x00), Some(&[0, 0x11, 0, 0][..]));
    assert_eq!(h.driver.backing().block(0x10), Some(&[0, 0, 0x22, 0][..]));

    assert_eq!(h.read(0x01).value, 0x11);
    assert_eq!(h.read(0x12).value, 0x22);
}

#[test]
fn test_stats_follow_protocol() {
    let mut h = TestHarness::small(PolicyKind::Lru);
    for a in [0x00, 0x10, 0x00, 0x20, 0x30, 0x00] {
        h.read(a);
    }
    let stats = h.stats();
    assert_eq!((stats.hits, stats.misses), (1, 5));
    assert_eq!(stats.insertions, 5);
    assert_eq!(stats.evictions, stats.erasures);
    assert_eq!(stats.evictions, 3);
    assert_eq!(stats.full_checks, 5);
    assert_eq!(h.driver.backing().write_backs(), 3);
}

#[test]
fn test_direct_mapped_conflicts() {
    let mut h = TestHarness::new(CacheConfig::new(2, 1, 4));
    assert_eq!(h.outcome(0x000), Miss);
    assert_eq!(h.outcome(0x040), MissEvicted { victim: 0x000 });
    assert_eq!(h.outcome(0x010), Miss);
    assert_eq!(h.outcome(0x04F), Hit);
}
