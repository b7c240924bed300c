//! # Address Arithmetic Tests

use cachestore::{AddressCodec, CacheError, DecodedAddr};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(1, 2, 0x00, 0, 0)]
#[case(1, 2, 0x10, 0, 2)]
#[case(1, 2, 0x14, 1, 2)]
#[case(6, 6, 0x1234_5640, 0x19, 0x1234_5)]
#[case(0, 6, 0xFFC0, 0, 0x3FF)]
#[case(10, 0, 0x7FF, 0x3FF, 1)]
fn test_decompose_aligned(
    #[case] s: u32,
    #[case] b: u32,
    #[case] address: u64,
    #[case] set: usize,
    #[case] tag: u64,
) {
    let codec = AddressCodec::new(s, b);
    assert_eq!(
        codec.decompose(address),
        DecodedAddr {
            offset: 0,
            set,
            tag
        }
    );
    assert_eq!(codec.compose(tag, set, 0), address);
}

#[test]
fn test_offset_is_low_bits() {
    let codec = AddressCodec::new(4, 5);
    assert_eq!(codec.decompose(0x1F).offset, 0x1F);
    assert_eq!(codec.decompose(0x20).offset, 0);
}

#[test]
fn test_block_bytes() {
    assert_eq!(AddressCodec::new(3, 0).block_bytes(), 1);
    assert_eq!(AddressCodec::new(3, 6).block_bytes(), 64);
}

#[test]
fn test_misaligned_error_carries_block_size() {
    let codec = AddressCodec::new(1, 2);
    assert_eq!(
        codec.decompose_aligned(0x13),
        Err(CacheError::Misaligned {
            address: 0x13,
            block_bytes: 4
        })
    );
}

#[test]
fn test_max_width_split() {
    let codec = AddressCodec::new(0, 64);
    let d = codec.decompose(u64::MAX);
    assert_eq!((d.offset, d.set, d.tag), (u64::MAX, 0, 0));
    assert_eq!(codec.compose(0, 0, u64::MAX), u64::MAX);
}

proptest! {
    #[test]
    fn prop_round_trip_aligned(s in 0u32..=20, b in 0u32..=20, raw in any::<u64>()) {
        let codec = AddressCodec::new(s, b);
        let address = codec.align(raw);
        let d = codec.decompose(address);
        prop_assert_eq!(d.offset, 0);
        prop_assert_eq!(codec.compose(d.tag, d.set, d.offset), address);
        prop_assert_eq!(codec.block_address(d.tag, d.set), address);
    }

    #[test]
    fn prop_round_trip_any(s in 0u32..=32, b in 0u32..=32, address in any::<u64>()) {
        let codec = AddressCodec::new(s, b);
        let d = codec.decompose(address);
        prop_assert!((d.set as u64) < (1u64 << s));
        prop_assert_eq!(codec.compose(d.tag, d.set, d.offset), address);
    }

    #[test]
    fn prop_align_clears_only_offset(b in 0u32..=16, address in any::<u64>()) {
        let codec = AddressCodec::new(4, b);
        let aligned = codec.align(address);
        prop_assert!(codec.is_aligned(aligned));
        prop_assert!(address - aligned < codec.block_bytes());
    }
}
