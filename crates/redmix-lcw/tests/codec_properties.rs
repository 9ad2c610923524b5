//! Property tests for the LCW codec.

use proptest::prelude::*;
use redmix_lcw::{compress, decompress, decompress_with, max_compressed_size, Addressing, Error};

/// Buffers with a mix of runs, repeats and noise.
fn structured_data() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            prop::collection::vec(any::<u8>(), 1..40),
            (any::<u8>(), 1usize..300).prop_map(|(b, n)| vec![b; n]),
            (prop::collection::vec(any::<u8>(), 1..8), 1usize..20)
                .prop_map(|(pattern, times)| pattern.repeat(times)),
        ],
        0..30,
    )
    .prop_map(|chunks| chunks.concat())
}

proptest! {
    #[test]
    fn round_trip_arbitrary(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let packed = compress(&data);
        prop_assert!(packed.len() <= max_compressed_size(data.len()));
        prop_assert_eq!(decompress(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn round_trip_structured(data in structured_data()) {
        let packed = compress(&data);
        prop_assert!(packed.len() <= max_compressed_size(data.len()));
        prop_assert_eq!(decompress(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn strict_prefix_is_rejected(data in structured_data(), cut in any::<prop::sample::Index>()) {
        let packed = compress(&data);
        let cut = cut.index(packed.len());
        // Every proper prefix stops short of the single end marker.
        let result = decompress(&packed[..cut], data.len());
        let is_truncated = matches!(result, Err(Error::Truncated { .. }));
        prop_assert!(is_truncated);
    }

    #[test]
    fn undersized_capacity_is_rejected(data in prop::collection::vec(any::<u8>(), 1..512)) {
        let packed = compress(&data);
        let result = decompress(&packed, data.len() - 1);
        let is_overflow = matches!(result, Err(Error::OutputOverflow { .. }));
        prop_assert!(is_overflow);
    }

    #[test]
    fn garbage_never_panics(
        input in prop::collection::vec(any::<u8>(), 0..256),
        capacity in 0usize..1024,
    ) {
        for addressing in [Addressing::Absolute, Addressing::Relative] {
            if let Ok(out) = decompress_with(&input, capacity, addressing) {
                prop_assert!(out.len() <= capacity);
            }
        }
    }
}
