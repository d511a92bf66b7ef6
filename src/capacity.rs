//! Bucket array sizing and indexing.
//!
//! A table's bucket count is the smallest power of two that can hold the
//! requested capacity, so a bucket index is a mask of the hash rather than a
//! modulo. The count never drops below one (a zero-capacity table still has a
//! bucket to index into) and never exceeds the configured maximum. Oversized
//! requests are clamped instead of failing: the table still works, chains are
//! just longer than the capacity would suggest.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        /// Largest bucket array a table allocates unless a smaller or larger
        /// maximum is configured through [`TableBuilder`](crate::TableBuilder).
        pub const MAX_BUCKET_COUNT: usize = 1 << 20;
    } else {
        /// Largest bucket array a table allocates unless a smaller or larger
        /// maximum is configured through [`TableBuilder`](crate::TableBuilder).
        pub const MAX_BUCKET_COUNT: usize = 1 << 16;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BucketCount {
    count: usize,
    clamped: bool,
}

impl BucketCount {
    /// Sizes the bucket array for `capacity` entries, never exceeding
    /// `max_bucket_count` rounded down to a power of two.
    pub(crate) fn new(capacity: usize, max_bucket_count: usize) -> Self {
        let max = round_down_to_power_of_two(max_bucket_count);
        match capacity.checked_next_power_of_two() {
            Some(count) if count <= max => BucketCount {
                count,
                clamped: false,
            },
            _ => BucketCount {
                count: max,
                clamped: true,
            },
        }
    }

    #[inline(always)]
    pub(crate) fn get(self) -> usize {
        self.count
    }

    #[inline(always)]
    pub(crate) fn mask(self) -> usize {
        self.count - 1
    }

    pub(crate) fn was_clamped(self) -> bool {
        self.clamped
    }
}

/// Largest power of two `<= n`, or 1 when `n` is 0.
pub(crate) fn round_down_to_power_of_two(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

/// Maps a hash to a bucket. `mask` must be a bucket count minus one.
#[inline(always)]
pub(crate) fn index_for(hash: u64, mask: usize) -> usize {
    debug_assert!(mask.wrapping_add(1).is_power_of_two());
    (hash as usize) & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_power_of_two() {
        assert_eq!(BucketCount::new(1, MAX_BUCKET_COUNT).get(), 1);
        assert_eq!(BucketCount::new(2, MAX_BUCKET_COUNT).get(), 2);
        assert_eq!(BucketCount::new(3, MAX_BUCKET_COUNT).get(), 4);
        assert_eq!(BucketCount::new(10, MAX_BUCKET_COUNT).get(), 16);
        assert_eq!(BucketCount::new(1024, MAX_BUCKET_COUNT).get(), 1024);
        assert_eq!(BucketCount::new(1025, MAX_BUCKET_COUNT).get(), 2048);
    }

    #[test]
    fn zero_capacity_still_has_one_bucket() {
        let buckets = BucketCount::new(0, MAX_BUCKET_COUNT);
        assert_eq!(buckets.get(), 1);
        assert_eq!(buckets.mask(), 0);
        assert!(!buckets.was_clamped());
    }

    #[test]
    fn oversized_capacity_is_clamped() {
        let buckets = BucketCount::new(usize::MAX, MAX_BUCKET_COUNT);
        assert_eq!(buckets.get(), MAX_BUCKET_COUNT);
        assert!(buckets.was_clamped());

        let buckets = BucketCount::new((1 << 31) + 1, 64);
        assert_eq!(buckets.get(), 64);
        assert!(buckets.was_clamped());

        let buckets = BucketCount::new(64, 64);
        assert_eq!(buckets.get(), 64);
        assert!(!buckets.was_clamped());
    }

    #[test]
    fn maximum_is_rounded_down() {
        assert_eq!(BucketCount::new(1000, 100).get(), 64);
        assert_eq!(BucketCount::new(1000, 0).get(), 1);
        assert_eq!(BucketCount::new(1000, usize::MAX).get(), 1024);
        assert_eq!(round_down_to_power_of_two(usize::MAX), 1 << (usize::BITS - 1));
    }

    #[test]
    fn bucket_count_is_always_power_of_two() {
        for capacity in (0..5000).chain([usize::MAX / 2, usize::MAX - 1, usize::MAX]) {
            for max in [0, 1, 7, 64, 1000, MAX_BUCKET_COUNT] {
                let buckets = BucketCount::new(capacity, max);
                assert!(buckets.get().is_power_of_two(), "{capacity} / {max}");
                assert!(buckets.get() >= 1);
            }
        }
    }

    #[test]
    fn index_masks_hash() {
        assert_eq!(index_for(0xFFFF_FFFF_FFFF_FFFF, 0), 0);
        assert_eq!(index_for(0b1011, 0b11), 0b11);
        assert_eq!(index_for(0b1000, 0b111), 0);
        assert_eq!(index_for(u64::MAX, 15), 15);
    }
}
