//! Chain length statistics for inspecting how keys spread over buckets.
//!
//! Compiled with the `stats` feature, or under `cfg(test)`.

use alloc::vec::Vec;

/// Number of bins in a [`ChainHistogram`]. Chains this long or longer share
/// the last bin.
pub const HISTOGRAM_BINS: usize = 16;

/// Debug statistics for hash table analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Maximum number of entries the table accepts
    pub capacity: usize,
    /// Number of buckets in the bucket array
    pub bucket_count: usize,
    /// Buckets whose chain holds at least one entry
    pub occupied_buckets: usize,
    /// Buckets that have had a chain created, including emptied ones
    pub allocated_chains: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Bucket utilization (occupied_buckets / bucket_count)
    pub bucket_utilization: f64,
}

impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Fixed Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Buckets: {}/{} occupied ({:.2}% utilization)",
            self.occupied_buckets,
            self.bucket_count,
            self.bucket_utilization * 100.0
        );
        println!("Chains allocated: {}", self.allocated_chains);
        println!("Longest chain: {}", self.longest_chain);
    }
}

/// Count of buckets per chain length.
///
/// Bin `n` holds the number of buckets whose chain has exactly `n` entries;
/// the last bin also absorbs every longer chain. Buckets that never received
/// a chain count as length zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHistogram {
    bins: Vec<usize>,
}

impl ChainHistogram {
    pub(crate) fn from_lengths(lengths: impl Iterator<Item = usize>) -> Self {
        let mut bins = alloc::vec![0usize; HISTOGRAM_BINS];
        for len in lengths {
            bins[len.min(HISTOGRAM_BINS - 1)] += 1;
        }
        ChainHistogram { bins }
    }

    /// The raw bins, indexed by chain length.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Total number of buckets counted.
    pub fn buckets(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("chain histogram ({} buckets):", self.buckets());
        for (len, &count) in self.bins.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            let label = if len == HISTOGRAM_BINS - 1 {
                alloc::format!("{len:>2}+")
            } else {
                alloc::format!("{len:>3}")
            };
            println!("{label} | {:<max_bar$} {count}", "█".repeat(width));
        }
    }
}
