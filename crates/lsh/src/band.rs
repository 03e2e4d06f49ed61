//! Band projection and per-band bucket maps.
//!
//! Band `b` covers signature columns `b·r .. (b+1)·r` where `r` is the
//! number of rows per band. Each document's sub-row is serialized as
//! fixed-width little-endian words, so distinct sub-rows never produce the
//! same key, and the key is hashed with xxh3 under the band's seed.

use std::collections::HashMap;

use minhash::SignatureMatrix;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Projects signature sub-rows onto bucket ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandHasher {
    rows_per_band: usize,
    num_buckets: u64,
}

impl BandHasher {
    pub fn new(rows_per_band: usize, num_buckets: u64) -> Self {
        Self {
            rows_per_band,
            num_buckets: num_buckets.max(1),
        }
    }

    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    pub fn num_buckets(&self) -> u64 {
        self.num_buckets
    }

    /// Bucket id in `[0, num_buckets)` for one band's sub-row.
    ///
    /// `key` is scratch space reused across calls.
    pub fn bucket_id(&self, sub_row: &[u32], seed: u64, key: &mut Vec<u8>) -> u64 {
        key.clear();
        for value in sub_row {
            key.extend_from_slice(&value.to_le_bytes());
        }
        xxh3_64_with_seed(key, seed) % self.num_buckets
    }

    /// Columns of the signature matrix covered by `band`.
    pub fn columns(&self, band: usize) -> std::ops::Range<usize> {
        let start = band * self.rows_per_band;
        start..start + self.rows_per_band
    }

    /// Group every document of `matrix` by its bucket in `band`.
    pub fn bucket_map(&self, matrix: &SignatureMatrix, band: usize, seed: u64) -> BucketMap {
        let columns = self.columns(band);
        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
        let mut key = Vec::with_capacity(self.rows_per_band * 4);
        for doc in 0..matrix.len() {
            let sub_row = &matrix.row(doc)[columns.clone()];
            let bucket = self.bucket_id(sub_row, seed, &mut key);
            buckets.entry(bucket).or_default().push(doc);
        }
        BucketMap { band, buckets }
    }
}

/// Documents grouped by bucket for a single band.
///
/// Each bucket lists internal document ids in ascending order.
#[derive(Debug, Clone, Default)]
pub struct BucketMap {
    band: usize,
    buckets: HashMap<u64, Vec<usize>>,
}

impl BucketMap {
    pub fn band(&self) -> usize {
        self.band
    }

    /// Number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, bucket: u64) -> Option<&[usize]> {
        self.buckets.get(&bucket).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &[usize])> + '_ {
        self.buckets
            .iter()
            .map(|(&bucket, docs)| (bucket, docs.as_slice()))
    }

    /// Buckets that hold at least two documents.
    pub fn candidate_buckets(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.buckets
            .values()
            .filter(|docs| docs.len() >= 2)
            .map(Vec::as_slice)
    }

    /// Unordered pairs formed within buckets, before deduplication.
    pub fn candidate_pair_count(&self) -> usize {
        self.candidate_buckets()
            .map(|docs| docs.len() * (docs.len() - 1) / 2)
            .sum()
    }
}
