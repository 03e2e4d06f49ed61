//! Character k-shingling for plain text.
//!
//! Text is lowercased and every run of whitespace collapses to one space
//! before windows of `k` characters are hashed with xxh3 and folded into
//! the shingle universe `[0, num_shingles)`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Turns text into a set of `u32` shingle ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shingler {
    k: usize,
    num_shingles: u32,
    seed: u64,
}

impl Shingler {
    /// `k` and `num_shingles` are clamped to at least 1.
    pub fn new(k: usize, num_shingles: u32) -> Self {
        Self {
            k: k.max(1),
            num_shingles: num_shingles.max(1),
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_shingles(&self) -> u32 {
        self.num_shingles
    }

    /// Shingle ids of `text`.
    ///
    /// Text shorter than `k` characters yields a single shingle; text that is
    /// empty after normalization yields none.
    pub fn shingle(&self, text: &str) -> HashSet<u32> {
        let normalized = normalize(text);
        let chars: Vec<char> = normalized.chars().collect();
        let mut shingles = HashSet::new();
        if chars.is_empty() {
            return shingles;
        }
        if chars.len() < self.k {
            shingles.insert(self.fold(&normalized));
            return shingles;
        }

        let mut window = String::with_capacity(self.k * 4);
        for start in 0..=chars.len() - self.k {
            window.clear();
            window.extend(&chars[start..start + self.k]);
            shingles.insert(self.fold(&window));
        }
        shingles
    }

    fn fold(&self, window: &str) -> u32 {
        (xxh3_64_with_seed(window.as_bytes(), self.seed) % u64::from(self.num_shingles)) as u32
    }
}

fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}
