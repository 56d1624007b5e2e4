//! Synthetic key dataset
//!
//! Key layout (32 bits):
//!   bits 22..34  12 random bits (the top two fall off the end)
//!   bits  0..22  element index
//!
//! key[i] = ((random16 & 0xFFF) << 22) ^ i

mod source;

pub use source::{KeySource, SeededSource};

use crate::config::SIZE_SHIFT;
use thiserror::Error;

/// Mask applied to each 16-bit random draw.
pub const RANDOM_MASK: u16 = 0x0FFF;

/// Dataset allocation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot allocate dataset of {len} 32-bit integers, out of memory")]
pub struct DatasetError {
    /// Requested number of elements
    pub len: usize,
}

/// Compute the key for element `index` from one random draw.
#[inline]
pub fn key_for(index: usize, random16: u16) -> i32 {
    let high = u32::from(random16 & RANDOM_MASK) << SIZE_SHIFT;
    (high ^ index as u32) as i32
}

/// Fixed-length buffer of generated keys, allocated once per invocation.
#[derive(Debug)]
pub struct Dataset {
    keys: Vec<i32>,
}

impl Dataset {
    /// Allocate a zeroed dataset of `len` keys.
    ///
    /// Uses fallible allocation so that exhaustion surfaces as an error
    /// instead of aborting the process.
    pub fn allocate(len: usize) -> Result<Self, DatasetError> {
        let mut keys = Vec::new();
        keys.try_reserve_exact(len)
            .map_err(|_| DatasetError { len })?;
        keys.resize(len, 0);
        Ok(Self { keys })
    }

    /// Regenerate every key in place, in index order.
    pub fn regenerate<S: KeySource + ?Sized>(&mut self, source: &mut S) {
        for (index, key) in self.keys.iter_mut().enumerate() {
            *key = key_for(index, source.next_u16());
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the dataset holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All keys.
    pub fn keys(&self) -> &[i32] {
        &self.keys
    }

    /// Keys for in-place rewriting; the length stays fixed.
    pub fn keys_mut(&mut self) -> &mut [i32] {
        &mut self.keys
    }

    /// Size of the key buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.keys.len() * std::mem::size_of::<i32>()
    }

    /// Content fingerprint, used to compare runs for determinism.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for key in &self.keys {
            hasher.update(&key.to_le_bytes());
        }
        hasher.finalize()
    }
}
