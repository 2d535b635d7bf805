//! Thread-safe bit set over the node id space.

use std::sync::atomic::AtomicU64;

use super::{check_index, AtomicPagedArray};
use crate::error::Result;
use crate::memory::MemoryRange;

const BITS_PER_WORD: u64 = 64;

/// One bit per node, backed by paged atomic words.
///
/// Neighbouring nodes share a word, so even writers that own disjoint node
/// ranges must update words atomically.
#[derive(Debug)]
pub struct HugeAtomicBitSet {
    words: AtomicPagedArray<AtomicU64>,
    num_bits: u64,
}

impl HugeAtomicBitSet {
    /// Creates a cleared bit set of `num_bits` bits.
    pub fn new(num_bits: u64, page_shift: u32) -> Result<Self> {
        Ok(Self {
            words: AtomicPagedArray::with_page_shift(num_bits.div_ceil(BITS_PER_WORD), page_shift)?,
            num_bits,
        })
    }

    /// Returns the number of addressable bits.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.num_bits
    }

    /// Returns the bit at `index`.
    #[inline]
    pub fn get(&self, index: u64) -> Result<bool> {
        check_index(index, self.num_bits)?;
        let word = self.words.get(index / BITS_PER_WORD)?;
        Ok(word & Self::mask(index) != 0)
    }

    /// Sets the bit at `index`.
    #[inline]
    pub fn set(&self, index: u64) -> Result<()> {
        self.get_and_set(index).map(|_| ())
    }

    /// Sets the bit at `index`, returning its previous state.
    pub fn get_and_set(&self, index: u64) -> Result<bool> {
        check_index(index, self.num_bits)?;
        let mask = Self::mask(index);
        let previous = self.words.update(index / BITS_PER_WORD, |word| word | mask)?;
        Ok(previous & mask != 0)
    }

    /// Clears the bit at `index`.
    pub fn clear(&self, index: u64) -> Result<()> {
        check_index(index, self.num_bits)?;
        let mask = Self::mask(index);
        self.words.update(index / BITS_PER_WORD, |word| word & !mask)?;
        Ok(())
    }

    /// Clears every bit.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Number of set bits.
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        self.words.iter().map(|word| u64::from(word.count_ones())).sum()
    }

    /// True if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| word == 0)
    }

    /// True if every addressable bit is set.
    #[must_use]
    pub fn all_set(&self) -> bool {
        self.cardinality() == self.num_bits
    }

    /// Exact memory footprint for `num_bits` bits.
    pub fn memory_estimation(num_bits: u64, page_shift: u32) -> Result<MemoryRange> {
        AtomicPagedArray::<AtomicU64>::memory_estimation(num_bits.div_ceil(BITS_PER_WORD), page_shift)
    }

    #[inline]
    fn mask(index: u64) -> u64 {
        1u64 << (index % BITS_PER_WORD)
    }
}
