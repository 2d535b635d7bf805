//! Paged arrays with lock-free per-slot updates.
//!
//! Every operation is linearizable per index; there is no cross-index
//! atomicity. Used for node values shared by worker threads, message
//! aggregation and the vote bits.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use super::{paged_bytes, PagedSlots, DEFAULT_PAGE_SHIFT};
use crate::error::Result;
use crate::memory::MemoryRange;

/// A 64-bit atomic cell that can back an [`AtomicPagedArray`].
pub trait AtomicSlot: Send + Sync {
    /// Plain value stored in the cell.
    type Value: Copy + Send + Sync;

    /// Creates a cell holding `value`.
    fn new_slot(value: Self::Value) -> Self;
    /// Loads the current value.
    fn load_value(&self) -> Self::Value;
    /// Stores `value`.
    fn store_value(&self, value: Self::Value);
    /// Stores `new` if the cell holds `current`; returns the previous value
    /// on success and the observed value on failure.
    fn compare_exchange_value(
        &self,
        current: Self::Value,
        new: Self::Value,
    ) -> std::result::Result<Self::Value, Self::Value>;
    /// Atomically adds `delta`, returning the previous value.
    fn fetch_add_value(&self, delta: Self::Value) -> Self::Value;
}

impl AtomicSlot for AtomicI64 {
    type Value = i64;

    fn new_slot(value: i64) -> Self {
        AtomicI64::new(value)
    }

    #[inline]
    fn load_value(&self) -> i64 {
        self.load(Ordering::Acquire)
    }

    #[inline]
    fn store_value(&self, value: i64) {
        self.store(value, Ordering::Release);
    }

    #[inline]
    fn compare_exchange_value(&self, current: i64, new: i64) -> std::result::Result<i64, i64> {
        self.compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire)
    }

    #[inline]
    fn fetch_add_value(&self, delta: i64) -> i64 {
        self.fetch_add(delta, Ordering::AcqRel)
    }
}

impl AtomicSlot for AtomicU64 {
    type Value = u64;

    fn new_slot(value: u64) -> Self {
        AtomicU64::new(value)
    }

    #[inline]
    fn load_value(&self) -> u64 {
        self.load(Ordering::Acquire)
    }

    #[inline]
    fn store_value(&self, value: u64) {
        self.store(value, Ordering::Release);
    }

    #[inline]
    fn compare_exchange_value(&self, current: u64, new: u64) -> std::result::Result<u64, u64> {
        self.compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire)
    }

    #[inline]
    fn fetch_add_value(&self, delta: u64) -> u64 {
        self.fetch_add(delta, Ordering::AcqRel)
    }
}

/// `f64` stored as its bit pattern in an `AtomicU64`.
///
/// Compare-and-exchange compares bit patterns, so `NaN` matches itself and
/// `0.0` does not match `-0.0`.
#[derive(Debug, Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Creates a new atomic float.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }
}

impl AtomicSlot for AtomicF64 {
    type Value = f64;

    fn new_slot(value: f64) -> Self {
        Self::new(value)
    }

    #[inline]
    fn load_value(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    fn store_value(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    #[inline]
    fn compare_exchange_value(&self, current: f64, new: f64) -> std::result::Result<f64, f64> {
        self.0
            .compare_exchange(
                current.to_bits(),
                new.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(f64::from_bits)
            .map_err(f64::from_bits)
    }

    fn fetch_add_value(&self, delta: f64) -> f64 {
        let mut current = self.load_value();
        loop {
            match self.compare_exchange_value(current, current + delta) {
                Ok(previous) => return previous,
                Err(observed) => current = observed,
            }
        }
    }
}

/// Paged array of 64-bit signed integers with atomic slots.
pub type HugeAtomicLongArray = AtomicPagedArray<AtomicI64>;
/// Paged array of 64-bit floats with atomic slots.
pub type HugeAtomicDoubleArray = AtomicPagedArray<AtomicF64>;

/// Paged array whose slots can be updated concurrently through `&self`.
///
/// # Example
///
/// ```rust
/// use superstep_core::collections::HugeAtomicLongArray;
///
/// let counters = HugeAtomicLongArray::new(8).unwrap();
/// assert_eq!(counters.get_and_add(3, 5).unwrap(), 0);
/// assert!(counters.compare_and_set(3, 5, 7).unwrap());
/// assert!(!counters.compare_and_set(3, 5, 9).unwrap());
/// assert_eq!(counters.get(3).unwrap(), 7);
/// ```
#[derive(Debug)]
pub struct AtomicPagedArray<A> {
    slots: PagedSlots<A>,
}

impl<A: AtomicSlot> AtomicPagedArray<A>
where
    A::Value: Default,
{
    /// Creates an array of `size` default values with the default page size.
    pub fn new(size: u64) -> Result<Self> {
        Self::with_page_shift(size, DEFAULT_PAGE_SHIFT)
    }

    /// Creates an array of `size` default values.
    pub fn with_page_shift(size: u64, page_shift: u32) -> Result<Self> {
        Self::filled(size, page_shift, A::Value::default())
    }
}

impl<A: AtomicSlot> AtomicPagedArray<A> {
    /// Creates an array of `size` slots initialised to `value`.
    pub fn filled(size: u64, page_shift: u32, value: A::Value) -> Result<Self> {
        Ok(Self {
            slots: PagedSlots::new_with(size, page_shift, || A::new_slot(value))?,
        })
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.slots.size()
    }

    /// Returns the page shift.
    #[must_use]
    pub fn page_shift(&self) -> u32 {
        self.slots.layout().shift()
    }

    /// Returns the value at `index`.
    #[inline]
    pub fn get(&self, index: u64) -> Result<A::Value> {
        Ok(self.slots.slot(index)?.load_value())
    }

    /// Stores `value` at `index`.
    #[inline]
    pub fn set(&self, index: u64, value: A::Value) -> Result<()> {
        self.slots.slot(index)?.store_value(value);
        Ok(())
    }

    /// Sets `index` to `new` if it currently holds `expected`.
    pub fn compare_and_set(&self, index: u64, expected: A::Value, new: A::Value) -> Result<bool> {
        Ok(self
            .slots
            .slot(index)?
            .compare_exchange_value(expected, new)
            .is_ok())
    }

    /// Sets `index` to `new` if it currently holds `expected`; returns the
    /// value observed before the operation.
    pub fn compare_and_exchange(
        &self,
        index: u64,
        expected: A::Value,
        new: A::Value,
    ) -> Result<A::Value> {
        Ok(match self.slots.slot(index)?.compare_exchange_value(expected, new) {
            Ok(previous) | Err(previous) => previous,
        })
    }

    /// Adds `delta` to `index`, returning the previous value.
    pub fn get_and_add(&self, index: u64, delta: A::Value) -> Result<A::Value> {
        Ok(self.slots.slot(index)?.fetch_add_value(delta))
    }

    /// Replaces the value at `index` with `f(current)` in a CAS loop;
    /// returns the previous value.
    pub fn update(&self, index: u64, f: impl Fn(A::Value) -> A::Value) -> Result<A::Value> {
        let slot = self.slots.slot(index)?;
        let mut current = slot.load_value();
        loop {
            match slot.compare_exchange_value(current, f(current)) {
                Ok(previous) => return Ok(previous),
                Err(observed) => current = observed,
            }
        }
    }

    /// Sets every slot to `value`.
    ///
    /// Takes `&mut self`: no concurrent reader may observe a half-filled array.
    pub fn fill(&mut self, value: A::Value) {
        for slot in self.slots.iter_mut() {
            slot.store_value(value);
        }
    }

    /// Iterates over all values in index order.
    pub fn iter(&self) -> impl Iterator<Item = A::Value> + '_ {
        self.slots.iter().map(AtomicSlot::load_value)
    }

    /// Copies the values into a native vector (tests and small arrays).
    pub fn to_vec(&self) -> Vec<A::Value> {
        self.iter().collect()
    }

    /// Exact memory footprint for `size` slots.
    pub fn memory_estimation(size: u64, page_shift: u32) -> Result<MemoryRange> {
        Ok(MemoryRange::of(paged_bytes(
            size,
            std::mem::size_of::<A>() as u64,
            page_shift,
        )?))
    }
}
