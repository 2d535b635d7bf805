//! Paged array of shared, swappable heap values.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::{paged_bytes, PagedSlots};
use crate::error::Result;
use crate::memory::MemoryRange;

/// One atomically swappable pointer per slot.
///
/// Backs array-valued node properties: a writer publishes a new `Arc<T>` and
/// concurrent readers keep whatever version they loaded. Empty slots read as
/// `None`.
pub struct HugeCellArray<T> {
    slots: PagedSlots<ArcSwapOption<T>>,
}

impl<T> HugeCellArray<T> {
    /// Creates `size` empty slots.
    pub fn new(size: u64, page_shift: u32) -> Result<Self> {
        Ok(Self {
            slots: PagedSlots::new_with(size, page_shift, ArcSwapOption::empty)?,
        })
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.slots.size()
    }

    /// Loads the value at `index`.
    pub fn get(&self, index: u64) -> Result<Option<Arc<T>>> {
        Ok(self.slots.slot(index)?.load_full())
    }

    /// Publishes `value` at `index`.
    pub fn set(&self, index: u64, value: T) -> Result<()> {
        self.slots.slot(index)?.store(Some(Arc::new(value)));
        Ok(())
    }

    /// Empties the slot at `index`.
    pub fn clear(&self, index: u64) -> Result<()> {
        self.slots.slot(index)?.store(None);
        Ok(())
    }

    /// Memory footprint of the slot table for `size` slots.
    ///
    /// Pointed-to values are sized by the caller and not included.
    pub fn memory_estimation(size: u64, page_shift: u32) -> Result<MemoryRange> {
        Ok(MemoryRange::of(paged_bytes(
            size,
            std::mem::size_of::<ArcSwapOption<T>>() as u64,
            page_shift,
        )?))
    }
}

impl<T> std::fmt::Debug for HugeCellArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HugeCellArray")
            .field("slots", &self.slots)
            .finish()
    }
}
