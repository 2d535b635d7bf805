//! Paged huge arrays addressed by 64-bit node ids.
//!
//! A single contiguous allocation caps how many elements an array can hold.
//! The containers in this module instead keep a table of fixed-size pages and
//! translate `index -> (page, offset)` with a shift and a mask, so access stays
//! O(1) while the element count is bounded only by `u64`.
//!
//! ## Layout
//!
//! ```text
//! index:   [ page index (64 - shift bits) | offset in page (shift bits) ]
//! pages:   [ Box<[T]> ][ Box<[T]> ] ... [ Box<[T]> (trimmed to remainder) ]
//! ```
//!
//! The last page is trimmed to the remainder so the estimated footprint is
//! exactly `size * size_of::<T>() + pages * size_of::<Box<[T]>>()`.

// Reason: page and offset values are bounded by `num_pages` (checked to fit
// `usize` at construction) and by the page size (at most 2^30).
#![allow(clippy::cast_possible_truncation)]

mod atomic;
mod bitset;
mod cell;
mod paged;
mod slots;


pub use atomic::{AtomicF64, AtomicPagedArray, AtomicSlot, HugeAtomicDoubleArray, HugeAtomicLongArray};
pub use bitset::HugeAtomicBitSet;
pub use cell::HugeCellArray;
pub use paged::{HugeDoubleArray, HugeIntArray, HugeLongArray, PagedArray};
pub(crate) use slots::PagedSlots;

use crate::error::{Error, Result};

/// Default page shift: 2^12 = 4096 elements per page.
pub const DEFAULT_PAGE_SHIFT: u32 = 12;

/// Largest accepted page shift (2^30 elements per page).
pub const MAX_PAGE_SHIFT: u32 = 30;

/// Bytes taken by one entry of the page table (a boxed slice: pointer + length).
pub const PAGE_POINTER_BYTES: u64 = std::mem::size_of::<Box<[u8]>>() as u64;

/// Index arithmetic shared by every paged container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    shift: u32,
    mask: u64,
}

impl PageLayout {
    /// Creates a layout with `2^page_shift` elements per page.
    ///
    /// # Errors
    ///
    /// Returns `Error::Capacity` if `page_shift` is outside `1..=30`.
    pub fn new(page_shift: u32) -> Result<Self> {
        if page_shift == 0 || page_shift > MAX_PAGE_SHIFT {
            return Err(Error::Capacity(format!(
                "page shift {page_shift} outside supported range 1..={MAX_PAGE_SHIFT}"
            )));
        }
        Ok(Self {
            shift: page_shift,
            mask: (1u64 << page_shift) - 1,
        })
    }

    /// Returns the page shift.
    #[must_use]
    pub fn shift(self) -> u32 {
        self.shift
    }

    /// Returns the number of elements per page.
    #[must_use]
    pub fn page_size(self) -> usize {
        1usize << self.shift
    }

    /// Page holding `index`.
    #[inline]
    #[must_use]
    pub fn page_index(self, index: u64) -> usize {
        (index >> self.shift) as usize
    }

    /// Offset of `index` inside its page.
    #[inline]
    #[must_use]
    pub fn index_in_page(self, index: u64) -> usize {
        (index & self.mask) as usize
    }

    /// Number of pages needed to hold `size` elements.
    ///
    /// # Errors
    ///
    /// Returns `Error::Capacity` if the page table would not be addressable.
    pub fn num_pages(self, size: u64) -> Result<usize> {
        let pages = size.div_ceil(1u64 << self.shift);
        usize::try_from(pages).map_err(|_| {
            Error::Capacity(format!(
                "{size} elements need {pages} pages which exceeds the addressable page table"
            ))
        })
    }

    /// Length of page `page` for an array of `size` elements.
    #[must_use]
    pub fn page_len(self, page: usize, size: u64) -> usize {
        let start = (page as u64) << self.shift;
        let remaining = size.saturating_sub(start);
        remaining.min(1u64 << self.shift) as usize
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            shift: DEFAULT_PAGE_SHIFT,
            mask: (1u64 << DEFAULT_PAGE_SHIFT) - 1,
        }
    }
}

/// Exact byte footprint of a fully allocated paged array.
///
/// # Errors
///
/// Returns `Error::Capacity` on invalid page shift or arithmetic overflow.
pub fn paged_bytes(size: u64, element_bytes: u64, page_shift: u32) -> Result<u64> {
    let layout = PageLayout::new(page_shift)?;
    let pages = layout.num_pages(size)? as u64;
    size.checked_mul(element_bytes)
        .and_then(|data| data.checked_add(pages * PAGE_POINTER_BYTES))
        .ok_or_else(|| Error::Capacity(format!("{size} elements overflow the byte range")))
}

#[inline]
pub(crate) fn check_index(index: u64, size: u64) -> Result<()> {
    if index < size {
        Ok(())
    } else {
        Err(Error::out_of_range(index, size))
    }
}
