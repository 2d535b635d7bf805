//! Page table of arbitrary (non-`Copy`) slots.
//!
//! Building block for the atomic arrays, the bit set, the cell array and the
//! message queues. Slots are reached through `&self`, so thread safety is the
//! slot type's business (atomics, locks, `ArcSwap`).

use super::{check_index, PageLayout};
use crate::error::Result;

/// Eagerly allocated pages of `T`, last page trimmed to the remainder.
pub(crate) struct PagedSlots<T> {
    pages: Vec<Box<[T]>>,
    size: u64,
    layout: PageLayout,
}

impl<T> PagedSlots<T> {
    /// Allocates `size` slots, each produced by `init`.
    pub(crate) fn new_with(size: u64, page_shift: u32, mut init: impl FnMut() -> T) -> Result<Self> {
        let layout = PageLayout::new(page_shift)?;
        let num_pages = layout.num_pages(size)?;
        let pages = (0..num_pages)
            .map(|page| {
                (0..layout.page_len(page, size))
                    .map(|_| init())
                    .collect::<Vec<_>>()
                    .into_boxed_slice()
            })
            .collect();
        Ok(Self {
            pages,
            size,
            layout,
        })
    }

    #[inline]
    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub(crate) fn layout(&self) -> PageLayout {
        self.layout
    }

    #[inline]
    pub(crate) fn slot(&self, index: u64) -> Result<&T> {
        check_index(index, self.size)?;
        Ok(&self.pages[self.layout.page_index(index)][self.layout.index_in_page(index)])
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, index: u64) -> Result<&mut T> {
        check_index(index, self.size)?;
        Ok(&mut self.pages[self.layout.page_index(index)][self.layout.index_in_page(index)])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.pages.iter().flat_map(|page| page.iter())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.pages.iter_mut().flat_map(|page| page.iter_mut())
    }
}

impl<T> std::fmt::Debug for PagedSlots<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedSlots")
            .field("size", &self.size)
            .field("pages", &self.pages.len())
            .field("page_shift", &self.layout.shift())
            .finish()
    }
}
