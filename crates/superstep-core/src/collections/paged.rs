//! Single-owner paged arrays of primitive values.

use std::ops::AddAssign;

use super::{check_index, paged_bytes, PageLayout, DEFAULT_PAGE_SHIFT, PAGE_POINTER_BYTES};
use crate::error::{Error, Result};
use crate::memory::MemoryRange;

/// Paged array of 64-bit signed integers.
pub type HugeLongArray = PagedArray<i64>;
/// Paged array of 64-bit floats.
pub type HugeDoubleArray = PagedArray<f64>;
/// Paged array of 32-bit signed integers.
pub type HugeIntArray = PagedArray<i32>;

/// Fixed-size array of `Copy` values split into `2^page_shift` sized pages.
///
/// Pages are allocated up front ([`PagedArray::with_page_shift`]) or on first
/// write ([`PagedArray::lazy`]). A page is never released or shrunk. Reads of
/// a page that was never written return the array's default value.
///
/// # Example
///
/// ```rust
/// use superstep_core::collections::HugeLongArray;
///
/// let mut array = HugeLongArray::new(10_000).unwrap();
/// array.set(9_999, 42).unwrap();
/// assert_eq!(array.get(9_999).unwrap(), 42);
/// assert!(array.get(10_000).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PagedArray<T> {
    pages: Vec<Option<Box<[T]>>>,
    size: u64,
    layout: PageLayout,
    default_value: T,
}

impl<T: Copy + Default> PagedArray<T> {
    /// Creates an eagerly allocated array with the default page size.
    pub fn new(size: u64) -> Result<Self> {
        Self::with_page_shift(size, DEFAULT_PAGE_SHIFT)
    }

    /// Creates an eagerly allocated array with `2^page_shift` elements per page.
    pub fn with_page_shift(size: u64, page_shift: u32) -> Result<Self> {
        let mut array = Self::lazy(size, page_shift, T::default())?;
        for page in 0..array.pages.len() {
            array.allocate_page(page);
        }
        Ok(array)
    }

    /// Creates an array whose pages are allocated on first write.
    ///
    /// Unwritten slots read as `default_value`.
    pub fn lazy(size: u64, page_shift: u32, default_value: T) -> Result<Self> {
        let layout = PageLayout::new(page_shift)?;
        let num_pages = layout.num_pages(size)?;
        Ok(Self {
            pages: vec![None; num_pages],
            size,
            layout,
            default_value,
        })
    }

    /// Creates an eagerly allocated array filled with `value`.
    pub fn filled(size: u64, page_shift: u32, value: T) -> Result<Self> {
        let mut array = Self::with_page_shift(size, page_shift)?;
        array.fill(value);
        Ok(array)
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the page shift.
    #[must_use]
    pub fn page_shift(&self) -> u32 {
        self.layout.shift()
    }

    /// Returns how many pages are currently backed by memory.
    #[must_use]
    pub fn allocated_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.is_some()).count()
    }

    /// Returns the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `index >= size`.
    #[inline]
    pub fn get(&self, index: u64) -> Result<T> {
        check_index(index, self.size)?;
        let page = &self.pages[self.layout.page_index(index)];
        Ok(match page {
            Some(values) => values[self.layout.index_in_page(index)],
            None => self.default_value,
        })
    }

    /// Stores `value` at `index`, allocating its page if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `index >= size`.
    #[inline]
    pub fn set(&mut self, index: u64, value: T) -> Result<()> {
        *self.slot_mut(index)? = value;
        Ok(())
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.default_value = value;
        for page in self.pages.iter_mut().flatten() {
            page.fill(value);
        }
    }

    /// Sets every element to `generator(index)`, allocating all pages.
    pub fn set_all(&mut self, mut generator: impl FnMut(u64) -> T) {
        for page in 0..self.pages.len() {
            self.allocate_page(page);
        }
        let mut index = 0u64;
        for page in self.pages.iter_mut().flatten() {
            for slot in page.iter_mut() {
                *slot = generator(index);
                index += 1;
            }
        }
    }

    /// Iterates over all values in index order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.pages.len()).flat_map(move |page| {
            let len = self.layout.page_len(page, self.size);
            (0..len).map(move |offset| match &self.pages[page] {
                Some(values) => values[offset],
                None => self.default_value,
            })
        })
    }

    /// Copies the array into a single native vector.
    ///
    /// Intended for tests and small arrays.
    ///
    /// # Errors
    ///
    /// Returns `Error::Capacity` if `size` exceeds what one allocation can hold.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let max_native = (isize::MAX as usize) / std::mem::size_of::<T>().max(1);
        let len = usize::try_from(self.size)
            .ok()
            .filter(|len| *len <= max_native)
            .ok_or_else(|| {
                Error::Capacity(format!(
                    "{} elements do not fit a single native array",
                    self.size
                ))
            })?;
        let mut out = Vec::with_capacity(len);
        out.extend(self.iter());
        Ok(out)
    }

    /// Memory range for an array of `size` elements.
    ///
    /// Eager arrays have `min == max`; lazy arrays range from the bare page
    /// table to fully allocated.
    pub fn memory_estimation(size: u64, page_shift: u32, lazy: bool) -> Result<MemoryRange> {
        let full = paged_bytes(size, std::mem::size_of::<T>() as u64, page_shift)?;
        if lazy {
            let pages = PageLayout::new(page_shift)?.num_pages(size)? as u64;
            Ok(MemoryRange::new(pages * PAGE_POINTER_BYTES, full))
        } else {
            Ok(MemoryRange::of(full))
        }
    }

    fn slot_mut(&mut self, index: u64) -> Result<&mut T> {
        check_index(index, self.size)?;
        let page = self.layout.page_index(index);
        self.allocate_page(page);
        let offset = self.layout.index_in_page(index);
        match &mut self.pages[page] {
            Some(values) => Ok(&mut values[offset]),
            None => Err(Error::Capacity(format!("page {page} could not be allocated"))),
        }
    }

    fn allocate_page(&mut self, page: usize) {
        if self.pages[page].is_none() {
            let len = self.layout.page_len(page, self.size);
            self.pages[page] = Some(vec![self.default_value; len].into_boxed_slice());
        }
    }
}

impl<T: Copy + Default + AddAssign> PagedArray<T> {
    /// Adds `delta` to the value at `index`.
    pub fn add_to(&mut self, index: u64, delta: T) -> Result<()> {
        *self.slot_mut(index)? += delta;
        Ok(())
    }
}
