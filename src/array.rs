use crate::Error;
use bytemuck::Pod;
use std::alloc::{self, Layout};
use std::io::{self, Write};
use std::ptr::{self, NonNull};

/// Resizable buffer of fixed-size elements.
///
/// The array knows nothing about the element type, only its byte stride. Elements are
/// copied in and out bit for bit. The buffer always holds `capacity * element_size`
/// bytes, the slots past `len` are kept zeroed.
///
/// Growth doubles the capacity and may move the buffer, so element slices returned
/// earlier must not outlive the next insertion (the borrow checker enforces this).
/// The array never shrinks.
// don't clone, use `copy`
pub struct Array {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
    element_size: usize,
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("array capacity overflow")
}

impl Array {
    /// Allocates an empty array for `capacity` elements of `element_size` bytes.
    pub fn new(element_size: usize, capacity: usize) -> Result<Array, Error> {
        if element_size == 0 || capacity == 0 {
            return Err(Error::EmptyArg);
        }
        let layout = Self::layout(element_size, capacity).ok_or(Error::BadAlloc)?;
        let ptr = NonNull::new(unsafe { alloc::alloc_zeroed(layout) }).ok_or(Error::BadAlloc)?;

        Ok(Array {
            ptr,
            len: 0,
            capacity,
            element_size,
        })
    }

    /// Array with the stride of `T`.
    pub fn for_type<T: Pod>(capacity: usize) -> Result<Array, Error> {
        Array::new(std::mem::size_of::<T>(), capacity)
    }

    #[inline(always)]
    fn layout(element_size: usize, capacity: usize) -> Option<Layout> {
        Layout::array::<u8>(element_size.checked_mul(capacity)?).ok()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline(always)]
    unsafe fn slot(&self, index: usize) -> *mut u8 {
        self.ptr.as_ptr().add(index * self.element_size)
    }

    fn check_element(&self, elem: &[u8]) -> Result<(), Error> {
        if elem.is_empty() {
            Err(Error::EmptyArg)
        } else if elem.len() != self.element_size {
            Err(Error::TypeMismatch)
        } else {
            Ok(())
        }
    }

    fn check_type<T: Pod>(&self) -> Result<(), Error> {
        if std::mem::size_of::<T>() == self.element_size {
            Ok(())
        } else {
            Err(Error::TypeMismatch)
        }
    }

    /// Doubles the buffer when there is no free slot left.
    ///
    /// Failing to grow leaves no consistent state to report back, so it aborts
    /// through `handle_alloc_error` instead of returning an error.
    fn grow_if_full(&mut self) {
        if self.len < self.capacity {
            return;
        }
        let new_capacity = self.capacity.checked_mul(2).unwrap_or_else(|| capacity_overflow());
        let new_layout = Self::layout(self.element_size, new_capacity).unwrap_or_else(|| capacity_overflow());
        let old_size = self.capacity * self.element_size;

        unsafe {
            let old_layout = Layout::from_size_align_unchecked(old_size, 1);
            let raw = alloc::realloc(self.ptr.as_ptr(), old_layout, new_layout.size());
            let ptr = match NonNull::new(raw) {
                Some(ptr) => ptr,
                None => alloc::handle_alloc_error(new_layout),
            };
            ptr.as_ptr().add(old_size).write_bytes(0, new_layout.size() - old_size);
            self.ptr = ptr;
        }

        trace!("array grow {} -> {} slots of {} bytes", self.capacity, new_capacity, self.element_size);
        self.capacity = new_capacity;
    }

    /// Copies `elem` after the last element.
    pub fn add_back(&mut self, elem: &[u8]) -> Result<(), Error> {
        self.check_element(elem)?;
        self.grow_if_full();
        unsafe { ptr::copy_nonoverlapping(elem.as_ptr(), self.slot(self.len), self.element_size) };
        self.len += 1;
        Ok(())
    }

    /// Copies `elem` before the first element, shifting everything up one slot.
    pub fn add_front(&mut self, elem: &[u8]) -> Result<(), Error> {
        self.insert(elem, 0)
    }

    /// Copies `elem` into slot `index`, shifting the tail up one slot.
    ///
    /// `index == len` appends. Anything past that is `OutOfBounds` and nothing is touched.
    pub fn insert(&mut self, elem: &[u8], index: usize) -> Result<(), Error> {
        self.check_element(elem)?;
        if index > self.len {
            return Err(Error::OutOfBounds);
        }
        self.grow_if_full();
        unsafe {
            let at = self.slot(index);
            ptr::copy(at, self.slot(index + 1), (self.len - index) * self.element_size);
            ptr::copy_nonoverlapping(elem.as_ptr(), at, self.element_size);
        }
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&[u8], Error> {
        if index >= self.len {
            return Err(Error::OutOfBounds);
        }
        Ok(unsafe { std::slice::from_raw_parts(self.slot(index), self.element_size) })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut [u8], Error> {
        if index >= self.len {
            return Err(Error::OutOfBounds);
        }
        Ok(unsafe { std::slice::from_raw_parts_mut(self.slot(index), self.element_size) })
    }

    /// Removes the element at `index`, shifts the tail down and zeroes the vacated slot.
    pub fn delete_index(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.len {
            return Err(Error::OutOfBounds);
        }
        let last = self.len - 1;
        unsafe {
            ptr::copy(self.slot(index + 1), self.slot(index), (last - index) * self.element_size);
            self.slot(last).write_bytes(0, self.element_size);
        }
        self.len = last;
        Ok(())
    }

    /// Zeroes every element and sets the length to zero, capacity stays.
    pub fn clear(&mut self) -> Result<(), Error> {
        if self.len == 0 {
            return Err(Error::NoOp);
        }
        unsafe { self.ptr.as_ptr().write_bytes(0, self.len * self.element_size) };
        self.len = 0;
        Ok(())
    }

    /// Byte-wise duplicate with the same capacity, length and stride.
    ///
    /// Elements that are themselves pointers or handles are duplicated as-is.
    pub fn copy(&self) -> Result<Array, Error> {
        let mut copy = Array::new(self.element_size, self.capacity)?;
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), copy.ptr.as_ptr(), self.len * self.element_size) };
        copy.len = self.len;
        Ok(copy)
    }

    /// Calls `f` on every element in place.
    pub fn map(&mut self, f: impl FnMut(&mut [u8])) {
        let element_size = self.element_size;
        self.as_bytes_mut().chunks_exact_mut(element_size).for_each(f);
    }

    /// Copies the array and maps the copy, the source is left untouched.
    pub fn map_new(&self, f: impl FnMut(&mut [u8])) -> Result<Array, Error> {
        let mut copy = self.copy()?;
        copy.map(f);
        Ok(copy)
    }

    /// New array with the elements for which `pred` holds, in their original order.
    ///
    /// The result starts at capacity one and grows by doubling as matches are added.
    pub fn filter(&self, mut pred: impl FnMut(&[u8]) -> bool) -> Result<Array, Error> {
        let mut filtered = Array::new(self.element_size, 1)?;
        for elem in self.iter() {
            if pred(elem) {
                filtered.add_back(elem)?;
            }
        }
        Ok(filtered)
    }

    /// Index of the first element for which `equals(element, elem)` holds.
    pub fn find(&self, elem: &[u8], equals: impl Fn(&[u8], &[u8]) -> bool) -> Result<usize, Error> {
        self.check_element(elem)?;
        self.iter().position(|e| equals(e, elem)).ok_or(Error::NotFound)
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), Error> {
        if a >= self.len || b >= self.len {
            return Err(Error::OutOfBounds);
        }
        if a != b {
            unsafe { ptr::swap_nonoverlapping(self.slot(a), self.slot(b), self.element_size) };
        }
        Ok(())
    }

    /// Reverses element order by swapping pairs from both ends inward.
    pub fn reverse(&mut self) {
        if self.len < 2 {
            return;
        }
        let (mut lo, mut hi) = (0, self.len - 1);
        while lo < hi {
            unsafe { ptr::swap_nonoverlapping(self.slot(lo), self.slot(hi), self.element_size) };
            lo += 1;
            hi -= 1;
        }
    }

    /// Element slices in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + DoubleEndedIterator {
        self.as_bytes().chunks_exact(self.element_size)
    }

    /// Hands every element to `print` in index order. An empty array writes nothing.
    pub fn print<W: Write>(&self, w: &mut W, print: impl Fn(&[u8], &mut W) -> io::Result<()>) -> io::Result<()> {
        for element in self.iter() {
            print(element, w)?;
        }
        Ok(())
    }

    /// Bytes of the used slots `[0, len)`.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len * self.element_size) }
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len * self.element_size) }
    }

    /// Bytes of the unused slots `[len, capacity)`, always zero.
    pub fn spare_bytes(&self) -> &[u8] {
        let used = self.len * self.element_size;
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().add(used), self.capacity * self.element_size - used) }
    }

    pub fn push_value<T: Pod>(&mut self, value: T) -> Result<(), Error> {
        self.check_type::<T>()?;
        self.add_back(bytemuck::bytes_of(&value))
    }

    pub fn insert_value<T: Pod>(&mut self, value: T, index: usize) -> Result<(), Error> {
        self.check_type::<T>()?;
        self.insert(bytemuck::bytes_of(&value), index)
    }

    pub fn get_value<T: Pod>(&self, index: usize) -> Result<T, Error> {
        self.check_type::<T>()?;
        Ok(bytemuck::pod_read_unaligned(self.get(index)?))
    }

    pub fn set_value<T: Pod>(&mut self, index: usize, value: T) -> Result<(), Error> {
        self.check_type::<T>()?;
        self.get_mut(index)?.copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Index of the first element equal to `value`.
    pub fn find_value<T: Pod + PartialEq>(&self, value: &T) -> Result<usize, Error> {
        self.check_type::<T>()?;
        self.iter()
            .position(|e| bytemuck::pod_read_unaligned::<T>(e) == *value)
            .ok_or(Error::NotFound)
    }

    /// Reads every element as `T`.
    pub fn to_vec<T: Pod>(&self) -> Result<Vec<T>, Error> {
        self.check_type::<T>()?;
        Ok(self.iter().map(bytemuck::pod_read_unaligned).collect())
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity * self.element_size, 1);
            alloc::dealloc(self.ptr.as_ptr(), layout);
        }
    }
}

impl std::fmt::Debug for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("element_size", &self.element_size)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
