use std::{
  alloc::Layout,
  fmt,
  marker::PhantomData,
  mem::{self, ManuallyDrop},
  ptr::NonNull,
  slice,
};

use tracing::trace;

use crate::{
  allocator::{Allocator, Global},
  element::{self, Element},
  error::ArrayError,
};

/// Slots allocated by [`ExpandableArray::new`].
pub const DEFAULT_CAPACITY: usize = 4;

/// Factor applied to a requested length to get the allocated slot count in
/// sized and range construction and in [`ExpandableArray::resize`].
pub const HEADROOM_FACTOR: usize = 2;

/// A contiguous array whose capacity is managed by the caller.
///
/// The array never grows on its own. Storage is acquired from the allocator
/// `A` when the array is built and whenever [`reserve`] or [`resize`] is
/// called, and every reallocation copies the retained elements into a fresh
/// buffer before the old one is released.
///
/// ```text
///   ptr ──► ┌──────┬──────┬──────┬────────┬────────┬────────┐
///           │  e0  │  e1  │  e2  │ uninit │ uninit │ uninit │
///           └──────┴──────┴──────┴────────┴────────┴────────┘
///           ◄──────── len ───────►
///           ◄──────────────────── capacity ──────────────────►
/// ```
///
/// There is no indexing, iteration, or push/pop. The live elements can be
/// observed through [`as_slice`] and [`as_mut_slice`].
///
/// [`reserve`]: ExpandableArray::reserve
/// [`resize`]: ExpandableArray::resize
/// [`as_slice`]: ExpandableArray::as_slice
/// [`as_mut_slice`]: ExpandableArray::as_mut_slice
pub struct ExpandableArray<T: Element, A: Allocator = Global> {
  ptr: NonNull<T>,
  len: usize,
  capacity: usize,
  alloc: A,
  _marker: PhantomData<T>,
}

unsafe impl<T: Element + Send, A: Allocator + Send> Send for ExpandableArray<T, A> {}
unsafe impl<T: Element + Sync, A: Allocator + Sync> Sync for ExpandableArray<T, A> {}

impl<T: Element> ExpandableArray<T> {
  /// An empty array with [`DEFAULT_CAPACITY`] slots from the global allocator.
  pub fn new() -> Self {
    Self::new_in(Global).unwrap_or_else(|error| error.panic())
  }

  /// `len` clones of `value`, with room for `2 * len`.
  pub fn from_elem(
    len: usize,
    value: T,
  ) -> Self
  where
    T: Clone,
  {
    Self::from_elem_in(len, value, Global).unwrap_or_else(|error| error.panic())
  }

  /// Clones of every element of `values`, in order.
  pub fn from_slice(values: &[T]) -> Self
  where
    T: Clone,
  {
    Self::from_slice_in(values, Global).unwrap_or_else(|error| error.panic())
  }
}

impl<T: Element, A: Allocator> ExpandableArray<T, A> {
  pub fn new_in(alloc: A) -> Result<Self, ArrayError> {
    Self::with_capacity_in(DEFAULT_CAPACITY, alloc)
  }

  pub fn from_elem_in(
    len: usize,
    value: T,
    alloc: A,
  ) -> Result<Self, ArrayError>
  where
    T: Clone,
  {
    let mut array = Self::with_capacity_in(headroom(len)?, alloc)?;
    array.fill_to(len, &value);
    Ok(array)
  }

  /// Builds the array from any iterator that knows its length up front.
  ///
  /// Twice the reported length is allocated. Elements past that are never
  /// pulled from the iterator; an iterator that ends early yields a shorter
  /// array.
  pub fn from_iter_in<I>(
    values: I,
    alloc: A,
  ) -> Result<Self, ArrayError>
  where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
  {
    let values = values.into_iter();
    let mut array = Self::with_capacity_in(headroom(values.len())?, alloc)?;

    for value in values.take(array.capacity) {
      unsafe { array.construct_at_end(value) };
    }

    Ok(array)
  }

  pub fn from_slice_in(
    values: &[T],
    alloc: A,
  ) -> Result<Self, ArrayError>
  where
    T: Clone,
  {
    Self::from_iter_in(values.iter().cloned(), alloc)
  }

  /// A deep copy sharing nothing with `self`, using a clone of its allocator.
  pub fn try_clone(&self) -> Result<Self, ArrayError>
  where
    T: Clone,
    A: Clone,
  {
    Self::from_slice_in(self.as_slice(), self.alloc.clone())
  }

  /// Moves the contents out, leaving `self` empty with no storage.
  ///
  /// Neither allocates nor touches any element.
  pub fn take(&mut self) -> Self
  where
    A: Clone,
  {
    let empty = Self::empty_in(self.alloc.clone());
    mem::replace(self, empty)
  }

  /// Makes `self` an element-wise copy of `other`.
  ///
  /// If `other` is longer, `self` first grows through the same path as
  /// [`resize`](Self::resize). Elements both arrays hold are overwritten
  /// with [`Clone::clone_from`], the rest are cloned in, and any excess
  /// tail of `self` is destroyed. `self` keeps its own allocator.
  ///
  /// A panicking clone leaves `self` valid but only partly assigned.
  pub fn assign_from(
    &mut self,
    other: &Self,
  ) -> Result<&mut Self, ArrayError>
  where
    T: Clone,
  {
    let target = other.len;

    if target > self.len {
      self.reserve(headroom(target)?)?;
    }

    let shared = self.len.min(target);

    for (slot, value) in self.as_mut_slice()[..shared]
      .iter_mut()
      .zip(&other.as_slice()[..shared])
    {
      slot.clone_from(value);
    }

    for value in &other.as_slice()[shared..] {
      let value = value.clone();
      unsafe { self.construct_at_end(value) };
    }

    self.truncate_to(target);

    Ok(self)
  }

  /// Takes over `other`'s buffer, capacity and allocator.
  ///
  /// The previous contents of `self` are destroyed and released through the
  /// allocator they came from, and `other` is left empty with no storage.
  pub fn move_assign(
    &mut self,
    other: &mut Self,
  ) -> &mut Self {
    mem::swap(self, other);
    other.release();
    self
  }

  /// Number of live elements.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Number of allocated slots, live or not.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn allocator(&self) -> &A {
    &self.alloc
  }

  pub fn as_slice(&self) -> &[T] {
    unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
  }

  /// Moves the array into a fresh buffer of exactly `new_capacity` slots.
  ///
  /// The first `min(len, new_capacity)` elements are cloned into the new
  /// buffer, then every old element is destroyed and the old buffer is
  /// released. **Reserving less than [`len`](Self::len) truncates the
  /// array**: only the first `new_capacity` elements survive.
  ///
  /// On failure, including a panicking clone, `self` is left untouched and
  /// the partially built buffer is destroyed and released.
  pub fn reserve(
    &mut self,
    new_capacity: usize,
  ) -> Result<(), ArrayError>
  where
    T: Clone,
  {
    let retained = self.len.min(new_capacity);

    trace!(
      from = self.capacity,
      to = new_capacity,
      len = self.len,
      retained,
      "reallocating buffer"
    );

    let mut fresh = PartialBuffer::<T, A>::allocate(&self.alloc, new_capacity)?;

    for value in &self.as_slice()[..retained] {
      let value = value.clone();
      unsafe { fresh.push(value) };
    }

    let ptr = fresh.finish();

    self.release();
    self.ptr = ptr;
    self.capacity = new_capacity;
    self.len = retained;

    Ok(())
  }

  /// Sets the length to `new_size`.
  ///
  /// Always reserves `2 * new_size` slots first, then clones `value` into
  /// new slots or destroys the tail past `new_size`.
  pub fn resize(
    &mut self,
    new_size: usize,
    value: T,
  ) -> Result<(), ArrayError>
  where
    T: Clone,
  {
    self.reserve(headroom(new_size)?)?;

    if new_size > self.len {
      self.fill_to(new_size, &value);
    } else {
      self.truncate_to(new_size);
    }

    Ok(())
  }

  /// [`resize`](Self::resize) filling with `T::default()`.
  pub fn resize_default(
    &mut self,
    new_size: usize,
  ) -> Result<(), ArrayError>
  where
    T: Clone + Default,
  {
    self.resize(new_size, T::default())
  }

  fn with_capacity_in(
    capacity: usize,
    alloc: A,
  ) -> Result<Self, ArrayError> {
    let ptr = allocate_buffer::<T, A>(&alloc, capacity)?;

    Ok(Self {
      ptr,
      len: 0,
      capacity,
      alloc,
      _marker: PhantomData,
    })
  }

  fn empty_in(alloc: A) -> Self {
    Self {
      ptr: NonNull::dangling(),
      len: 0,
      capacity: 0,
      alloc,
      _marker: PhantomData,
    }
  }

  /// # Safety
  ///
  /// `len` must be below `capacity`.
  unsafe fn construct_at_end(
    &mut self,
    value: T,
  ) {
    debug_assert!(self.len < self.capacity);

    unsafe { self.alloc.construct(self.ptr.add(self.len), value) };
    self.len += 1;
  }

  /// Clones `value` into `[len, new_len)`. The length follows each
  /// construction, so a panicking clone leaves only live elements counted.
  fn fill_to(
    &mut self,
    new_len: usize,
    value: &T,
  ) where
    T: Clone,
  {
    debug_assert!(new_len <= self.capacity);

    while self.len < new_len {
      let value = value.clone();
      unsafe { self.construct_at_end(value) };
    }
  }

  fn truncate_to(
    &mut self,
    new_len: usize,
  ) {
    if new_len >= self.len {
      return;
    }

    let tail = self.len - new_len;
    self.len = new_len;

    unsafe { element::destroy_range(self.ptr.add(new_len), tail, &self.alloc) };
  }

  /// Destroys every element, releases the buffer, and leaves `self` empty.
  ///
  /// The buffer is released even when an element's destructor panics.
  fn release(&mut self) {
    let ptr = mem::replace(&mut self.ptr, NonNull::dangling());
    let len = mem::take(&mut self.len);
    let capacity = mem::take(&mut self.capacity);

    let buffer = PartialBuffer::adopt(&self.alloc, ptr, capacity);
    unsafe { element::destroy_range(ptr, len, &self.alloc) };
    drop(buffer);
  }
}

impl<T: Element, A: Allocator> Drop for ExpandableArray<T, A> {
  fn drop(&mut self) {
    self.release();
  }
}

impl<T: Element + Clone, A: Allocator + Clone> Clone for ExpandableArray<T, A> {
  fn clone(&self) -> Self {
    self.try_clone().unwrap_or_else(|error| error.panic())
  }

  fn clone_from(
    &mut self,
    source: &Self,
  ) {
    if let Err(error) = self.assign_from(source) {
      error.panic()
    }
  }
}

impl<T: Element, A: Allocator + Default> Default for ExpandableArray<T, A> {
  fn default() -> Self {
    Self::new_in(A::default()).unwrap_or_else(|error| error.panic())
  }
}

impl<T: Element, const N: usize> From<[T; N]> for ExpandableArray<T> {
  fn from(values: [T; N]) -> Self {
    Self::from_iter_in(values, Global).unwrap_or_else(|error| error.panic())
  }
}

impl<T: Element + fmt::Debug, A: Allocator> fmt::Debug for ExpandableArray<T, A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.as_slice()).finish()
  }
}

impl<T, A, B> PartialEq<ExpandableArray<T, B>> for ExpandableArray<T, A>
where
  T: Element + PartialEq,
  A: Allocator,
  B: Allocator,
{
  fn eq(
    &self,
    other: &ExpandableArray<T, B>,
  ) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<T: Element + Eq, A: Allocator> Eq for ExpandableArray<T, A> {}

impl<T: Element, A: Allocator> Element for ExpandableArray<T, A> {}

/// A buffer being populated or torn down. Dropping it before
/// [`finish`](Self::finish) destroys what was constructed and releases the
/// memory.
struct PartialBuffer<'a, T: Element, A: Allocator> {
  alloc: &'a A,
  ptr: NonNull<T>,
  capacity: usize,
  initialized: usize,
}

impl<'a, T: Element, A: Allocator> PartialBuffer<'a, T, A> {
  fn allocate(
    alloc: &'a A,
    capacity: usize,
  ) -> Result<Self, ArrayError> {
    Ok(Self {
      alloc,
      ptr: allocate_buffer::<T, A>(alloc, capacity)?,
      capacity,
      initialized: 0,
    })
  }

  /// Takes charge of releasing a buffer whose elements the caller destroys.
  fn adopt(
    alloc: &'a A,
    ptr: NonNull<T>,
    capacity: usize,
  ) -> Self {
    Self {
      alloc,
      ptr,
      capacity,
      initialized: 0,
    }
  }

  /// # Safety
  ///
  /// Fewer than `capacity` values may have been pushed.
  unsafe fn push(
    &mut self,
    value: T,
  ) {
    debug_assert!(self.initialized < self.capacity);

    unsafe { self.alloc.construct(self.ptr.add(self.initialized), value) };
    self.initialized += 1;
  }

  fn finish(self) -> NonNull<T> {
    ManuallyDrop::new(self).ptr
  }
}

impl<T: Element, A: Allocator> Drop for PartialBuffer<'_, T, A> {
  fn drop(&mut self) {
    unsafe {
      element::destroy_range(self.ptr, self.initialized, self.alloc);
      release_buffer(self.alloc, self.ptr, self.capacity);
    }
  }
}

fn headroom(len: usize) -> Result<usize, ArrayError> {
  len
    .checked_mul(HEADROOM_FACTOR)
    .ok_or(ArrayError::CapacityOverflow { requested: len })
}

fn allocate_buffer<T, A: Allocator>(
  alloc: &A,
  capacity: usize,
) -> Result<NonNull<T>, ArrayError> {
  let layout = Layout::array::<T>(capacity).map_err(|_| ArrayError::CapacityOverflow { requested: capacity })?;

  if layout.size() == 0 {
    return Ok(NonNull::dangling());
  }

  alloc
    .allocate(layout)
    .map(NonNull::cast)
    .map_err(|source| ArrayError::alloc(layout, source))
}

/// # Safety
///
/// `ptr` must come from [`allocate_buffer`] with the same allocator and
/// capacity, and hold no live elements.
unsafe fn release_buffer<T, A: Allocator>(
  alloc: &A,
  ptr: NonNull<T>,
  capacity: usize,
) {
  if let Ok(layout) = Layout::array::<T>(capacity) {
    if layout.size() != 0 {
      unsafe { alloc.deallocate(ptr.cast(), layout) };
    }
  }
}
