use std::{
  alloc::{self, Layout},
  ptr::{self, NonNull},
};

use crate::error::AllocError;

/// Raw memory provider used by [`ExpandableArray`](crate::ExpandableArray).
///
/// Besides acquiring and releasing blocks, an allocator owns the in-place
/// construction and destruction of values in those blocks. The default
/// methods write and drop the value directly.
///
/// # Safety
///
/// A block returned by `allocate` must be valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and must stay valid
/// until it is passed back to `deallocate` with the same layout. Blocks must
/// not overlap while live.
pub unsafe trait Allocator {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError>;

  /// # Safety
  ///
  /// `ptr` must come from `allocate` on this allocator with the same `layout`
  /// and must not be used afterwards.
  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  );

  /// Moves `value` into the uninitialized `slot`.
  ///
  /// # Safety
  ///
  /// `slot` must be valid for writes and properly aligned. Any previous value
  /// in the slot is overwritten without being dropped.
  unsafe fn construct<T>(
    &self,
    slot: NonNull<T>,
    value: T,
  ) {
    unsafe { slot.as_ptr().write(value) }
  }

  /// Runs the destructor of the value in `slot`, leaving it uninitialized.
  ///
  /// # Safety
  ///
  /// `slot` must hold a live value that is not used again.
  unsafe fn destroy<T>(
    &self,
    slot: NonNull<T>,
  ) {
    unsafe { ptr::drop_in_place(slot.as_ptr()) }
  }
}

unsafe impl<A: Allocator + ?Sized> Allocator for &A {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError> {
    (**self).allocate(layout)
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    unsafe { (**self).deallocate(ptr, layout) }
  }

  unsafe fn construct<T>(
    &self,
    slot: NonNull<T>,
    value: T,
  ) {
    unsafe { (**self).construct(slot, value) }
  }

  unsafe fn destroy<T>(
    &self,
    slot: NonNull<T>,
  ) {
    unsafe { (**self).destroy(slot) }
  }
}

/// The process-wide allocator from `std::alloc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

unsafe impl Allocator for Global {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError> {
    if layout.size() == 0 {
      // Aligned, never dereferenced.
      return NonNull::new(ptr::without_provenance_mut(layout.align()))
        .ok_or_else(|| AllocError::out_of_memory(layout));
    }

    NonNull::new(unsafe { alloc::alloc(layout) }).ok_or_else(|| AllocError::out_of_memory(layout))
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    if layout.size() != 0 {
      unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  #[test]
  fn test_global_round_trip() {
    let layout = Layout::array::<u32>(8).unwrap();

    unsafe {
      let block = Global.allocate(layout).unwrap().cast::<u32>();

      for i in 0..8 {
        Global.construct(block.add(i), i as u32 * 3);
      }

      for i in 0..8 {
        assert_eq!(*block.add(i).as_ptr(), i as u32 * 3);
      }

      Global.deallocate(block.cast(), layout);
    }
  }

  #[test]
  fn test_global_zero_sized() {
    let layout = Layout::from_size_align(0, 16).unwrap();
    let block = Global.allocate(layout).unwrap();

    assert_eq!(block.as_ptr() as usize % 16, 0);

    unsafe { Global.deallocate(block, layout) };
  }

  #[test]
  fn test_destroy_runs_drop() {
    let drops = Rc::new(Cell::new(0));

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
      fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
      }
    }

    let layout = Layout::new::<DropCounter>();

    unsafe {
      let slot = (&Global).allocate(layout).unwrap().cast::<DropCounter>();
      (&Global).construct(slot, DropCounter(drops.clone()));
      assert_eq!(drops.get(), 0);

      (&Global).destroy(slot);
      assert_eq!(drops.get(), 1);

      (&Global).deallocate(slot.cast(), layout);
    }
  }
}
