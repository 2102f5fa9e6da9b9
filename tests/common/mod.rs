#![allow(dead_code)]

use std::{alloc::Layout, cell::Cell, ptr::NonNull, rc::Rc};

use rexpandable::{AllocError, Allocator, Global, scalar_element};

/// Forwards to [`Global`] and keeps a ledger of everything that passes
/// through it. Clones share the ledger.
#[derive(Clone, Default)]
pub struct Ledger {
  pub allocated: Rc<Cell<usize>>,
  pub deallocated: Rc<Cell<usize>>,
  pub constructed: Rc<Cell<usize>>,
  pub destroyed: Rc<Cell<usize>>,
}

impl Ledger {
  pub fn live_blocks(&self) -> usize {
    self.allocated.get() - self.deallocated.get()
  }
}

unsafe impl Allocator for Ledger {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError> {
    self.allocated.set(self.allocated.get() + 1);
    Global.allocate(layout)
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    self.deallocated.set(self.deallocated.get() + 1);
    unsafe { Global.deallocate(ptr, layout) }
  }

  unsafe fn construct<T>(
    &self,
    slot: NonNull<T>,
    value: T,
  ) {
    self.constructed.set(self.constructed.get() + 1);
    unsafe { slot.as_ptr().write(value) }
  }

  unsafe fn destroy<T>(
    &self,
    slot: NonNull<T>,
  ) {
    self.destroyed.set(self.destroyed.get() + 1);
    unsafe { std::ptr::drop_in_place(slot.as_ptr()) }
  }
}

/// Shared counters observed by [`Witness`] values.
#[derive(Clone, Default)]
pub struct Counters {
  pub clones: Rc<Cell<usize>>,
  pub drops: Rc<Cell<usize>>,
  /// Clone number (1-based) that panics, if any.
  pub panic_on_clone: Rc<Cell<Option<usize>>>,
}

impl Counters {
  pub fn witness(
    &self,
    id: u32,
  ) -> Witness {
    Witness {
      id,
      counters: self.clone(),
    }
  }

  /// Values alive now, given how many were built by hand.
  pub fn live(
    &self,
    created: usize,
  ) -> usize {
    created + self.clones.get() - self.drops.get()
  }
}

/// An element that reports its clones and drops.
pub struct Witness {
  pub id: u32,
  counters: Counters,
}

impl Clone for Witness {
  fn clone(&self) -> Self {
    let count = self.counters.clones.get() + 1;

    if self.counters.panic_on_clone.get() == Some(count) {
      panic!("clone #{count} failed");
    }

    self.counters.clones.set(count);
    Self {
      id: self.id,
      counters: self.counters.clone(),
    }
  }
}

impl Drop for Witness {
  fn drop(&mut self) {
    self.counters.drops.set(self.counters.drops.get() + 1);
  }
}

scalar_element!(Witness);

pub fn ids(values: &[Witness]) -> Vec<u32> {
  values.iter().map(|witness| witness.id).collect()
}
