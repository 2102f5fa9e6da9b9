//! Element destruction dispatch.
//!
//! A contiguous range is destroyed through [`Element::destroy_in`]. Scalar
//! elements hand their slot to the allocator's `destroy`; fixed-length arrays
//! recurse into their sub-elements first, so `[[T; N]; M]` reaches every `T`.
//! The choice is made by the trait impl, never at runtime.

use std::{
  cell::{Cell, RefCell},
  marker::PhantomData,
  ptr::NonNull,
  rc::Rc,
  sync::Arc,
};

use crate::allocator::Allocator;

/// A type that [`ExpandableArray`](crate::ExpandableArray) can hold.
///
/// Implement it for your own types with [`scalar_element!`](crate::scalar_element).
pub trait Element: Sized {
  /// Destroys the value in `slot` through `alloc`.
  ///
  /// # Safety
  ///
  /// `slot` must hold a live value, which is uninitialized afterwards.
  unsafe fn destroy_in<A: Allocator + ?Sized>(
    slot: NonNull<Self>,
    alloc: &A,
  ) {
    unsafe { alloc.destroy(slot) }
  }
}

impl<T: Element, const N: usize> Element for [T; N] {
  unsafe fn destroy_in<A: Allocator + ?Sized>(
    slot: NonNull<Self>,
    alloc: &A,
  ) {
    // Sub-elements own everything the outer slot holds.
    unsafe { destroy_range(slot.cast::<T>(), N, alloc) }
  }
}

/// Destroys `count` consecutive live values starting at `first`, in order.
///
/// # Safety
///
/// Every slot in the range must hold a live value; all of them are
/// uninitialized afterwards.
///
/// If destroying one value panics, the rest of the range is still destroyed
/// while the panic unwinds.
pub unsafe fn destroy_range<T: Element, A: Allocator + ?Sized>(
  first: NonNull<T>,
  count: usize,
  alloc: &A,
) {
  let mut rest = Remaining {
    first,
    next: 0,
    count,
    alloc,
  };

  while rest.next < rest.count {
    let slot = unsafe { rest.first.add(rest.next) };
    rest.next += 1;
    unsafe { T::destroy_in(slot, rest.alloc) }
  }
}

/// The part of a range [`destroy_range`] has not reached yet.
struct Remaining<'a, T: Element, A: Allocator + ?Sized> {
  first: NonNull<T>,
  next: usize,
  count: usize,
  alloc: &'a A,
}

impl<T: Element, A: Allocator + ?Sized> Drop for Remaining<'_, T, A> {
  fn drop(&mut self) {
    while self.next < self.count {
      let slot = unsafe { self.first.add(self.next) };
      self.next += 1;
      unsafe { T::destroy_in(slot, self.alloc) }
    }
  }
}

/// Implements [`Element`] for types that are destroyed as a single slot.
///
/// ```rust
/// use rexpandable::{ExpandableArray, scalar_element};
///
/// #[derive(Clone)]
/// struct Sample {
///     id: u32,
/// }
///
/// scalar_element!(Sample);
///
/// let samples = ExpandableArray::from_elem(3, Sample { id: 1 });
/// assert_eq!(samples.len(), 3);
/// assert_eq!(samples.as_slice()[2].id, 1);
/// ```
#[macro_export]
macro_rules! scalar_element {
  ($($ty:ty),* $(,)?) => {
    $(impl $crate::Element for $ty {})*
  };
}

scalar_element!(
  (),
  bool,
  char,
  i8,
  i16,
  i32,
  i64,
  i128,
  isize,
  u8,
  u16,
  u32,
  u64,
  u128,
  usize,
  f32,
  f64,
  String,
);

impl<T: ?Sized> Element for &T {}
impl<T: ?Sized> Element for &mut T {}
impl<T: ?Sized> Element for Box<T> {}
impl<T: ?Sized> Element for Rc<T> {}
impl<T: ?Sized> Element for Arc<T> {}
impl<T> Element for Vec<T> {}
impl<T> Element for Option<T> {}
impl<T, E> Element for Result<T, E> {}
impl<T> Element for Cell<T> {}
impl<T> Element for RefCell<T> {}
impl<T: ?Sized> Element for PhantomData<T> {}

macro_rules! tuple_element {
  ($($name:ident),+) => {
    impl<$($name),+> Element for ($($name,)+) {}
  };
}

tuple_element!(A);
tuple_element!(A, B);
tuple_element!(A, B, C);
tuple_element!(A, B, C, D);
