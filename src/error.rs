use std::alloc::Layout;

use thiserror::Error;

/// Failure reported by an [`Allocator`](crate::Allocator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
  /// The system allocator returned null.
  #[error("out of memory: failed to allocate {size} bytes aligned to {align}")]
  OutOfMemory { size: usize, align: usize },

  /// A region allocator has no room left for the request.
  #[error("region exhausted: requested {requested} bytes, {remaining} bytes remaining")]
  RegionExhausted { requested: usize, remaining: usize },

  /// The requested region size does not round up to whole pages.
  #[error("region of {requested} bytes is too large to map")]
  RegionTooLarge { requested: usize },

  /// Mapping the backing region failed.
  #[error("failed to map a region of {size} bytes (errno {errno})")]
  RegionMap { size: usize, errno: i32 },
}

impl AllocError {
  pub fn out_of_memory(layout: Layout) -> Self {
    Self::OutOfMemory {
      size: layout.size(),
      align: layout.align(),
    }
  }
}

/// Failure reported by [`ExpandableArray`](crate::ExpandableArray) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
  /// The requested slot count does not fit in a valid memory layout.
  #[error("capacity overflow: {requested} slots")]
  CapacityOverflow { requested: usize },

  /// The allocator could not satisfy a buffer request.
  #[error("buffer allocation of {size} bytes failed: {source}")]
  Alloc {
    size: usize,
    align: usize,
    #[source]
    source: AllocError,
  },
}

impl ArrayError {
  pub(crate) fn alloc(
    layout: Layout,
    source: AllocError,
  ) -> Self {
    Self::Alloc {
      size: layout.size(),
      align: layout.align(),
      source,
    }
  }

  /// Diverges the way the standard collections do on the same failure.
  ///
  /// Used by the infallible constructors and the `Clone` impl.
  #[cold]
  #[inline(never)]
  pub(crate) fn panic(self) -> ! {
    match self {
      Self::CapacityOverflow { .. } => panic!("{self}"),
      Self::Alloc { size, align, .. } => match Layout::from_size_align(size, align) {
        Ok(layout) => std::alloc::handle_alloc_error(layout),
        Err(_) => panic!("{self}"),
      },
    }
  }
}
