use std::{
  alloc::Layout,
  cell::Cell,
  io, mem,
  ptr::{self, NonNull},
};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void};
use tracing::{debug, trace, warn};

use crate::{
  align, align_to,
  allocator::Allocator,
  block::Block,
  config::{BumpConfig, SearchMode},
  error::AllocError,
};

/// A bump allocator over a single anonymous memory mapping.
///
/// Every allocation carries a [`Block`] header and is linked into a list.
/// Freed blocks are reused by later requests they fit, and freeing the most
/// recent block moves the bump cursor back.
///
/// ```text
///   base                                   cursor                 end
///   ┌──────┬────┬──────┬────────┬──────┬────┬──────────────────────┐
///   │ hdr  │ A1 │ hdr  │   A2   │ hdr  │ A3 │      free space      │
///   └──────┴────┴──────┴────────┴──────┴────┴──────────────────────┘
/// ```
///
/// Not thread safe. Share it between containers by reference, `&BumpAllocator`
/// is itself an [`Allocator`].
pub struct BumpAllocator {
  base: NonNull<u8>,
  size: usize,
  cursor: Cell<usize>,
  first: Cell<*mut Block>,
  last: Cell<*mut Block>,
  config: BumpConfig,
}

impl BumpAllocator {
  pub fn new(config: BumpConfig) -> Result<Self, AllocError> {
    let size = page_rounded(config.region_size.max(1)).ok_or(AllocError::RegionTooLarge {
      requested: config.region_size,
    })?;

    let address = unsafe {
      libc::mmap(
        ptr::null_mut(),
        size,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      return Err(AllocError::RegionMap {
        size,
        errno: io::Error::last_os_error().raw_os_error().unwrap_or(0),
      });
    }

    let base = NonNull::new(address as *mut u8).ok_or(AllocError::RegionMap { size, errno: 0 })?;

    debug!(size, base = ?base, "mapped bump region");

    Ok(Self {
      base,
      size,
      cursor: Cell::new(0),
      first: Cell::new(ptr::null_mut()),
      last: Cell::new(ptr::null_mut()),
      config,
    })
  }

  pub fn config(&self) -> &BumpConfig {
    &self.config
  }

  /// Total size of the mapped region.
  pub fn capacity(&self) -> usize {
    self.size
  }

  /// Bytes between the region base and the bump cursor.
  pub fn used(&self) -> usize {
    self.cursor.get()
  }

  pub fn remaining(&self) -> usize {
    self.size - self.cursor.get()
  }

  /// Number of blocks currently linked, free or not.
  pub fn block_count(&self) -> usize {
    let mut count = 0;
    let mut current = self.first.get();

    while !current.is_null() {
      count += 1;
      current = unsafe { (*current).next };
    }

    count
  }

  fn find_free_block(
    &self,
    layout: Layout,
  ) -> *mut Block {
    let mut current = self.first.get();
    let mut best: *mut Block = ptr::null_mut();

    unsafe {
      while !current.is_null() {
        if Block::fits(current, layout.size(), layout.align()) {
          match self.config.search {
            SearchMode::FirstFit => return current,
            SearchMode::BestFit => {
              if best.is_null() || (*current).size < (*best).size {
                best = current;
              }
            }
          }
        }
        current = (*current).next;
      }
    }

    best
  }

  fn bump(
    &self,
    layout: Layout,
  ) -> Result<*mut Block, AllocError> {
    let base = self.base.as_ptr() as usize;
    let start = base + self.cursor.get();

    let align = layout.align().max(mem::align_of::<Block>());
    let payload = align_to!(start + Block::HEADER_SIZE, align);
    let end = align!(payload + layout.size());

    if end > base + self.size {
      let remaining = self.remaining();
      warn!(requested = end - start, remaining, "bump region exhausted");
      return Err(AllocError::RegionExhausted {
        requested: end - start,
        remaining,
      });
    }

    let start = unsafe { self.base.as_ptr().add(start - base) };
    let block = unsafe { self.base.as_ptr().add(payload - base - Block::HEADER_SIZE) } as *mut Block;

    unsafe {
      block.write(Block::new(layout.size(), start, false, ptr::null_mut()));

      if self.first.get().is_null() {
        self.first.set(block);
      } else {
        (*self.last.get()).next = block;
      }
    }

    self.last.set(block);
    self.cursor.set(end - base);

    Ok(block)
  }

  /// Pops free blocks off the tail and moves the cursor back over them.
  fn release_tail(&self) {
    unsafe {
      while !self.last.get().is_null() && (*self.last.get()).is_free {
        let tail = self.last.get();

        if self.first.get() == tail {
          self.first.set(ptr::null_mut());
          self.last.set(ptr::null_mut());
        } else {
          let mut current = self.first.get();
          while (*current).next != tail {
            current = (*current).next;
          }
          (*current).next = ptr::null_mut();
          self.last.set(current);
        }

        let rewound = (*tail).start as usize - self.base.as_ptr() as usize;
        debug!(from = self.cursor.get(), to = rewound, "rewound bump cursor");
        self.cursor.set(rewound);
      }
    }
  }
}

unsafe impl Allocator for BumpAllocator {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError> {
    let free_block = self.find_free_block(layout);

    let block = if free_block.is_null() {
      self.bump(layout)?
    } else {
      unsafe { (*free_block).is_free = false };
      free_block
    };

    let payload = unsafe { Block::payload(block) };
    trace!(
      size = layout.size(),
      align = layout.align(),
      address = ?payload,
      reused = !free_block.is_null(),
      "allocated block"
    );

    NonNull::new(payload).ok_or_else(|| AllocError::out_of_memory(layout))
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    let block = unsafe { Block::from_payload(ptr.as_ptr()) };
    unsafe { (*block).is_free = true };

    trace!(size = layout.size(), address = ?ptr, "freed block");

    if self.config.release_tail && block == self.last.get() {
      self.release_tail();
    }
  }
}

impl Drop for BumpAllocator {
  fn drop(&mut self) {
    let result = unsafe { libc::munmap(self.base.as_ptr() as *mut c_void, self.size) };

    if result != 0 {
      warn!(error = %io::Error::last_os_error(), "failed to unmap bump region");
    } else {
      debug!(size = self.size, "unmapped bump region");
    }
  }
}

fn page_size() -> usize {
  match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
    size if size > 0 => size as usize,
    _ => 4096,
  }
}

/// `size` rounded up to a whole number of pages, if that fits in `usize`.
fn page_rounded(size: usize) -> Option<usize> {
  let page = page_size();
  size.checked_add(page - 1).map(|padded| padded & !(page - 1))
}
