use std::mem;

/// Header written in front of every payload handed out by the bump allocator.
pub struct Block {
  /// Payload size in bytes.
  pub size: usize,
  /// First byte of the span this block occupies, including alignment padding.
  pub start: *mut u8,
  pub is_free: bool,
  pub next: *mut Block,
}

impl Block {
  pub const HEADER_SIZE: usize = mem::size_of::<Block>();

  pub fn new(
    size: usize,
    start: *mut u8,
    is_free: bool,
    next: *mut Block,
  ) -> Self {
    Self {
      size,
      start,
      is_free,
      next,
    }
  }

  /// # Safety
  ///
  /// `block` must point to a header written by the allocator.
  pub unsafe fn payload(block: *mut Block) -> *mut u8 {
    unsafe { (block as *mut u8).add(Self::HEADER_SIZE) }
  }

  /// # Safety
  ///
  /// `payload` must have been returned by [`Block::payload`].
  pub unsafe fn from_payload(payload: *mut u8) -> *mut Block {
    unsafe { payload.sub(Self::HEADER_SIZE) as *mut Block }
  }

  /// Whether the payload of `block` can serve `size` bytes aligned to `align`.
  ///
  /// # Safety
  ///
  /// `block` must point to a header written by the allocator.
  pub unsafe fn fits(
    block: *mut Block,
    size: usize,
    align: usize,
  ) -> bool {
    unsafe { (*block).is_free && (*block).size >= size && Self::payload(block) as usize % align == 0 }
  }
}
