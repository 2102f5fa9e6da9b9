/// Strategy used by [`BumpAllocator`](crate::BumpAllocator) when looking for a
/// freed block to reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
  /// Take the first free block large enough for the request.
  #[default]
  FirstFit,
  /// Take the smallest free block large enough for the request.
  BestFit,
}

/// Configuration for a [`BumpAllocator`](crate::BumpAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpConfig {
  /// Size of the mapped region in bytes. Rounded up to the page size.
  pub region_size: usize,

  /// How freed blocks are searched before bumping.
  pub search: SearchMode,

  /// Whether freeing the most recent block rewinds the bump cursor.
  ///
  /// Rewinding repeats while the new tail is free, so a stack-like
  /// allocation pattern returns the whole region.
  pub release_tail: bool,
}

impl BumpConfig {
  /// 1 MiB.
  pub const DEFAULT_REGION_SIZE: usize = 1 << 20;

  pub fn new(region_size: usize) -> Self {
    Self {
      region_size,
      search: SearchMode::default(),
      release_tail: true,
    }
  }

  pub fn with_search(
    mut self,
    search: SearchMode,
  ) -> Self {
    self.search = search;
    self
  }

  pub fn with_release_tail(
    mut self,
    release_tail: bool,
  ) -> Self {
    self.release_tail = release_tail;
    self
  }
}

impl Default for BumpConfig {
  fn default() -> Self {
    Self::new(Self::DEFAULT_REGION_SIZE)
  }
}
