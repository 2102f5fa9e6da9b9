/// Calculates the machine word alignment for the given size.
///
/// # Examples
///
/// ```rust
/// use rexpandable::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, ::core::mem::size_of::<usize>())
  };
}

/// Rounds `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two.
///
/// ```rust
/// use rexpandable::align_to;
///
/// assert_eq!(align_to!(1, 16), 16);
/// assert_eq!(align_to!(32, 16), 32);
/// assert_eq!(align_to!(0, 8), 0);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    ($value + $alignment - 1) & !($alignment - 1)
  };
}

#[cfg(test)]
mod tests {
  use std::mem;

  #[test]
  fn test_align() {
    let ptr_size = mem::size_of::<usize>();

    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ptr_size * i + 1)..=(ptr_size * (i + 1));

      let expected_alignment = ptr_size * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }
  }

  #[test]
  fn test_align_to_power_of_two() {
    for alignment in [1usize, 2, 4, 8, 16, 64, 4096] {
      for value in 0..200usize {
        let aligned = align_to!(value, alignment);

        assert_eq!(aligned % alignment, 0);
        assert!(aligned >= value);
        assert!(aligned - value < alignment);
      }
    }
  }
}
