/// Builds an [`ExpandableArray`](crate::ExpandableArray) from a literal list,
/// like `vec!`.
///
/// ```rust
/// use rexpandable::expandable;
///
/// let listed = expandable![1, 2, 3];
/// assert_eq!(listed.as_slice(), &[1, 2, 3]);
/// assert_eq!(listed.capacity(), 6);
///
/// let filled = expandable!["x"; 2];
/// assert_eq!(filled.as_slice(), &["x", "x"]);
///
/// let empty = expandable![];
/// # let _: &rexpandable::ExpandableArray<u8> = &empty;
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! expandable {
  () => {
    $crate::ExpandableArray::new()
  };
  ($value:expr; $len:expr) => {
    $crate::ExpandableArray::from_elem($len, $value)
  };
  ($($value:expr),+ $(,)?) => {
    $crate::ExpandableArray::from([$($value),+])
  };
}
