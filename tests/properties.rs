//! Property tests for the capacity contract of `ExpandableArray`.

use proptest::prelude::*;
use rexpandable::{ExpandableArray, HEADROOM_FACTOR};

fn values() -> impl Strategy<Value = Vec<i32>> {
  prop::collection::vec(any::<i32>(), 0..64)
}

proptest! {
  #[test]
  fn range_construct_reads_back_in_order(source in values()) {
    let array = ExpandableArray::from_slice(&source);

    prop_assert_eq!(array.len(), source.len());
    prop_assert_eq!(array.capacity(), source.len() * HEADROOM_FACTOR);
    prop_assert_eq!(array.as_slice(), source.as_slice());
  }

  #[test]
  fn sized_construct_fills_every_slot(len in 0usize..128, value in any::<i16>()) {
    let array = ExpandableArray::from_elem(len, value);

    prop_assert_eq!(array.len(), len);
    prop_assert!(array.as_slice().iter().all(|&element| element == value));
  }

  #[test]
  fn resize_sets_len_and_preserves_prefix(
    source in values(),
    new_size in 0usize..128,
    fill in any::<i32>(),
  ) {
    let mut array = ExpandableArray::from_slice(&source);
    array.resize(new_size, fill).unwrap();

    prop_assert_eq!(array.len(), new_size);
    prop_assert_eq!(array.capacity(), new_size * HEADROOM_FACTOR);

    let kept = source.len().min(new_size);
    prop_assert_eq!(&array.as_slice()[..kept], &source[..kept]);
    prop_assert!(array.as_slice()[kept..].iter().all(|&element| element == fill));
  }

  #[test]
  fn reserve_preserves_or_truncates(source in values(), capacity in 0usize..128) {
    let mut array = ExpandableArray::from_slice(&source);
    array.reserve(capacity).unwrap();

    let kept = source.len().min(capacity);
    prop_assert_eq!(array.capacity(), capacity);
    prop_assert_eq!(array.len(), kept);
    prop_assert_eq!(array.as_slice(), &source[..kept]);
  }

  #[test]
  fn reserve_is_idempotent(source in values(), capacity in 0usize..128) {
    let mut once = ExpandableArray::from_slice(&source);
    once.reserve(capacity).unwrap();

    let mut twice = ExpandableArray::from_slice(&source);
    twice.reserve(capacity).unwrap();
    twice.reserve(capacity).unwrap();

    prop_assert_eq!(once.len(), twice.len());
    prop_assert_eq!(once.capacity(), twice.capacity());
    prop_assert_eq!(once, twice);
  }

  #[test]
  fn copies_never_alias(source in prop::collection::vec(any::<i32>(), 1..64), poke in any::<i32>()) {
    let original = ExpandableArray::from_slice(&source);
    let mut copy = original.clone();

    prop_assert_eq!(&copy, &original);

    copy.as_mut_slice()[0] = poke;
    prop_assert_eq!(original.as_slice(), source.as_slice());
  }

  #[test]
  fn assign_from_matches_source(target in values(), source in values()) {
    let mut assigned = ExpandableArray::from_slice(&target);
    let other = ExpandableArray::from_slice(&source);

    assigned.assign_from(&other).unwrap();

    prop_assert_eq!(assigned.as_slice(), source.as_slice());
  }

  #[test]
  fn take_moves_everything(source in values()) {
    let mut array = ExpandableArray::from_slice(&source);
    let moved = array.take();

    prop_assert_eq!(array.len(), 0);
    prop_assert_eq!(array.capacity(), 0);
    prop_assert_eq!(moved.as_slice(), source.as_slice());
  }
}

#[test]
fn reserve_below_len_truncates_to_prefix() {
  let mut array = ExpandableArray::from([10, 20, 30, 40, 50]);

  array.reserve(3).unwrap();

  assert_eq!(array.len(), 3);
  assert_eq!(array.as_slice(), &[10, 20, 30]);
}

#[test]
fn default_construct_is_empty() {
  let array: ExpandableArray<String> = ExpandableArray::default();

  assert_eq!(array.len(), 0);
  assert_eq!(array.capacity(), rexpandable::DEFAULT_CAPACITY);
}
