use rexpandable::{BumpAllocator, BumpConfig, ExpandableArray, SearchMode, expandable};
use tracing_subscriber::EnvFilter;

/// Prints the shape of an array: live elements, length, and allocated slots.
fn show<T: rexpandable::Element + std::fmt::Debug, A: rexpandable::Allocator>(
  label: &str,
  array: &ExpandableArray<T, A>,
) {
  println!(
    "[{}] len = {}, capacity = {}, elements = {:?}",
    label,
    array.len(),
    array.capacity(),
    array,
  );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  // RUST_LOG=rexpandable=trace shows every block and reallocation.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // --------------------------------------------------------------------
  // 1) Global allocator: construction forms and their capacities.
  // --------------------------------------------------------------------
  let empty: ExpandableArray<u32> = ExpandableArray::new();
  show("1 new", &empty);

  let filled = ExpandableArray::from_elem(3, 7u32);
  show("1 from_elem", &filled);

  let listed = expandable![1u32, 2, 3, 4, 5];
  show("1 list", &listed);

  // --------------------------------------------------------------------
  // 2) Capacity management. Reserving below the length truncates.
  // --------------------------------------------------------------------
  let mut numbers = listed.clone();
  numbers.reserve(16)?;
  show("2 reserve(16)", &numbers);

  numbers.reserve(2)?;
  show("2 reserve(2)", &numbers);

  numbers.resize(6, 9)?;
  show("2 resize(6, 9)", &numbers);

  // --------------------------------------------------------------------
  // 3) Copy and move.
  // --------------------------------------------------------------------
  let mut target = ExpandableArray::from_elem(1, 0u32);
  target.assign_from(&numbers)?;
  show("3 assign_from", &target);

  let moved = target.take();
  show("3 take (moved)", &moved);
  show("3 take (source)", &target);

  // --------------------------------------------------------------------
  // 4) A bump region shared by two arrays of nested fixed-length arrays.
  // --------------------------------------------------------------------
  let bump = BumpAllocator::new(BumpConfig::default().with_search(SearchMode::BestFit))?;
  {
    let mut grid = ExpandableArray::from_elem_in(2, [[1u8; 3]; 2], &bump)?;
    let words = ExpandableArray::from_slice_in(&["alpha", "beta"], &bump)?;

    grid.resize(4, [[0u8; 3]; 2])?;
    show("4 grid", &grid);
    show("4 words", &words);

    println!("[4] region used = {} of {} bytes, blocks = {}", bump.used(), bump.capacity(), bump.block_count());
  }
  println!("[4] after drop: region used = {} bytes, blocks = {}", bump.used(), bump.block_count());

  Ok(())
}
