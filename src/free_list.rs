//! Circular, address-ordered free list threaded through block headers.
//!
//! ```text
//!        cursor
//!          │
//!          ▼
//!   ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//!   │ sentinel │───▶│ 0x..0010 │───▶│ 0x..0080 │───▶│ 0x..0200 │──┐
//!   │  size 0  │    │  size 4  │    │  size 2  │    │ size 60  │  │
//!   └──────────┘    └──────────┘    └──────────┘    └──────────┘  │
//!        ▲                                                        │
//!        └────────────────────────────────────────────────────────┘
//! ```
//!
//! The sentinel lives outside the arena at the reserved address `0`, so it is
//! always the lowest node and nothing can ever coalesce with it.

use log::trace;

use crate::{arena::Arena, block::BlockHeader};

/// Address of the permanent zero-size sentinel node.
pub const SENTINEL: usize = 0;

#[derive(Debug, Default)]
pub struct FreeList {
  sentinel: BlockHeader,
  /// Where the next search or insertion starts. `None` until first use.
  cursor: Option<usize>,
}

impl FreeList {
  pub fn new() -> Self {
    Self {
      sentinel: BlockHeader::new(0, SENTINEL),
      cursor: None,
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.cursor.is_some()
  }

  fn cursor(&mut self) -> usize {
    *self.cursor.get_or_insert_with(|| {
      trace!("free list: creating sentinel");
      SENTINEL
    })
  }

  unsafe fn header<A: Arena>(
    &self,
    arena: &A,
    address: usize,
  ) -> BlockHeader {
    if address == SENTINEL {
      self.sentinel
    } else {
      unsafe { arena.load(address) }
    }
  }

  unsafe fn set_header<A: Arena>(
    &mut self,
    arena: &mut A,
    address: usize,
    header: BlockHeader,
  ) {
    if address == SENTINEL {
      self.sentinel = header;
    } else {
      unsafe { arena.store(address, header) }
    }
  }

  /// Next-fit search for a block of `units` header units.
  ///
  /// Walks the list once, starting just after the cursor. An exact fit is
  /// unlinked; a larger block gives up its tail. Returns the header address
  /// of the carved block, or `None` after a full lap without a fit.
  ///
  /// # Safety
  ///
  /// Every node reachable from the cursor must be a valid free block of
  /// `arena`.
  pub unsafe fn take<A: Arena>(
    &mut self,
    arena: &mut A,
    units: usize,
  ) -> Option<usize> {
    debug_assert!(units >= 1);

    let start = self.cursor();
    let mut prev = start;

    unsafe {
      let mut current = self.header(arena, prev).next;

      loop {
        let mut header = self.header(arena, current);

        if header.size == units {
          trace!("free list: exact fit of {} units at {:#x}", units, current);

          let mut prev_header = self.header(arena, prev);
          prev_header.next = header.next;
          self.set_header(arena, prev, prev_header);

          self.cursor = Some(prev);
          return Some(current);
        }

        if header.size > units {
          header.size -= units;
          self.set_header(arena, current, header);

          let tail = header.end(current, A::UNIT);
          arena.store(tail, BlockHeader::new(units, SENTINEL));

          trace!(
            "free list: split {:#x}, {} units left, carved {} units at {:#x}",
            current, header.size, units, tail
          );

          self.cursor = Some(prev);
          return Some(tail);
        }

        if current == start {
          trace!("free list: no block of {} units", units);
          return None;
        }

        prev = current;
        current = header.next;
      }
    }
  }

  /// Links the block whose header is at `block` back into the list,
  /// merging it with address-adjacent neighbours.
  ///
  /// # Safety
  ///
  /// `block` must hold a valid header inside `arena`, must not overlap any
  /// free block, and must not already be in the list.
  pub unsafe fn insert<A: Arena>(
    &mut self,
    arena: &mut A,
    block: usize,
  ) {
    debug_assert!(block != SENTINEL);

    let mut prev = self.cursor();

    unsafe {
      debug_assert!(
        !self.contains(arena, block),
        "double free of block at {block:#x}"
      );

      loop {
        let next = self.header(arena, prev).next;

        if block > prev && block < next {
          break;
        }
        // `prev` is the highest node; the block goes after it when it is
        // above every node or below every node.
        if prev >= next && (block > prev || block < next) {
          break;
        }

        prev = next;
      }

      let mut block_header = arena.load(block);
      let mut prev_header = self.header(arena, prev);
      let next = prev_header.next;

      if block_header.end(block, A::UNIT) == next {
        let next_header = self.header(arena, next);
        trace!("free list: {:#x} absorbs successor {:#x}", block, next);

        block_header.size += next_header.size;
        block_header.next = next_header.next;
      } else {
        block_header.next = next;
      }

      if prev_header.end(prev, A::UNIT) == block {
        trace!("free list: predecessor {:#x} absorbs {:#x}", prev, block);

        prev_header.size += block_header.size;
        prev_header.next = block_header.next;
      } else {
        arena.store(block, block_header);
        prev_header.next = block;
      }

      self.set_header(arena, prev, prev_header);
    }

    self.cursor = Some(prev);
  }

  /// Free blocks as `(address, size)` pairs in list order, starting after
  /// the sentinel. Empty before first use.
  ///
  /// # Safety
  ///
  /// Same as [`take`](FreeList::take).
  pub unsafe fn blocks<A: Arena>(
    &self,
    arena: &A,
  ) -> Vec<(usize, usize)> {
    let mut blocks = Vec::new();

    if !self.is_initialized() {
      return blocks;
    }

    let mut current = self.sentinel.next;
    while current != SENTINEL {
      let header = unsafe { self.header(arena, current) };
      blocks.push((current, header.size));
      current = header.next;
    }

    blocks
  }

  unsafe fn contains<A: Arena>(
    &self,
    arena: &A,
    block: usize,
  ) -> bool {
    unsafe { self.blocks(arena) }.iter().any(|&(address, _)| address == block)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sim::{DEFAULT_BASE, SimArena};

  const UNIT: usize = SimArena::UNIT;

  /// Writes a fresh header of `size` units at `address` and frees it.
  unsafe fn free(
    list: &mut FreeList,
    arena: &mut SimArena,
    address: usize,
    size: usize,
  ) {
    unsafe {
      arena.store(address, BlockHeader::new(size, SENTINEL));
      list.insert(arena, address);
    }
  }

  fn arena(units: usize) -> SimArena {
    let mut arena = SimArena::new();
    arena.extend(units * UNIT).unwrap();
    arena
  }

  fn at(unit: usize) -> usize {
    DEFAULT_BASE + unit * UNIT
  }

  #[test_log::test]
  fn test_uninitialized_list_is_empty() {
    let arena = SimArena::new();
    let list = FreeList::new();

    assert!(!list.is_initialized());
    assert!(unsafe { list.blocks(&arena) }.is_empty());
  }

  #[test_log::test]
  fn test_take_from_empty_list_creates_sentinel() {
    let mut arena = arena(4);
    let mut list = FreeList::new();

    assert_eq!(unsafe { list.take(&mut arena, 1) }, None);
    assert!(list.is_initialized());
    assert_eq!(list.sentinel, BlockHeader::new(0, SENTINEL));
  }

  #[test_log::test]
  fn test_insert_into_empty_list() {
    let mut arena = arena(4);
    let mut list = FreeList::new();
    let a = at(0);

    unsafe {
      free(&mut list, &mut arena, a, 4);

      assert_eq!(list.blocks(&arena), vec![(a, 4)]);
      assert_eq!(arena.load(a).next, SENTINEL);
    }
    assert_eq!(list.sentinel.next, a);
    assert_eq!(list.cursor, Some(SENTINEL));
  }

  #[test_log::test]
  fn test_insert_keeps_address_order() {
    let mut arena = arena(12);
    let mut list = FreeList::new();

    unsafe {
      for address in [at(8), at(0), at(4)] {
        free(&mut list, &mut arena, address, 2);
      }

      assert_eq!(list.blocks(&arena), vec![(at(0), 2), (at(4), 2), (at(8), 2)]);
    }
  }

  #[test_log::test]
  fn test_insert_wraps_above_highest_node() {
    let mut arena = arena(12);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(0), 2);
      free(&mut list, &mut arena, at(4), 2);
      // Cursor now sits on at(0); the walk has to pass at(4) and wrap.
      free(&mut list, &mut arena, at(8), 2);

      assert_eq!(list.blocks(&arena), vec![(at(0), 2), (at(4), 2), (at(8), 2)]);
      assert_eq!(list.cursor, Some(at(4)));
      assert_eq!(arena.load(at(8)).next, SENTINEL);
    }
  }

  #[test_log::test]
  fn test_insert_below_every_node_from_high_cursor() {
    let mut arena = arena(12);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(4), 2);
      free(&mut list, &mut arena, at(8), 2);
      assert_eq!(list.cursor, Some(at(4)));

      free(&mut list, &mut arena, at(0), 2);

      assert_eq!(list.blocks(&arena), vec![(at(0), 2), (at(4), 2), (at(8), 2)]);
      assert_eq!(list.cursor, Some(SENTINEL));
    }
  }

  #[test_log::test]
  fn test_block_just_above_sentinel_never_merges_with_it() {
    let mut arena = SimArena::with_base(UNIT);
    arena.extend(2 * UNIT).unwrap();
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, UNIT, 2);

      assert_eq!(list.blocks(&arena), vec![(UNIT, 2)]);
    }
    assert_eq!(list.sentinel, BlockHeader::new(0, UNIT));
  }

  #[test_log::test]
  fn test_coalesce_forward() {
    let mut arena = arena(8);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(2), 3);
      free(&mut list, &mut arena, at(0), 2);

      assert_eq!(list.blocks(&arena), vec![(at(0), 5)]);
    }
  }

  #[test_log::test]
  fn test_coalesce_backward() {
    let mut arena = arena(8);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(0), 2);
      free(&mut list, &mut arena, at(2), 3);

      assert_eq!(list.blocks(&arena), vec![(at(0), 5)]);
      assert_eq!(list.cursor, Some(at(0)));
    }
  }

  #[test_log::test]
  fn test_coalesce_both_sides() {
    let mut arena = arena(8);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(0), 2);
      free(&mut list, &mut arena, at(4), 4);
      assert_eq!(list.blocks(&arena).len(), 2);

      free(&mut list, &mut arena, at(2), 2);

      assert_eq!(list.blocks(&arena), vec![(at(0), 8)]);
      assert_eq!(arena.load(at(0)).next, SENTINEL);
    }
  }

  #[test_log::test]
  fn test_take_exact_fit_unlinks() {
    let mut arena = arena(8);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(0), 2);
      free(&mut list, &mut arena, at(4), 3);

      assert_eq!(list.take(&mut arena, 3), Some(at(4)));
      assert_eq!(list.blocks(&arena), vec![(at(0), 2)]);
    }
  }

  #[test_log::test]
  fn test_take_splits_tail() {
    let mut arena = arena(8);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(0), 8);

      assert_eq!(list.take(&mut arena, 3), Some(at(5)));
      assert_eq!(arena.load(at(5)).size, 3);
      assert_eq!(list.blocks(&arena), vec![(at(0), 5)]);
    }
  }

  #[test_log::test]
  fn test_take_resumes_from_cursor() {
    let mut arena = arena(12);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(0), 2);
      free(&mut list, &mut arena, at(4), 2);
      free(&mut list, &mut arena, at(8), 2);
      assert_eq!(list.cursor, Some(at(4)));

      // First fit from the head would pick at(0).
      assert_eq!(list.take(&mut arena, 2), Some(at(8)));
      assert_eq!(list.take(&mut arena, 2), Some(at(0)));
      assert_eq!(list.take(&mut arena, 2), Some(at(4)));
      assert_eq!(list.take(&mut arena, 1), None);
      assert!(list.blocks(&arena).is_empty());
    }
  }

  #[cfg(debug_assertions)]
  #[test]
  #[should_panic(expected = "double free")]
  fn test_double_free_is_caught_in_debug() {
    let mut arena = arena(4);
    let mut list = FreeList::new();

    unsafe {
      free(&mut list, &mut arena, at(0), 2);
      list.insert(&mut arena, at(0));
    }
  }
}
