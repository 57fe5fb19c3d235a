use log::{debug, error, trace};

use crate::{
  align::units_for, arena::Arena, block::BlockHeader, config::HeapConfig, error::HeapError,
  free_list::FreeList,
};

/// Snapshot of a heap's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapStats {
  /// Header units ever obtained from the arena.
  pub arena_units: usize,
  /// Header units currently on the free list.
  pub free_units: usize,
  pub free_blocks: usize,
  /// Number of arena extensions performed.
  pub extensions: usize,
}

/// A `malloc`/`free` heap over a single growable [`Arena`].
///
/// Not thread-safe. Each `Heap` owns its arena, free list and search cursor,
/// so independent heaps never interfere with one another.
pub struct Heap<A: Arena> {
  arena: A,
  config: HeapConfig,
  free_list: FreeList,
  arena_units: usize,
  extensions: usize,
}

impl<A: Arena> Heap<A> {
  pub fn new(arena: A) -> Self {
    Self::with_config(arena, HeapConfig::default())
  }

  pub fn with_config(
    arena: A,
    config: HeapConfig,
  ) -> Self {
    Self {
      arena,
      config,
      free_list: FreeList::new(),
      arena_units: 0,
      extensions: 0,
    }
  }

  pub fn arena(&self) -> &A {
    &self.arena
  }

  pub fn config(&self) -> HeapConfig {
    self.config
  }

  /// Returns the address of a data region of at least `size` bytes.
  ///
  /// The region starts one header unit past its block header and is aligned
  /// to the header unit. Grows the arena when no free block fits; if that
  /// fails the heap is left exactly as it was.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<usize, HeapError> {
    let units = units_for(size, A::UNIT)
      .filter(|units| units.checked_mul(A::UNIT).is_some())
      .ok_or(HeapError::SizeOverflow { size })?;

    trace!("allocate({}) -> {} units", size, units);

    // SAFETY: every node on the free list was carved from arena memory by
    // `extend` or handed back through `deallocate`.
    let block = loop {
      if let Some(block) = unsafe { self.free_list.take(&mut self.arena, units) } {
        break block;
      }
      self.extend(units)?;
    };

    Ok(block + A::UNIT)
  }

  /// Like [`allocate`](Heap::allocate), but treats exhaustion as fatal and
  /// aborts the process.
  pub fn allocate_or_abort(
    &mut self,
    size: usize,
  ) -> usize {
    match self.allocate(size) {
      Ok(address) => address,
      Err(err) => {
        error!("allocate({}) failed: {}", size, err);
        std::process::abort()
      },
    }
  }

  /// Returns the block holding `address` to the free list.
  ///
  /// # Safety
  ///
  /// `address` must have been returned by [`allocate`](Heap::allocate) on
  /// this heap and not deallocated since.
  pub unsafe fn deallocate(
    &mut self,
    address: usize,
  ) {
    let block = address - A::UNIT;
    debug_assert!(
      self.arena.contains(block, A::UNIT),
      "{address:#x} was not allocated from this heap"
    );

    trace!("deallocate({:#x})", address);

    unsafe { self.free_list.insert(&mut self.arena, block) };
  }

  /// Memset over client memory.
  ///
  /// # Safety
  ///
  /// `[address, address + count)` must lie inside a live allocation.
  pub unsafe fn fill(
    &mut self,
    address: usize,
    value: u8,
    count: usize,
  ) {
    debug_assert!(self.arena.contains(address, count));
    unsafe { self.arena.fill(address, value, count) }
  }

  /// Grows the arena by at least `units` and links the new space into the
  /// free list.
  fn extend(
    &mut self,
    units: usize,
  ) -> Result<(), HeapError> {
    let units = units.max(self.config.min_extension_units);
    let bytes = units
      .checked_mul(A::UNIT)
      .ok_or(HeapError::OutOfMemory { requested_bytes: usize::MAX })?;

    let base = match self.arena.extend(bytes) {
      Ok(base) => base,
      Err(err) => {
        debug!("arena extension of {} units failed: {}", units, err);
        return Err(err);
      },
    };

    debug!("arena extended by {} units ({} bytes) at {:#x}", units, bytes, base);

    self.arena_units += units;
    self.extensions += 1;

    // SAFETY: `[base, base + bytes)` was just handed out by the arena and is
    // not part of any block yet.
    unsafe {
      self.arena.store(base, BlockHeader::new(units, base));
      self.free_list.insert(&mut self.arena, base);
    }

    Ok(())
  }

  /// Free blocks as `(address, size_in_units)`, in list order.
  pub fn free_blocks(&self) -> Vec<(usize, usize)> {
    unsafe { self.free_list.blocks(&self.arena) }
  }

  pub fn stats(&self) -> HeapStats {
    let blocks = self.free_blocks();

    HeapStats {
      arena_units: self.arena_units,
      free_units: blocks.iter().map(|&(_, size)| size).sum(),
      free_blocks: blocks.len(),
      extensions: self.extensions,
    }
  }
}

impl<A: Arena + Default> Default for Heap<A> {
  fn default() -> Self {
    Self::new(A::default())
  }
}
