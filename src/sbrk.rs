use std::{mem, ptr};

use libc::{c_void, intptr_t, sbrk};
use log::debug;

use crate::{align_to, arena::Arena, block::BlockHeader, error::HeapError};

/// Returns the current program break, i.e. `sbrk(0)`.
pub fn program_break() -> usize {
  unsafe { sbrk(0) as usize }
}

/// Arena backed by the process data segment.
///
/// Each extension moves the program break with `sbrk(2)`. Headers are stored
/// natively as [`BlockHeader`] records, so the header unit is two machine
/// words. Regions from separate extensions are only contiguous when nothing
/// else moved the break in between; the free list copes with gaps.
///
/// The break is process-wide state: keep a single `SbrkArena` per process
/// and never use it from more than one thread.
#[derive(Debug, Default)]
pub struct SbrkArena {
  start: usize,
  end: usize,
}

impl SbrkArena {
  pub fn new() -> Self {
    Self { start: 0, end: 0 }
  }
}

impl Arena for SbrkArena {
  const UNIT: usize = mem::size_of::<BlockHeader>();

  fn extend(
    &mut self,
    bytes: usize,
  ) -> Result<usize, HeapError> {
    let out_of_memory = HeapError::OutOfMemory { requested_bytes: bytes };

    let current = program_break();
    let padding = align_to!(current, Self::UNIT) - current;

    let increment = bytes
      .checked_add(padding)
      .and_then(|increment| intptr_t::try_from(increment).ok())
      .ok_or(out_of_memory)?;

    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      return Err(out_of_memory);
    }

    let base = align_to!(address as usize, Self::UNIT);
    debug_assert!(base + bytes <= address as usize + increment as usize);

    if self.start == 0 {
      self.start = base;
    }
    self.end = base + bytes;

    debug!("sbrk arena: extended by {} bytes at {:#x} ({} padding)", bytes, base, padding);

    Ok(base)
  }

  fn contains(
    &self,
    address: usize,
    len: usize,
  ) -> bool {
    address >= self.start && address.checked_add(len).is_some_and(|end| end <= self.end)
  }

  unsafe fn load(
    &self,
    address: usize,
  ) -> BlockHeader {
    unsafe { ptr::read(address as *const BlockHeader) }
  }

  unsafe fn store(
    &mut self,
    address: usize,
    header: BlockHeader,
  ) {
    unsafe { ptr::write(address as *mut BlockHeader, header) }
  }

  unsafe fn fill(
    &mut self,
    address: usize,
    value: u8,
    count: usize,
  ) {
    unsafe { ptr::write_bytes(address as *mut u8, value, count) }
  }
}
