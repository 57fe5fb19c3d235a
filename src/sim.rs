//! A byte-buffer arena with integer addresses.
//!
//! Models the dynamic data segment of a 32-bit machine: the heap starts at a
//! fixed base address and `extend` behaves like `sbrk`, handing back the old
//! break. Headers are stored as two little-endian `u32` words:
//!
//! ```text
//!   address + 0   address + 4   address + 8
//!   ┌─────────────┬─────────────┐
//!   │  next (u32) │  size (u32) │  ...payload
//!   └─────────────┴─────────────┘
//! ```

use log::debug;

use crate::{arena::Arena, block::BlockHeader, error::HeapError};

/// Start of the dynamic data segment on a MIPS32 target.
pub const DEFAULT_BASE: usize = 0x1004_0000;

const WORD: usize = 4;

#[derive(Debug, Clone)]
pub struct SimArena {
  base: usize,
  bytes: Vec<u8>,
  limit: Option<usize>,
}

impl SimArena {
  pub fn new() -> Self {
    Self::with_base(DEFAULT_BASE)
  }

  /// # Panics
  ///
  /// If `base` is `0` or not a multiple of the header unit.
  pub fn with_base(base: usize) -> Self {
    assert!(base != 0, "address 0 is reserved for the free-list sentinel");
    assert!(base % Self::UNIT == 0, "arena base must be header-unit aligned");

    Self {
      base,
      bytes: Vec::new(),
      limit: None,
    }
  }

  /// Caps the arena at `limit` bytes; extensions past it fail with
  /// [`HeapError::OutOfMemory`].
  pub fn with_limit(
    mut self,
    limit: usize,
  ) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn base(&self) -> usize {
    self.base
  }

  /// Current break: one past the last valid address.
  pub fn brk(&self) -> usize {
    self.base + self.bytes.len()
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  /// # Panics
  ///
  /// If the range is not inside the arena.
  pub fn read_bytes(
    &self,
    address: usize,
    len: usize,
  ) -> &[u8] {
    let start = self.offset(address, len);
    &self.bytes[start..start + len]
  }

  /// # Panics
  ///
  /// If the range is not inside the arena.
  pub fn write_bytes(
    &mut self,
    address: usize,
    data: &[u8],
  ) {
    let start = self.offset(address, data.len());
    self.bytes[start..start + data.len()].copy_from_slice(data);
  }

  fn offset(
    &self,
    address: usize,
    len: usize,
  ) -> usize {
    assert!(
      self.contains(address, len),
      "access of {len} bytes at {address:#x} outside arena [{:#x}, {:#x})",
      self.base,
      self.brk()
    );
    address - self.base
  }

  fn read_word(
    &self,
    address: usize,
  ) -> usize {
    let start = self.offset(address, WORD);
    let mut word = [0u8; WORD];
    word.copy_from_slice(&self.bytes[start..start + WORD]);
    u32::from_le_bytes(word) as usize
  }

  fn write_word(
    &mut self,
    address: usize,
    value: usize,
  ) {
    debug_assert!(value <= u32::MAX as usize, "{value:#x} does not fit a 32-bit word");
    let start = self.offset(address, WORD);
    self.bytes[start..start + WORD].copy_from_slice(&(value as u32).to_le_bytes());
  }
}

impl Default for SimArena {
  fn default() -> Self {
    Self::new()
  }
}

impl Arena for SimArena {
  const UNIT: usize = 2 * WORD;

  fn extend(
    &mut self,
    bytes: usize,
  ) -> Result<usize, HeapError> {
    let out_of_memory = HeapError::OutOfMemory { requested_bytes: bytes };

    let new_len = self.bytes.len().checked_add(bytes).ok_or(out_of_memory)?;
    if self.limit.is_some_and(|limit| new_len > limit) {
      return Err(out_of_memory);
    }
    // Addresses must stay representable in a header word.
    if self.base.checked_add(new_len).is_none_or(|end| end as u64 > u32::MAX as u64 + 1) {
      return Err(out_of_memory);
    }

    let old_brk = self.brk();
    self.bytes.resize(new_len, 0);
    debug!("sim arena: brk {:#x} -> {:#x}", old_brk, self.brk());

    Ok(old_brk)
  }

  fn contains(
    &self,
    address: usize,
    len: usize,
  ) -> bool {
    address >= self.base && address.checked_add(len).is_some_and(|end| end <= self.brk())
  }

  unsafe fn load(
    &self,
    address: usize,
  ) -> BlockHeader {
    BlockHeader::new(self.read_word(address + WORD), self.read_word(address))
  }

  unsafe fn store(
    &mut self,
    address: usize,
    header: BlockHeader,
  ) {
    self.write_word(address, header.next);
    self.write_word(address + WORD, header.size);
  }

  unsafe fn fill(
    &mut self,
    address: usize,
    value: u8,
    count: usize,
  ) {
    let start = self.offset(address, count);
    self.bytes[start..start + count].fill(value);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extend_returns_old_break() {
    let mut arena = SimArena::new();

    assert_eq!(arena.extend(16), Ok(DEFAULT_BASE));
    assert_eq!(arena.extend(24), Ok(DEFAULT_BASE + 16));
    assert_eq!(arena.brk(), DEFAULT_BASE + 40);
    assert_eq!(arena.len(), 40);
  }

  #[test]
  fn test_extend_past_limit() {
    let mut arena = SimArena::new().with_limit(32);

    assert_eq!(arena.extend(32), Ok(DEFAULT_BASE));
    assert_eq!(arena.extend(1), Err(HeapError::OutOfMemory { requested_bytes: 1 }));
    assert_eq!(arena.len(), 32);
  }

  #[test]
  fn test_extend_past_32_bit_address_space() {
    let mut arena = SimArena::with_base(0xFFFF_FFF0);

    assert_eq!(arena.extend(16), Ok(0xFFFF_FFF0));
    assert!(arena.extend(8).is_err());
  }

  #[test]
  fn test_header_layout() {
    let mut arena = SimArena::new();
    let address = arena.extend(16).unwrap();

    unsafe {
      arena.store(address, BlockHeader::new(3, 0x1004_0040));

      assert_eq!(arena.load(address), BlockHeader::new(3, 0x1004_0040));
    }

    assert_eq!(arena.read_bytes(address, 8), &[0x40u8, 0x00, 0x04, 0x10, 0x03, 0x00, 0x00, 0x00]);
  }

  #[test]
  fn test_fill_and_contains() {
    let mut arena = SimArena::new();
    let address = arena.extend(8).unwrap();

    unsafe { arena.fill(address + 2, 0xAB, 5) };

    assert_eq!(arena.read_bytes(address, 8), &[0u8, 0, 0xAB, 0xAB, 0xAB, 0xAB, 0xAB, 0]);
    assert!(arena.contains(address, 8));
    assert!(!arena.contains(address, 9));
    assert!(!arena.contains(address - 1, 1));
  }

  #[test]
  #[should_panic(expected = "outside arena")]
  fn test_write_out_of_bounds() {
    let mut arena = SimArena::new();
    arena.extend(8).unwrap();

    arena.write_bytes(DEFAULT_BASE + 6, &[1, 2, 3]);
  }

  #[test]
  #[should_panic(expected = "reserved")]
  fn test_zero_base_rejected() {
    SimArena::with_base(0);
  }
}
