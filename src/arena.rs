use crate::{block::BlockHeader, error::HeapError};

/// Backing memory for a [`Heap`](crate::Heap).
///
/// An arena only ever grows. Every address it hands out stays valid for the
/// arena's lifetime, and no address it returns is ever `0`; that value is
/// reserved for the free-list sentinel.
pub trait Arena {
  /// Byte footprint of one [`BlockHeader`]. All block sizes are counted in
  /// multiples of this.
  const UNIT: usize;

  /// Grows the arena by `bytes` and returns the address of the first new
  /// byte. Successive calls never return a lower address.
  fn extend(
    &mut self,
    bytes: usize,
  ) -> Result<usize, HeapError>;

  /// Whether `[address, address + len)` lies inside memory previously
  /// returned by [`extend`](Arena::extend).
  fn contains(
    &self,
    address: usize,
    len: usize,
  ) -> bool;

  /// Reads the header stored at `address`.
  ///
  /// # Safety
  ///
  /// `address` must point at `UNIT` bytes of this arena that hold a header
  /// previously written with [`store`](Arena::store).
  unsafe fn load(
    &self,
    address: usize,
  ) -> BlockHeader;

  /// Writes `header` at `address`.
  ///
  /// # Safety
  ///
  /// `address` must point at `UNIT` bytes inside this arena.
  unsafe fn store(
    &mut self,
    address: usize,
    header: BlockHeader,
  );

  /// Byte-wise memset of `count` bytes starting at `address`.
  ///
  /// # Safety
  ///
  /// `[address, address + count)` must lie inside this arena.
  unsafe fn fill(
    &mut self,
    address: usize,
    value: u8,
    count: usize,
  );
}
