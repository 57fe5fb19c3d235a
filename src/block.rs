/// Metadata record at the start of every block, free or allocated.
///
/// `size` counts header units spanned by the block, this header included.
/// `next` is the successor in the free list and is only meaningful while the
/// block is free. The field order matches the in-memory layout used by
/// arenas that store the record natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct BlockHeader {
  pub size: usize,
  pub next: usize,
}

impl BlockHeader {
  pub fn new(
    size: usize,
    next: usize,
  ) -> Self {
    Self { size, next }
  }

  /// Address one past the last byte of the block starting at `address`.
  pub fn end(
    &self,
    address: usize,
    unit: usize,
  ) -> usize {
    address + self.size * unit
  }
}
