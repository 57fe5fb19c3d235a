use thiserror::Error;

/// Failures surfaced by [`Heap::allocate`](crate::Heap::allocate).
///
/// Both variants mean the same thing to a caller: the request can never be
/// satisfied. The free list is left untouched when either is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
  #[error("arena could not be extended by {requested_bytes} bytes")]
  OutOfMemory { requested_bytes: usize },

  #[error("allocation of {size} bytes overflows the address space")]
  SizeOverflow { size: usize },
}
