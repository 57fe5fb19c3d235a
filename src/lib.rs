//! # kralloc - A Free-List Memory Allocator
//!
//! This crate provides a classic **free-list allocator**: `malloc`/`free` over
//! a single arena that only ever grows, in the style popularised by K&R.
//!
//! ## Overview
//!
//! Free blocks are kept on a circular, singly-linked list sorted by address.
//! The list is threaded through the block headers themselves and anchored by a
//! permanent zero-size sentinel:
//!
//! ```text
//!   Arena:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │ ┌────┬──────┐ ┌────┬─────────────┐ ┌────┬────┐ ┌────┬────────────┐  │
//!   │ │ H  │ used │ │ H  │    free     │ │ H  │used│ │ H  │    free    │  │
//!   │ └────┴──────┘ └────┴─────────────┘ └────┴────┘ └────┴────────────┘  │
//!   │                  ▲        │                      ▲        │         │
//!   │                  │        └──────────────────────┘        │         │
//!   └──────────────────┼────────────────────────────────────────┼─────────┘
//!                      │                                        │
//!                 ┌──────────┐                                  │
//!                 │ sentinel │◀─────────────────────────────────┘
//!                 └──────────┘
//! ```
//!
//! - **allocate** searches next-fit from a cursor left by the previous call.
//!   An exact fit is unlinked; a bigger block gives up its *tail*.
//! - **deallocate** puts the block back in address order and merges it with
//!   any free neighbour, so no two free blocks are ever adjacent.
//! - When nothing fits, the arena is extended by at least
//!   [`HeapConfig::min_extension_units`] and the new space is freed into the
//!   list like any other block.
//!
//! ## Crate Structure
//!
//! ```text
//!   kralloc
//!   ├── align      - Rounding helpers (align_to!, units_for)
//!   ├── arena      - Arena trait: the heap-extension and memset primitives
//!   ├── block      - BlockHeader record
//!   ├── config     - HeapConfig
//!   ├── error      - HeapError
//!   ├── free_list  - Circular free list, next-fit search, coalescing
//!   ├── heap       - Heap: allocate / deallocate
//!   ├── sbrk       - SbrkArena over the process break (unix)
//!   └── sim        - SimArena, a byte buffer with 32-bit addresses
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use kralloc::{Heap, HeapConfig, SimArena};
//!
//! let mut heap = Heap::with_config(SimArena::new(), HeapConfig::new().min_extension_units(0));
//!
//! // 5 bytes round up to one unit of payload plus one unit of header.
//! let a = heap.allocate(5).unwrap();
//! let b = heap.allocate(10).unwrap();
//! assert_eq!(b - a, 16);
//!
//! unsafe {
//!   heap.fill(a, 0xAB, 5);
//!   heap.deallocate(a);
//!   heap.deallocate(b);
//! }
//!
//! assert_eq!(heap.free_blocks().len(), 1);
//! ```
//!
//! ## Block Layout
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ next (if free)  │  │   (size - 1) header units      │
//!   │  │ size (units)    │  │                                │
//!   │  └─────────────────┘  │                                │
//!   │      1 unit           │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Address returned to the caller
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization; a `Heap` must not be
//!   shared between threads.
//! - **Monotonic arena**: memory is never returned to the environment.
//! - **No misuse detection**: freeing a foreign or already freed address is
//!   undefined behaviour. Debug builds catch the common cases.

pub mod align;
pub mod arena;
mod block;
pub mod config;
pub mod error;
mod free_list;
pub mod heap;
#[cfg(unix)]
pub mod sbrk;
pub mod sim;

pub use arena::Arena;
pub use block::BlockHeader;
pub use config::{DEFAULT_MIN_EXTENSION_UNITS, HeapConfig};
pub use error::HeapError;
pub use free_list::SENTINEL;
pub use heap::{Heap, HeapStats};
#[cfg(unix)]
pub use sbrk::{SbrkArena, program_break};
pub use sim::SimArena;
