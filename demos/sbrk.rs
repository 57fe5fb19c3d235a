use std::{io::Read, mem};

use kralloc::{Heap, HeapConfig, SbrkArena, program_break};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap` or
/// `gdb`, or just to watch the program break move between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:#x}",
    label,
    std::process::id(),
    program_break(),
  );
}

fn print_alloc(
  size: usize,
  address: usize,
) {
  println!(
    "Allocated {} bytes, address = {:#x}, program break = {:#x}",
    size,
    address,
    program_break()
  );
}

fn main() {
  env_logger::init();

  // Small minimum extension so the break visibly moves a few times.
  let mut heap = Heap::with_config(SbrkArena::new(), HeapConfig::new().min_extension_units(64));

  print_program_break("start");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate space for a u32. The first call extends the arena by
  //    64 units and carves the block from the tail of that chunk.
  // --------------------------------------------------------------------
  let first = heap.allocate_or_abort(mem::size_of::<u32>());
  println!("\n[1] Allocate u32");
  print_alloc(mem::size_of::<u32>(), first);

  unsafe {
    let first_ptr = first as *mut u32;
    first_ptr.write(0xDEADBEEF);
    println!("[1] Value written to first = 0x{:X}", first_ptr.read());
  }

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 12 bytes and fill them. Comes from the same chunk, just
  //    below the first block.
  // --------------------------------------------------------------------
  let second = heap.allocate_or_abort(12);
  println!("\n[2] Allocate [u8; 12]");
  print_alloc(12, second);

  unsafe { heap.fill(second, 0xAB, 12) };
  println!("[2] Initialized second block with 0xAB");
  println!("[2] first - second = {} bytes", first - second);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Free the first block, then ask for something that fits in it.
  //    The freed block is reused instead of growing the arena.
  // --------------------------------------------------------------------
  unsafe { heap.deallocate(first) };
  println!("\n[3] Deallocated first at {:#x}", first);
  println!("[3] free list = {:x?}", heap.free_blocks());

  let third = heap.allocate_or_abort(2);
  print_alloc(2, third);
  println!(
    "[3] third == first? {}",
    if third == first {
      "Yes, it reused the freed block"
    } else {
      "No, it allocated somewhere else"
    }
  );

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) A 64 KiB request cannot be served from the chunk and grows the
  //    arena by exactly what it needs.
  // --------------------------------------------------------------------
  print_program_break("before large alloc");

  let big = heap.allocate_or_abort(64 * 1024);
  println!("\n[4] Allocate large 64 KiB block");
  print_alloc(64 * 1024, big);

  print_program_break("after large alloc");
  println!("[4] stats = {:?}", heap.stats());

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Free everything. The memory goes back on the free list, but the
  //    break never moves down.
  // --------------------------------------------------------------------
  unsafe {
    heap.deallocate(big);
    heap.deallocate(third);
    heap.deallocate(second);
  }

  println!("\n[5] free list = {:x?}", heap.free_blocks());
  print_program_break("end");
}
