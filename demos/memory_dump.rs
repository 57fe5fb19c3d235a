use kralloc::{Arena, Heap, HeapConfig, SimArena};

/// Formats `bytes` as hex, with a space every `group` bytes.
fn hex(
  bytes: &[u8],
  group: usize,
) -> String {
  bytes
    .chunks(group)
    .map(|chunk| chunk.iter().map(|byte| format!("{:02x}", byte)).collect::<String>())
    .collect::<Vec<_>>()
    .join(" ")
}

fn main() {
  env_logger::init();

  // Extend the arena on every call to allocate so both blocks sit back to
  // back at the start of the heap.
  let config = HeapConfig::new().min_extension_units(0);
  let mut heap = Heap::with_config(SimArena::new(), config);

  // size = ((5 + 8 - 1) / 8) + 1 = 2 units => 16 bytes
  println!("allocate a and fill with 0xAB");
  let mem_a = heap.allocate_or_abort(5);
  unsafe { heap.fill(mem_a, 0xAB, 5) };

  // size = ((10 + 8 - 1) / 8) + 1 = 3 units => 24 bytes
  println!("allocate b and fill with 0xCD");
  let mem_b = heap.allocate_or_abort(10);
  unsafe { heap.fill(mem_b, 0xCD, 10) };

  // heap start [[H][a][3 bytes slack][H][b][6 bytes slack]] break
  println!("header size = {} bytes", SimArena::UNIT);
  println!("mem_a = {:#x}", mem_a);
  println!("mem_b = {:#x}", mem_b);

  let data_start = mem_a - SimArena::UNIT;
  let data_length = 16 + 24;
  let arena = heap.arena();

  println!("heap memory [{:#x}, {:#x}):", data_start, arena.brk());
  println!("{}", hex(arena.read_bytes(data_start, data_length), 4));

  unsafe {
    heap.deallocate(mem_a);
    heap.deallocate(mem_b);
  }

  println!("free list after releasing both: {:x?}", heap.free_blocks());
}
