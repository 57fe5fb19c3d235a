/// Smallest arena extension, in header units, requested when the free list
/// runs dry.
pub const DEFAULT_MIN_EXTENSION_UNITS: usize = 1024;

/// Tuning knobs for a [`Heap`](crate::Heap).
///
/// None of these affect correctness, only how often the arena is extended and
/// how much slack it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  pub min_extension_units: usize,
}

impl HeapConfig {
  pub const fn new() -> Self {
    Self {
      min_extension_units: DEFAULT_MIN_EXTENSION_UNITS,
    }
  }

  /// `0` extends the arena by exactly the units a request needs.
  pub const fn min_extension_units(
    mut self,
    units: usize,
  ) -> Self {
    self.min_extension_units = units;
    self
  }
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self::new()
  }
}
