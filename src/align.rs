/// Rounds `value` up to the next multiple of `unit`.
///
/// `unit` does not need to be a power of two; header units on some targets
/// (e.g. a 12 byte record) are not.
///
/// # Examples
///
/// ```rust
/// use kralloc::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(0, 8), 0);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $unit:expr) => {
    (($value) + ($unit) - 1) / ($unit) * ($unit)
  };
}

/// Number of header units a request of `size` bytes occupies, header included.
///
/// `((size + unit - 1) / unit) + 1`: the payload rounded up to whole units
/// plus one unit for the header itself. Returns `None` on overflow.
///
/// ```rust
/// use kralloc::align::units_for;
///
/// assert_eq!(units_for(5, 8), Some(2));
/// assert_eq!(units_for(10, 8), Some(3));
/// assert_eq!(units_for(0, 8), Some(1));
/// ```
pub fn units_for(
  size: usize,
  unit: usize,
) -> Option<usize> {
  let payload = size.checked_add(unit - 1)? / unit;
  payload.checked_add(1)
}
