//! Bit helpers for 16-bit register values.

/// Highest valid bit index of a register.
pub const MAX_BIT: u8 = 15;

/// Returns the bit at `index`. Indices above 15 read as `false`.
pub fn read_bit(value: u16, index: u8) -> bool {
    index <= MAX_BIT && (value >> index) & 0x01 != 0
}

/// Mask covering bits `start..=end`, or `None` if the range is not within 0..=15.
pub fn bit_range_mask(start: u8, end: u8) -> Option<u16> {
    if start > end || end > MAX_BIT {
        return None;
    }
    let width = u32::from(end - start + 1);
    Some((((1u32 << width) - 1) << start) as u16)
}

/// Extracts bits `start..=end` of `value`, right-aligned.
pub fn read_bit_range(value: u16, start: u8, end: u8) -> Option<u16> {
    bit_range_mask(start, end).map(|mask| (value & mask) >> start)
}

/// Replaces bits `start..=end` of `value` with `new_value`.
///
/// Bits of `new_value` that do not fit into the field are discarded, so the bits
/// outside the range are always preserved.
pub fn replace_bit_range(value: u16, start: u8, end: u8, new_value: u16) -> Option<u16> {
    bit_range_mask(start, end).map(|mask| replace_masked(value, mask, start, new_value))
}

/// Replaces the bits under `mask` with `new_value` shifted left by `start`.
pub fn replace_masked(value: u16, mask: u16, start: u8, new_value: u16) -> u16 {
    (value & !mask) | ((new_value << start) & mask)
}
