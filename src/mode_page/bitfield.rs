//! Big-endian bit-field access
//!
//! Fields are addressed the way the SCSI standards draw them: a byte offset,
//! the bit position (7 = MSB) of the field's most significant bit within that
//! byte, and a width. Wider fields continue into the following bytes.

/// Widest field the model supports
pub const MAX_FIELD_BITS: u8 = 32;

/// Number of bytes touched by a field starting at `start_bit`.
pub fn field_span(start_bit: u8, num_bits: u8) -> usize {
    let first = start_bit as usize + 1;
    let num_bits = num_bits as usize;
    if num_bits <= first {
        1
    } else {
        1 + (num_bits - first + 7) / 8
    }
}

/// Value with the low `num_bits` bits set.
pub fn all_ones(num_bits: u8) -> u32 {
    debug_assert!(num_bits >= 1 && num_bits <= MAX_FIELD_BITS);
    if num_bits >= 32 {
        u32::MAX
    } else {
        (1u32 << num_bits) - 1
    }
}

/// Number of bits between the field's LSB and the end of the last byte it touches.
fn trailing_bits(start_bit: u8, num_bits: u8, span: usize) -> u32 {
    (span * 8) as u32 - (7 - start_bit as u32) - num_bits as u32
}

/// Read an unsigned field. The caller guarantees `buf` covers
/// `start_byte + field_span(start_bit, num_bits)` bytes.
pub fn read_field(buf: &[u8], start_byte: usize, start_bit: u8, num_bits: u8) -> u32 {
    debug_assert!(start_bit <= 7);
    debug_assert!(num_bits >= 1 && num_bits <= MAX_FIELD_BITS);

    let span = field_span(start_bit, num_bits);
    let window = buf[start_byte..start_byte + span]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64);

    let shift = trailing_bits(start_bit, num_bits, span);
    ((window >> shift) & all_ones(num_bits) as u64) as u32
}

/// Write the low `num_bits` bits of `value`, leaving every other bit of `buf`
/// untouched.
pub fn write_field(buf: &mut [u8], start_byte: usize, start_bit: u8, num_bits: u8, value: u32) {
    debug_assert!(start_bit <= 7);
    debug_assert!(num_bits >= 1 && num_bits <= MAX_FIELD_BITS);

    let span = field_span(start_bit, num_bits);
    let shift = trailing_bits(start_bit, num_bits, span);
    let mask = (all_ones(num_bits) as u64) << shift;
    let bits = ((value & all_ones(num_bits)) as u64) << shift;

    for (i, byte) in buf[start_byte..start_byte + span].iter_mut().enumerate() {
        let byte_shift = ((span - 1 - i) * 8) as u32;
        let byte_mask = ((mask >> byte_shift) & 0xFF) as u8;
        let byte_bits = ((bits >> byte_shift) & 0xFF) as u8;
        *byte = (*byte & !byte_mask) | byte_bits;
    }
}

/// Value as shown to the user: all-ones in a 16 or 32 bit field is `-1`.
pub fn to_display(raw: u32, num_bits: u8) -> i64 {
    if (num_bits == 16 || num_bits == 32) && raw == all_ones(num_bits) {
        -1
    } else {
        raw as i64
    }
}
