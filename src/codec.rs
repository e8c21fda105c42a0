//! Big-endian primitive decoders and encoders.
//!
//! Integers are composed byte by byte with shifts, most significant byte
//! first, so the result never depends on host byte order. Floats are the
//! same 64-bit composition reinterpreted with [`f64::from_bits`].
//!
//! Decoders return `None` when `offset + width` runs past the buffer; the
//! header and record decoders turn that into a typed truncation error.

/// Width in bytes of a 32-bit field.
pub const U32_WIDTH: usize = 4;

/// Width in bytes of a 64-bit integer field.
pub const U64_WIDTH: usize = 8;

/// Width in bytes of a 64-bit float field.
pub const F64_WIDTH: usize = 8;

/// Returns the `width` bytes starting at `offset`, or `None` if out of range.
fn window(buf: &[u8], offset: usize, width: usize) -> Option<&[u8]> {
    let end = offset.checked_add(width)?;
    buf.get(offset..end)
}

fn compose(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Decodes 4 big-endian bytes at `offset` into a signed 32-bit integer.
///
/// The log format documents this field as unsigned, but the value is stored
/// signed: inputs with the high bit set come back negative.
///
/// # Examples
///
/// ```
/// use txnlog::codec::decode_u32be;
///
/// assert_eq!(decode_u32be(&[0x00, 0x00, 0x03, 0xe8], 0), Some(1000));
/// assert_eq!(decode_u32be(&[0xff, 0xff, 0xff, 0xff], 0), Some(-1));
/// assert_eq!(decode_u32be(&[0x00, 0x01], 0), None);
/// ```
pub fn decode_u32be(buf: &[u8], offset: usize) -> Option<i32> {
    let bits = compose(window(buf, offset, U32_WIDTH)?) as u32;
    Some(bits as i32)
}

/// Decodes 8 big-endian bytes at `offset` into an unsigned 64-bit integer.
pub fn decode_u64be(buf: &[u8], offset: usize) -> Option<u64> {
    Some(compose(window(buf, offset, U64_WIDTH)?))
}

/// Decodes 8 big-endian bytes at `offset` as an IEEE-754 double.
///
/// The bit pattern is passed through unchanged, NaN and infinities included.
pub fn decode_f64be(buf: &[u8], offset: usize) -> Option<f64> {
    decode_u64be(buf, offset).map(f64::from_bits)
}

/// Appends `value` as 4 big-endian bytes.
pub fn put_u32be(out: &mut Vec<u8>, value: u32) {
    out.extend((0..U32_WIDTH).rev().map(|i| (value >> (i * 8)) as u8));
}

/// Appends `value` as 8 big-endian bytes.
pub fn put_u64be(out: &mut Vec<u8>, value: u64) {
    out.extend((0..U64_WIDTH).rev().map(|i| (value >> (i * 8)) as u8));
}

/// Appends the bit pattern of `value` as 8 big-endian bytes.
pub fn put_f64be(out: &mut Vec<u8>, value: f64) {
    put_u64be(out, value.to_bits());
}
