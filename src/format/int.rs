// Sign-magnitude 64-bit integers as written by bsdiff 4.x.
//
// The magnitude occupies the low 63 bits, little-endian; bit 7 of the last
// byte carries the sign. This is not two's complement: -1 encodes as
// 01 00 00 00 00 00 00 80.

/// Encoded width of every integer field.
pub const INT_LEN: usize = 8;

const SIGN_BIT: u8 = 0x80;

/// Encode `value` into `buf`.
#[inline]
pub fn encode_i64(value: i64, buf: &mut [u8; INT_LEN]) {
    *buf = value.unsigned_abs().to_le_bytes();
    if value < 0 {
        buf[INT_LEN - 1] |= SIGN_BIT;
    }
}

/// Decode an integer previously written by [`encode_i64`].
///
/// A set sign bit with a zero magnitude decodes as 0.
#[inline]
pub fn decode_i64(buf: &[u8; INT_LEN]) -> i64 {
    let mut magnitude = *buf;
    magnitude[INT_LEN - 1] &= !SIGN_BIT;
    let value = u64::from_le_bytes(magnitude) as i64;
    if buf[INT_LEN - 1] & SIGN_BIT != 0 {
        -value
    } else {
        value
    }
}
