//! Conversion between native and on-disk (little-endian) byte order.
//!
//! Every swap is an involution: applying it twice gives back the input, so
//! the same function serves both the read path (disk to native) and the
//! write path (native to disk). On a little-endian host all of them are no-ops.

use byteorder::LittleEndian;

/// Byte order of every multi-byte value stored in an ONERA data file.
pub type DiskOrder = LittleEndian;

pub fn swap16(value: u16) -> u16 {
    u16::from_le(value)
}

pub fn swap32(value: u32) -> u32 {
    u32::from_le(value)
}

pub fn swap64(value: u64) -> u64 {
    u64::from_le(value)
}

pub fn swap_f32(value: f32) -> f32 {
    f32::from_bits(swap32(value.to_bits()))
}

/// Width of one element in a buffer passed to [`swap_buffer_in_place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementWidth {
    Two,
    Four,
    Eight,
}

impl ElementWidth {
    pub fn bytes(self) -> usize {
        match self {
            ElementWidth::Two => 2,
            ElementWidth::Four => 4,
            ElementWidth::Eight => 8,
        }
    }
}

/// Swaps the first `count` elements of `buffer` in place.
///
/// Elements past the end of the buffer and a trailing partial element are
/// left untouched.
pub fn swap_buffer_in_place(buffer: &mut [u8], width: ElementWidth, count: usize) {
    if cfg!(target_endian = "little") {
        return;
    }

    for chunk in buffer.chunks_exact_mut(width.bytes()).take(count) {
        match width {
            ElementWidth::Two => {
                let v = u16::from_ne_bytes([chunk[0], chunk[1]]);
                chunk.copy_from_slice(&swap16(v).to_ne_bytes());
            }
            ElementWidth::Four => {
                let v = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                chunk.copy_from_slice(&swap32(v).to_ne_bytes());
            }
            ElementWidth::Eight => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(chunk);
                chunk.copy_from_slice(&swap64(u64::from_ne_bytes(raw)).to_ne_bytes());
            }
        }
    }
}

/// Decodes native-order 4-byte components into `f32` values.
pub(crate) fn f32_from_native_bytes(bytes: &[u8], out: &mut [f32]) {
    for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        *dst = f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

pub(crate) fn f32_to_native_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ByteOrder;

    #[test]
    fn test_scalar_swaps_produce_little_endian_layout() {
        let v: u16 = 0x0102;
        assert_eq!(swap16(v).to_ne_bytes(), v.to_le_bytes());

        let v: u32 = 0x0102_0304;
        assert_eq!(swap32(v).to_ne_bytes(), v.to_le_bytes());

        let v: u64 = 0x0102_0304_0506_0708;
        assert_eq!(swap64(v).to_ne_bytes(), v.to_le_bytes());

        let f = -1234.5f32;
        assert_eq!(swap_f32(f).to_bits().to_ne_bytes(), f.to_le_bytes());
    }

    #[test]
    fn test_swaps_are_involutions() {
        assert_eq!(swap16(swap16(0xBEEF)), 0xBEEF);
        assert_eq!(swap32(swap32(33_554_433)), 33_554_433);
        assert_eq!(swap_f32(swap_f32(3.25)), 3.25);
    }

    #[test]
    fn test_buffer_swap_matches_disk_order() {
        let values = [1.5f32, -2.0, 1.0e-3, f32::MAX];
        let mut buffer = f32_to_native_bytes(&values);
        swap_buffer_in_place(&mut buffer, ElementWidth::Four, values.len());

        let mut decoded = [0f32; 4];
        DiskOrder::read_f32_into(&buffer, &mut decoded);
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_buffer_swap_respects_count() {
        let mut buffer = vec![1u8, 2, 3, 4, 5, 6];
        swap_buffer_in_place(&mut buffer, ElementWidth::Two, 1);
        // The untouched tail is identical on every host.
        assert_eq!(&buffer[2..], &[3, 4, 5, 6]);
    }

    #[test]
    fn test_native_byte_helpers_round_trip() {
        let values = [0.0f32, 1.0, -7.25];
        let bytes = f32_to_native_bytes(&values);
        assert_eq!(bytes.len(), 12);

        let mut out = [0f32; 3];
        f32_from_native_bytes(&bytes, &mut out);
        assert_eq!(out, values);
    }
}
