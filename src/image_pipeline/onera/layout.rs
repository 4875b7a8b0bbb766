//! On-disk layout of an ONERA data file.
//!
//! ```text
//! offset 0                 magic number, i32 little-endian
//! offset 4                 header row of `row_byte_stride` bytes,
//!                          column count (i16 LE) at offset 6
//! offset 4 + stride        row 0
//! offset 4 + stride * 2    row 1
//! ...
//! ```
//!
//! Every offset used by the header writer, the header reader and the region
//! transfers is computed here and nowhere else.

use crate::image_pipeline::onera::types::RasterGeometry;

pub const MAGIC_NUMBER: i32 = 33_554_433;
pub const HEADER_LENGTH: u64 = 4;
pub const COLUMN_COUNT_OFFSET: u64 = HEADER_LENGTH + 2;

pub const HEADER_EXTENSION: &str = "ent";
pub const DATA_EXTENSION: &str = "dat";

/// Bytes occupied by one full image row.
pub const fn row_byte_stride(width: u32, bytes_per_component: u32, components_per_pixel: u32) -> u64 {
    width as u64 * bytes_per_component as u64 * components_per_pixel as u64
}

/// Magic number plus the binary header row.
pub const fn header_byte_length(row_stride: u64) -> u64 {
    HEADER_LENGTH + row_stride
}

/// Absolute file offset of pixel `(row, col)`.
pub fn pixel_offset(geometry: &RasterGeometry, row: u64, col: u64) -> u64 {
    let stride = geometry.row_byte_stride();
    header_byte_length(stride) + stride * row + geometry.pixel_byte_len() as u64 * col
}

/// Total size of a data file holding `geometry`.
pub fn data_file_len(geometry: &RasterGeometry) -> u64 {
    header_byte_length(geometry.row_byte_stride()) + geometry.row_byte_stride() * geometry.height as u64
}

/// Number of complete rows in a data file of `file_len` bytes.
///
/// Returns 0 when the file cannot even hold the header row.
pub fn rows_in_file(file_len: u64, row_stride: u64) -> u64 {
    if row_stride == 0 {
        return 0;
    }
    file_len
        .checked_sub(header_byte_length(row_stride))
        .map_or(0, |payload| payload / row_stride)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sample_offsets() {
        let geometry = RasterGeometry::complex_f32(4, 2);
        assert_eq!(geometry.row_byte_stride(), 32);
        assert_eq!(header_byte_length(32), 36);
        assert_eq!(pixel_offset(&geometry, 0, 0), 36);
        assert_eq!(pixel_offset(&geometry, 1, 0), 68);
        assert_eq!(pixel_offset(&geometry, 1, 3), 68 + 24);
        assert_eq!(data_file_len(&geometry), 4 + 32 * 3);
    }

    #[test]
    fn test_rows_in_file_inverts_data_file_len() {
        for (width, height) in [(1, 1), (4, 2), (17, 9), (512, 3)] {
            let geometry = RasterGeometry::complex_f32(width, height);
            let len = data_file_len(&geometry);
            assert_eq!(rows_in_file(len, geometry.row_byte_stride()), height as u64);
            // A trailing partial row is not counted.
            assert_eq!(rows_in_file(len - 1, geometry.row_byte_stride()), height as u64 - 1);
        }
    }

    #[test]
    fn test_rows_in_file_too_small() {
        assert_eq!(rows_in_file(0, 32), 0);
        assert_eq!(rows_in_file(35, 32), 0);
        assert_eq!(rows_in_file(1000, 0), 0);
    }
}
