//! Seek-based transfer of one rectangular region to and from a data file.
//!
//! Only the rows of the region are touched, so a caller can stream an image
//! far larger than memory one strip or tile at a time. Buffers handed in and
//! out are row-major, native byte order, with the components of each pixel
//! interleaved.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::trace;

use crate::image_pipeline::byte_order::{self, ElementWidth};
use crate::image_pipeline::common::error::{OneraError, Result};
use crate::image_pipeline::onera::layout;
use crate::image_pipeline::onera::types::{RasterGeometry, Region};

/// Reads `region` into a native-order byte buffer.
///
/// The region must already have been checked against `geometry`.
pub fn read_region_bytes<R>(source: &mut R, geometry: &RasterGeometry, region: &Region) -> Result<Vec<u8>>
where
    R: Read + Seek,
{
    let row_len = region.row_byte_len(geometry);
    let mut scratch = vec![0u8; row_len * region.row_count as usize];
    if region.is_empty() {
        return Ok(scratch);
    }

    for (i, row_bytes) in scratch.chunks_exact_mut(row_len).enumerate() {
        let row = region.row_offset as u64 + i as u64;
        let offset = layout::pixel_offset(geometry, row, region.col_offset as u64);

        source.seek(SeekFrom::Start(offset))?;
        let got = read_up_to(source, row_bytes)?;
        if got != row_len {
            return Err(OneraError::ShortRead {
                row,
                expected: row_len,
                actual: got,
            });
        }
        trace!(row, offset, "Read region row");
    }

    let count = scratch.len() / geometry.bytes_per_component as usize;
    byte_order::swap_buffer_in_place(&mut scratch, component_width(geometry)?, count);
    Ok(scratch)
}

/// Reads `region` into `out`, which must hold exactly the region's components.
pub fn read_region_into<R>(source: &mut R, geometry: &RasterGeometry, region: &Region, out: &mut [f32]) -> Result<()>
where
    R: Read + Seek,
{
    let expected = region.component_count(geometry);
    if out.len() != expected {
        return Err(OneraError::BufferSize {
            expected,
            actual: out.len(),
        });
    }

    let bytes = read_region_bytes(source, geometry, region)?;
    byte_order::f32_from_native_bytes(&bytes, out);
    Ok(())
}

/// Writes a native-order byte buffer covering `region`.
///
/// The region must already have been checked against `geometry`.
pub fn write_region_bytes<W>(sink: &mut W, geometry: &RasterGeometry, region: &Region, data: &[u8]) -> Result<()>
where
    W: Write + Seek,
{
    let row_len = region.row_byte_len(geometry);
    let expected = row_len * region.row_count as usize;
    if data.len() != expected {
        let per_component = geometry.bytes_per_component as usize;
        return Err(OneraError::BufferSize {
            expected: expected / per_component,
            actual: data.len() / per_component,
        });
    }
    if region.is_empty() {
        return Ok(());
    }

    let mut scratch = data.to_vec();
    let count = scratch.len() / geometry.bytes_per_component as usize;
    byte_order::swap_buffer_in_place(&mut scratch, component_width(geometry)?, count);

    for (i, row_bytes) in scratch.chunks_exact(row_len).enumerate() {
        let row = region.row_offset as u64 + i as u64;
        let offset = layout::pixel_offset(geometry, row, region.col_offset as u64);

        sink.seek(SeekFrom::Start(offset))?;
        sink.write_all(row_bytes)?;
        trace!(row, offset, "Wrote region row");
    }

    sink.flush()?;
    Ok(())
}

/// Writes `data`, which must hold exactly the region's components.
pub fn write_region<W>(sink: &mut W, geometry: &RasterGeometry, region: &Region, data: &[f32]) -> Result<()>
where
    W: Write + Seek,
{
    let expected = region.component_count(geometry);
    if data.len() != expected {
        return Err(OneraError::BufferSize {
            expected,
            actual: data.len(),
        });
    }

    write_region_bytes(sink, geometry, region, &byte_order::f32_to_native_bytes(data))
}

fn component_width(geometry: &RasterGeometry) -> Result<ElementWidth> {
    match geometry.bytes_per_component {
        2 => Ok(ElementWidth::Two),
        4 => Ok(ElementWidth::Four),
        8 => Ok(ElementWidth::Eight),
        other => Err(OneraError::Format(format!(
            "unsupported component size of {} bytes",
            other
        ))),
    }
}

/// Like `read_exact`, but reports how much was read instead of failing at EOF.
fn read_up_to<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::onera::header::write_header_to;
    use std::io::Cursor;

    fn blank_image(geometry: &RasterGeometry) -> Cursor<Vec<u8>> {
        let mut data = Cursor::new(Vec::new());
        write_header_to(&mut Vec::new(), &mut data, geometry, "t.dat").unwrap();
        data
    }

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32 * 0.5 - 3.0).collect()
    }

    #[test]
    fn test_scalar_sample_placement() {
        let geometry = RasterGeometry::complex_f32(4, 2);
        let mut data = blank_image(&geometry);
        let pixels = ramp(16);

        write_region(&mut data, &geometry, &geometry.full_region(), &pixels).unwrap();
        let bytes = data.into_inner();

        assert_eq!(bytes.len(), 100);
        assert_eq!(&bytes[36..40], &pixels[0].to_le_bytes());
        assert_eq!(&bytes[64..68], &pixels[7].to_le_bytes());
        assert_eq!(&bytes[68..72], &pixels[8].to_le_bytes());
        assert_eq!(&bytes[96..100], &pixels[15].to_le_bytes());
        // The column count survives the pixel write.
        assert_eq!(&bytes[6..8], &4i16.to_le_bytes());
    }

    #[test]
    fn test_sub_region_read() {
        let geometry = RasterGeometry::complex_f32(5, 4);
        let mut data = blank_image(&geometry);
        let pixels = ramp(geometry.component_count());
        write_region(&mut data, &geometry, &geometry.full_region(), &pixels).unwrap();

        let region = Region::new(1, 2, 2, 3);
        let mut out = vec![0f32; region.component_count(&geometry)];
        read_region_into(&mut data, &geometry, &region, &mut out).unwrap();

        let mut expected = Vec::new();
        for row in 1..3 {
            let start = (row * 5 + 2) * 2;
            expected.extend_from_slice(&pixels[start..start + 6]);
        }
        assert_eq!(out, expected);
    }

    #[test]
    fn test_sub_region_write_leaves_rest_untouched() {
        let geometry = RasterGeometry::complex_f32(3, 3);
        let mut data = blank_image(&geometry);

        let region = Region::new(1, 1, 1, 2);
        write_region(&mut data, &geometry, &region, &[1.0, 2.0, 3.0, 4.0]).unwrap();

        let mut out = vec![0f32; geometry.component_count()];
        read_region_into(&mut data, &geometry, &geometry.full_region(), &mut out).unwrap();
        let mut expected = vec![0f32; 18];
        expected[8..12].copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_short_read() {
        let geometry = RasterGeometry::complex_f32(4, 3);
        let data = blank_image(&geometry).into_inner();
        // Drop the last row and a half.
        let truncated = data[..data.len() - 48].to_vec();

        let err = read_region_bytes(&mut Cursor::new(truncated), &geometry, &geometry.full_region())
            .unwrap_err();
        assert!(matches!(
            err,
            OneraError::ShortRead { row: 1, expected: 32, actual: 16 }
        ));
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let geometry = RasterGeometry::complex_f32(2, 2);
        let mut data = blank_image(&geometry);

        let err = write_region(&mut data, &geometry, &geometry.full_region(), &[0.0; 7]).unwrap_err();
        assert!(matches!(err, OneraError::BufferSize { expected: 8, actual: 7 }));

        let mut out = [0f32; 9];
        let err = read_region_into(&mut data, &geometry, &geometry.full_region(), &mut out)
            .unwrap_err();
        assert!(matches!(err, OneraError::BufferSize { expected: 8, actual: 9 }));
    }

    #[test]
    fn test_empty_region() {
        let geometry = RasterGeometry::complex_f32(2, 2);
        let mut data = blank_image(&geometry);

        let bytes = read_region_bytes(&mut data, &geometry, &Region::new(1, 1, 0, 1)).unwrap();
        assert!(bytes.is_empty());
        write_region(&mut data, &geometry, &Region::new(0, 0, 2, 0), &[]).unwrap();
    }

    #[test]
    fn test_native_bytes_round_trip() {
        let geometry = RasterGeometry::complex_f32(2, 1);
        let mut data = blank_image(&geometry);
        let native = byte_order::f32_to_native_bytes(&[1.0, -1.0, 0.25, 8.0]);

        write_region_bytes(&mut data, &geometry, &geometry.full_region(), &native).unwrap();
        let back = read_region_bytes(&mut data, &geometry, &geometry.full_region()).unwrap();
        assert_eq!(back, native);
    }
}
