//! ONERA codec data types and configuration

use crate::image_pipeline::common::error::{OneraError, Result};
use crate::image_pipeline::onera::layout;

/// Pixel encodings an ONERA header can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    /// Complex pixel, interleaved (real, imaginary) 4-byte floats
    ComplexFloat32,
}

impl PixelEncoding {
    pub fn token(self) -> &'static str {
        match self {
            PixelEncoding::ComplexFloat32 => "cmplx_real_4",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "cmplx_real_4" => Some(PixelEncoding::ComplexFloat32),
            _ => None,
        }
    }

    pub fn components_per_pixel(self) -> u32 {
        match self {
            PixelEncoding::ComplexFloat32 => 2,
        }
    }

    pub fn bytes_per_component(self) -> u32 {
        match self {
            PixelEncoding::ComplexFloat32 => 4,
        }
    }
}

/// Image dimensions and pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterGeometry {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// Components per pixel (2 for complex)
    pub components_per_pixel: u32,
    /// Bytes per component (4 for float)
    pub bytes_per_component: u32,
}

impl RasterGeometry {
    pub fn new(width: u32, height: u32, encoding: PixelEncoding) -> Self {
        Self {
            width,
            height,
            components_per_pixel: encoding.components_per_pixel(),
            bytes_per_component: encoding.bytes_per_component(),
        }
    }

    pub fn complex_f32(width: u32, height: u32) -> Self {
        Self::new(width, height, PixelEncoding::ComplexFloat32)
    }

    pub fn row_byte_stride(&self) -> u64 {
        layout::row_byte_stride(self.width, self.bytes_per_component, self.components_per_pixel)
    }

    pub fn pixel_byte_len(&self) -> usize {
        (self.components_per_pixel * self.bytes_per_component) as usize
    }

    /// Number of components in the whole image
    pub fn component_count(&self) -> usize {
        self.width as usize * self.height as usize * self.components_per_pixel as usize
    }

    pub fn full_region(&self) -> Region {
        Region::new(0, 0, self.height, self.width)
    }
}

/// Rectangular sub-area of the raster used for one I/O call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub row_offset: u32,
    pub col_offset: u32,
    pub row_count: u32,
    pub col_count: u32,
}

impl Region {
    pub fn new(row_offset: u32, col_offset: u32, row_count: u32, col_count: u32) -> Self {
        Self {
            row_offset,
            col_offset,
            row_count,
            col_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.col_count == 0
    }

    pub fn spans(&self, geometry: &RasterGeometry) -> bool {
        self.row_count == geometry.height && self.col_count == geometry.width
    }

    pub fn component_count(&self, geometry: &RasterGeometry) -> usize {
        self.row_count as usize * self.col_count as usize * geometry.components_per_pixel as usize
    }

    /// Bytes transferred per row of this region
    pub fn row_byte_len(&self, geometry: &RasterGeometry) -> usize {
        self.col_count as usize * geometry.pixel_byte_len()
    }

    /// Fails with `RegionOutOfBounds` unless the region lies inside `geometry`
    pub fn check_within(&self, geometry: &RasterGeometry) -> Result<()> {
        let rows_end = self.row_offset as u64 + self.row_count as u64;
        let cols_end = self.col_offset as u64 + self.col_count as u64;

        if rows_end > geometry.height as u64 || cols_end > geometry.width as u64 {
            return Err(OneraError::RegionOutOfBounds {
                row_offset: self.row_offset,
                col_offset: self.col_offset,
                row_count: self.row_count,
                col_count: self.col_count,
                width: geometry.width,
                height: geometry.height,
            });
        }

        Ok(())
    }
}

/// Configuration for an ONERA codec instance
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Longest accepted header text line, in bytes
    pub header_line_limit: usize,
    /// Whether to parse the header's key/value lines and compare the
    /// declared sizes with the data file
    pub cross_check_header: bool,
    /// Whether `finish` forces written data to disk
    pub sync_on_finish: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            header_line_limit: 1024,
            cross_check_header: true,
            sync_on_finish: false,
        }
    }
}

impl CodecConfig {
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }
}

/// Builder for CodecConfig
#[derive(Default)]
pub struct CodecConfigBuilder {
    header_line_limit: Option<usize>,
    cross_check_header: Option<bool>,
    sync_on_finish: Option<bool>,
}

impl CodecConfigBuilder {
    pub fn header_line_limit(mut self, limit: usize) -> Self {
        self.header_line_limit = Some(limit);
        self
    }

    pub fn cross_check_header(mut self, enable: bool) -> Self {
        self.cross_check_header = Some(enable);
        self
    }

    pub fn sync_on_finish(mut self, enable: bool) -> Self {
        self.sync_on_finish = Some(enable);
        self
    }

    pub fn build(self) -> CodecConfig {
        let default = CodecConfig::default();
        CodecConfig {
            header_line_limit: self.header_line_limit.unwrap_or(default.header_line_limit),
            cross_check_header: self.cross_check_header.unwrap_or(default.cross_check_header),
            sync_on_finish: self.sync_on_finish.unwrap_or(default.sync_on_finish),
        }
    }
}
