//! Format dispatch
//!
//! Each supported file format is one entry of a fixed table, keyed by the
//! pixel encoding and on-disk layout it handles. Callers either look an
//! entry up by kind or let the table probe a path.

use std::path::Path;

use tracing::debug;

use crate::image_pipeline::common::error::{OneraError, Result};
use crate::image_pipeline::onera::{self, CodecConfig, OneraImageIO, PixelEncoding, RasterGeometry, Region};

/// How pixel rows are arranged on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// `.ent` text header plus `.dat` file of interleaved row-major pixels
    OneraLook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatKind {
    pub encoding: PixelEncoding,
    pub layout: LayoutKind,
}

impl FormatKind {
    pub const ONERA_COMPLEX_F32: FormatKind = FormatKind {
        encoding: PixelEncoding::ComplexFloat32,
        layout: LayoutKind::OneraLook,
    };
}

/// Region-based access to one raster file
pub trait RasterImageIO {
    fn format(&self) -> FormatKind;
    fn read_image_information(&mut self) -> Result<RasterGeometry>;
    fn set_geometry(&mut self, geometry: RasterGeometry) -> Result<()>;
    fn read_region(&mut self, region: &Region) -> Result<Vec<f32>>;
    fn write_region(&mut self, region: &Region, data: &[f32]) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

impl RasterImageIO for OneraImageIO {
    fn format(&self) -> FormatKind {
        FormatKind::ONERA_COMPLEX_F32
    }

    fn read_image_information(&mut self) -> Result<RasterGeometry> {
        OneraImageIO::read_image_information(self)
    }

    fn set_geometry(&mut self, geometry: RasterGeometry) -> Result<()> {
        OneraImageIO::set_geometry(self, geometry)
    }

    fn read_region(&mut self, region: &Region) -> Result<Vec<f32>> {
        OneraImageIO::read_region(self, region)
    }

    fn write_region(&mut self, region: &Region, data: &[f32]) -> Result<()> {
        OneraImageIO::write_region(self, region, data)
    }

    fn finish(&mut self) -> Result<()> {
        OneraImageIO::finish(self)
    }
}

/// One row of the format table
pub struct FormatEntry {
    pub kind: FormatKind,
    pub name: &'static str,
    pub can_read: fn(&Path) -> bool,
    pub can_write: fn(&Path) -> bool,
    pub open: fn(&Path, CodecConfig) -> Box<dyn RasterImageIO>,
}

fn open_onera(path: &Path, config: CodecConfig) -> Box<dyn RasterImageIO> {
    Box::new(OneraImageIO::with_config(path, config))
}

static FORMATS: &[FormatEntry] = &[FormatEntry {
    kind: FormatKind::ONERA_COMPLEX_F32,
    name: "ONERA",
    can_read: onera::can_read_file,
    can_write: onera::can_write_file,
    open: open_onera,
}];

pub fn formats() -> &'static [FormatEntry] {
    FORMATS
}

pub fn lookup(kind: FormatKind) -> Option<&'static FormatEntry> {
    FORMATS.iter().find(|entry| entry.kind == kind)
}

/// Opens `path` with the first format that recognizes it and reads its
/// image information.
pub fn open_reader(path: &Path, config: CodecConfig) -> Result<(Box<dyn RasterImageIO>, RasterGeometry)> {
    let entry = FORMATS
        .iter()
        .find(|entry| (entry.can_read)(path))
        .ok_or_else(|| OneraError::UnsupportedFormat(format!("no reader for {}", path.display())))?;
    debug!(format = entry.name, path = %path.display(), "Selected reader");

    let mut reader = (entry.open)(path, config);
    let geometry = reader.read_image_information()?;
    Ok((reader, geometry))
}

/// Opens `path` for writing an image of `geometry` in format `kind`.
pub fn open_writer(
    path: &Path,
    kind: FormatKind,
    geometry: RasterGeometry,
    config: CodecConfig,
) -> Result<Box<dyn RasterImageIO>> {
    let entry = lookup(kind)
        .ok_or_else(|| OneraError::UnsupportedFormat(format!("no writer for {:?}", kind)))?;
    if !(entry.can_write)(path) {
        return Err(OneraError::UnsupportedFormat(format!(
            "{} cannot write {}",
            entry.name,
            path.display()
        )));
    }
    debug!(format = entry.name, path = %path.display(), "Selected writer");

    let mut writer = (entry.open)(path, config);
    writer.set_geometry(geometry)?;
    Ok(writer)
}
