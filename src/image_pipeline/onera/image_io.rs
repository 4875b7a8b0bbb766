//! ONERA codec instance.
//!
//! One `OneraImageIO` serves one logical image path. Reading starts with
//! [`OneraImageIO::read_image_information`] and then streams any number of
//! regions. Writing starts by assigning a geometry; the first region write
//! emits the header, later ones only touch their own rows.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::image_pipeline::common::error::{OneraError, Result};
use crate::image_pipeline::onera::handles::{FileHandlePair, OpenMode};
use crate::image_pipeline::onera::header::{self, HeaderFields};
use crate::image_pipeline::onera::region as region_io;
use crate::image_pipeline::onera::types::{CodecConfig, RasterGeometry, Region};
use crate::image_pipeline::onera::gate;
use crate::image_pipeline::onera::write_state::WriteState;

#[derive(Debug)]
pub struct OneraImageIO {
    path: PathBuf,
    config: CodecConfig,
    handles: FileHandlePair,
    geometry: Option<RasterGeometry>,
    fields: Option<HeaderFields>,
    write_state: WriteState,
}

impl OneraImageIO {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_config(path, CodecConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(path: P, config: CodecConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            handles: FileHandlePair::new(),
            geometry: None,
            fields: None,
            write_state: WriteState::default(),
        }
    }

    /// A codec ready to write an image of `geometry` to `path`.
    pub fn create<P: AsRef<Path>>(path: P, geometry: RasterGeometry, config: CodecConfig) -> Result<Self> {
        let mut codec = Self::with_config(path, config);
        codec.set_geometry(geometry)?;
        Ok(codec)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn geometry(&self) -> Option<RasterGeometry> {
        self.geometry
    }

    /// Key/value lines of the last header read.
    pub fn header_fields(&self) -> Option<&HeaderFields> {
        self.fields.as_ref()
    }

    pub fn write_state(&self) -> WriteState {
        self.write_state
    }

    pub fn can_read_file(&self) -> bool {
        gate::can_read_file(&self.path)
    }

    pub fn can_write_file(&self) -> bool {
        gate::can_write_file(&self.path)
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn read_image_information(&mut self) -> Result<RasterGeometry> {
        let result = self.read_header();
        self.release_on_error(result)
    }

    /// Assigns the geometry of the image about to be written.
    pub fn set_geometry(&mut self, geometry: RasterGeometry) -> Result<()> {
        self.write_state = self.write_state.assign_geometry()?;
        self.geometry = Some(geometry);
        Ok(())
    }

    /// Emits the header for the assigned geometry. Region writes call this
    /// on their own the first time; calling it a second time is an error.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn write_image_information(&mut self) -> Result<()> {
        let result = self.write_header();
        self.release_on_error(result)
    }

    /// Reads `region` as native-order bytes.
    pub fn read_region_bytes(&mut self, region: &Region) -> Result<Vec<u8>> {
        let result = self.read_bytes(region);
        self.release_on_error(result)
    }

    pub fn read_region(&mut self, region: &Region) -> Result<Vec<f32>> {
        let result = self.require_geometry().and_then(|geometry| {
            region.check_within(&geometry)?;
            Ok(region.component_count(&geometry))
        });
        let mut out = vec![0f32; self.release_on_error(result)?];
        self.read_region_into(region, &mut out)?;
        Ok(out)
    }

    pub fn read_region_into(&mut self, region: &Region, out: &mut [f32]) -> Result<()> {
        let result = self.read_into(region, out);
        self.release_on_error(result)
    }

    /// Writes native-order bytes covering `region`.
    pub fn write_region_bytes(&mut self, region: &Region, data: &[u8]) -> Result<()> {
        let result = self
            .prepare_write(region)
            .and_then(|(geometry, target)| {
                let sink = self.handles.data_for(&self.path, OpenMode::Update)?;
                region_io::write_region_bytes(sink, &geometry, &target, data)
            });
        self.release_on_error(result)
    }

    pub fn write_region(&mut self, region: &Region, data: &[f32]) -> Result<()> {
        let result = self
            .prepare_write(region)
            .and_then(|(geometry, target)| {
                let sink = self.handles.data_for(&self.path, OpenMode::Update)?;
                region_io::write_region(sink, &geometry, &target, data)
            });
        self.release_on_error(result)
    }

    /// Releases both file handles, syncing written data first when configured.
    pub fn finish(&mut self) -> Result<()> {
        let result = if self.config.sync_on_finish {
            self.handles.sync_data()
        } else {
            Ok(())
        };
        self.handles.close();
        result
    }

    fn read_header(&mut self) -> Result<RasterGeometry> {
        self.handles.open_header(&self.path, OpenMode::Read)?;
        self.handles.open_data(&self.path, OpenMode::Read)?;
        let (header_file, data_file) = self
            .handles
            .pair_mut()
            .ok_or_else(|| OneraError::InvalidState("header files are not open".to_string()))?;

        let info = header::read_header_from(&mut BufReader::new(header_file), data_file, &self.config)?;

        debug!(
            width = info.geometry.width,
            height = info.geometry.height,
            "Driver to read: ONERA"
        );
        self.geometry = Some(info.geometry);
        self.fields = Some(info.fields);
        Ok(info.geometry)
    }

    fn write_header(&mut self) -> Result<()> {
        let geometry = self.geometry.ok_or_else(|| {
            OneraError::InvalidState("no geometry assigned for writing".to_string())
        })?;
        let next = self.write_state.write_header()?;

        self.handles.open_header(&self.path, OpenMode::Create)?;
        self.handles.open_data(&self.path, OpenMode::Create)?;
        let (header_file, data_file) = self
            .handles
            .pair_mut()
            .ok_or_else(|| OneraError::InvalidState("header files are not open".to_string()))?;

        let look_data = header::look_data_name(&header::data_path(&self.path));
        header::write_header_to(
            &mut BufWriter::new(header_file),
            &mut BufWriter::new(data_file),
            &geometry,
            &look_data,
        )?;

        self.write_state = next;
        info!(
            path = %self.path.display(),
            width = geometry.width,
            height = geometry.height,
            "Wrote ONERA header"
        );
        Ok(())
    }

    fn read_bytes(&mut self, region: &Region) -> Result<Vec<u8>> {
        let geometry = self.require_geometry()?;
        region.check_within(&geometry)?;
        debug!(?region, "Reading region");

        let source = self.handles.data_for(&self.path, OpenMode::Read)?;
        region_io::read_region_bytes(source, &geometry, region)
    }

    fn read_into(&mut self, region: &Region, out: &mut [f32]) -> Result<()> {
        let geometry = self.require_geometry()?;
        region.check_within(&geometry)?;
        debug!(?region, "Reading region");

        let source = self.handles.data_for(&self.path, OpenMode::Read)?;
        region_io::read_region_into(source, &geometry, region, out)
    }

    /// Emits the header if needed and resolves the region actually written.
    fn prepare_write(&mut self, requested: &Region) -> Result<(RasterGeometry, Region)> {
        if !self.write_state.is_header_written() {
            self.write_header()?;
        }
        let geometry = self.require_geometry()?;

        let mut region = *requested;
        if region.spans(&geometry) && (region.row_offset != 0 || region.col_offset != 0) {
            debug!(?requested, "Whole-image region, forcing offsets to 0");
            region.row_offset = 0;
            region.col_offset = 0;
        }
        region.check_within(&geometry)?;
        debug!(?region, "Writing region");

        Ok((geometry, region))
    }

    fn require_geometry(&self) -> Result<RasterGeometry> {
        self.geometry.ok_or_else(|| {
            OneraError::InvalidState("image information has not been read or assigned".to_string())
        })
    }

    fn release_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.handles.close();
        }
        result
    }
}
