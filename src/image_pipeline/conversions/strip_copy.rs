use std::path::Path;

use tracing::{debug, info, instrument};

use crate::image_pipeline::{
    common::error::{OneraError, Result},
    formats::{self, FormatKind, RasterImageIO},
    onera::{CodecConfig, RasterGeometry, Region},
};

/// Configuration for strip-streamed copies
#[derive(Debug, Clone)]
pub struct StripCopyConfig {
    /// Rows read and written per step
    pub strip_rows: u32,
    /// Output format
    pub output_format: FormatKind,
    /// Codec configuration used for both ends
    pub codec: CodecConfig,
}

impl Default for StripCopyConfig {
    fn default() -> Self {
        Self {
            strip_rows: 256,
            output_format: FormatKind::ONERA_COMPLEX_F32,
            codec: CodecConfig::default(),
        }
    }
}

/// Copies images, or parts of them, without holding more than one strip in memory.
pub struct StripCopyPipeline {
    config: StripCopyConfig,
}

impl StripCopyPipeline {
    pub fn new(config: StripCopyConfig) -> Result<Self> {
        if config.strip_rows == 0 {
            return Err(OneraError::InvalidState("strip_rows must be at least 1".to_string()));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &StripCopyConfig {
        &self.config
    }

    /// Copies the whole of `input` to `output`.
    #[instrument(skip(self, input_path, output_path))]
    pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q) -> Result<RasterGeometry> {
        let (mut reader, geometry) = self.open_input(input_path.as_ref())?;
        self.stream(reader.as_mut(), output_path.as_ref(), &geometry.full_region())
    }

    /// Writes `region` of `input` as a new image at `output`.
    #[instrument(skip(self, input_path, output_path))]
    pub fn extract_region<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        region: Region,
    ) -> Result<RasterGeometry> {
        let (mut reader, geometry) = self.open_input(input_path.as_ref())?;
        region.check_within(&geometry)?;
        if region.is_empty() {
            return Err(OneraError::InvalidState(format!("cannot extract empty region {:?}", region)));
        }
        self.stream(reader.as_mut(), output_path.as_ref(), &region)
    }

    fn open_input(&self, input_path: &Path) -> Result<(Box<dyn RasterImageIO>, RasterGeometry)> {
        info!(input = %input_path.display(), "Opening input");
        let _span = tracing::info_span!("read_image_information").entered();
        formats::open_reader(input_path, self.config.codec.clone())
    }

    fn stream(&self, reader: &mut dyn RasterImageIO, output_path: &Path, source: &Region) -> Result<RasterGeometry> {
        let output_geometry = RasterGeometry::complex_f32(source.col_count, source.row_count);
        let mut writer = {
            let _span = tracing::info_span!("create_output_file").entered();
            formats::open_writer(
                output_path,
                self.config.output_format,
                output_geometry,
                self.config.codec.clone(),
            )?
        };

        let mut done = 0u32;
        while done < source.row_count {
            let rows = self.config.strip_rows.min(source.row_count - done);
            let _span = tracing::info_span!("strip", first_row = done, rows).entered();

            let strip = reader.read_region(&Region::new(
                source.row_offset + done,
                source.col_offset,
                rows,
                source.col_count,
            ))?;
            writer.write_region(&Region::new(done, 0, rows, source.col_count), &strip)?;

            done += rows;
            debug!(done, total = source.row_count, "Strip copied");
        }

        writer.finish()?;
        reader.finish()?;

        info!(
            output = %output_path.display(),
            width = output_geometry.width,
            height = output_geometry.height,
            "Copy complete"
        );
        Ok(output_geometry)
    }
}
