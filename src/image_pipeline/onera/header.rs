//! Two-part ONERA header: the `.ent` text file and the binary prologue of
//! the `.dat` data file.
//!
//! The text header carries two free-form lines, the pixel format token on
//! line 3 and a few `key=\tvalue` lines. The image geometry is never taken
//! from the text: the column count lives at offset 6 of the data file and the
//! row count follows from the data file size.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{ReadBytesExt, WriteBytesExt};
use tracing::{debug, info, warn};

use crate::image_pipeline::byte_order::DiskOrder;
use crate::image_pipeline::common::error::{OneraError, Result};
use crate::image_pipeline::onera::layout::{self, COLUMN_COUNT_OFFSET, MAGIC_NUMBER};
use crate::image_pipeline::onera::types::{CodecConfig, PixelEncoding, RasterGeometry};

const LOOK_DATA_KEY: &str = "Look.dat";
const PIXEL_FORMAT_KEY: &str = "Format_valeurs_look";
const COLUMNS_KEY: &str = "Nb_case_par_ligne_look";
const ROWS_KEY: &str = "Nb_ligne_look";

/// `<root>.ent`
pub fn header_path(path: &Path) -> PathBuf {
    path.with_extension(layout::HEADER_EXTENSION)
}

/// `<root>.dat`
pub fn data_path(path: &Path) -> PathBuf {
    path.with_extension(layout::DATA_EXTENSION)
}

pub(crate) fn require_file_name(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(OneraError::MissingFileName);
    }
    Ok(())
}

/// Key/value lines found after the pixel format line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub look_data: Option<String>,
    pub pixel_format: Option<String>,
    pub declared_columns: Option<u32>,
    pub declared_rows: Option<u32>,
}

/// Everything learned from a successful header parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub geometry: RasterGeometry,
    pub encoding: PixelEncoding,
    pub fields: HeaderFields,
}

/// Checks that both files of `path` exist and that the data file starts with
/// the ONERA magic number. Never fails; every problem reads as `false`.
pub fn probe(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return false;
    }

    let header = header_path(path);
    if let Err(e) = File::open(&header) {
        debug!("Probe failed to open header {}: {}", header.display(), e);
        return false;
    }

    let data = data_path(path);
    let mut file = match File::open(&data) {
        Ok(file) => file,
        Err(e) => {
            debug!("Probe failed to open data {}: {}", data.display(), e);
            return false;
        }
    };

    match file.read_i32::<DiskOrder>() {
        Ok(magic) => magic == MAGIC_NUMBER,
        Err(e) => {
            debug!("Probe failed to read magic number from {}: {}", data.display(), e);
            false
        }
    }
}

/// Parses an already opened header/data file pair.
pub fn read_header_from<H, D>(header: &mut H, data: &mut D, config: &CodecConfig) -> Result<HeaderInfo>
where
    H: BufRead,
    D: Read + Seek,
{
    let limit = config.header_line_limit;

    // Lines 1 and 2 are comments.
    for line_no in 1..=2 {
        read_header_line(header, limit, line_no)?;
    }
    let token = read_header_line(header, limit, 3)?;
    let token = token.trim();
    let encoding = PixelEncoding::from_token(token).ok_or_else(|| {
        OneraError::Format(format!(
            "pixel format '{}' is not supported (only '{}' is available)",
            token,
            PixelEncoding::ComplexFloat32.token()
        ))
    })?;

    // Trailing key/value lines are only read when they will be checked.
    let mut fields = HeaderFields::default();
    if config.cross_check_header {
        let mut line_no = 4;
        while let Some(line) = next_header_line(header, limit, line_no)? {
            parse_field(&line, &mut fields);
            line_no += 1;
        }
    }

    data.seek(SeekFrom::Start(0))?;
    let magic = data
        .read_i32::<DiskOrder>()
        .map_err(|e| truncated(e, "magic number"))?;
    if magic != MAGIC_NUMBER {
        return Err(OneraError::Format(format!(
            "bad magic number {} (expected {})",
            magic, MAGIC_NUMBER
        )));
    }

    data.seek(SeekFrom::Start(COLUMN_COUNT_OFFSET))?;
    let columns = data
        .read_i16::<DiskOrder>()
        .map_err(|e| truncated(e, "column count"))?;
    let file_len = data.seek(SeekFrom::End(0))?;

    let width = u32::try_from(columns).unwrap_or(0);
    let stride = layout::row_byte_stride(
        width,
        encoding.bytes_per_component(),
        encoding.components_per_pixel(),
    );
    let rows = layout::rows_in_file(file_len, stride);

    if width == 0 || rows == 0 {
        return Err(OneraError::Format(format!(
            "unknown image dimension: {} columns, {} rows",
            columns, rows
        )));
    }
    let height = u32::try_from(rows)
        .map_err(|_| OneraError::Format(format!("row count {} is too large", rows)))?;

    let geometry = RasterGeometry::new(width, height, encoding);
    if config.cross_check_header {
        cross_check(&fields, &geometry);
    }

    debug!(
        width = geometry.width,
        height = geometry.height,
        components = geometry.components_per_pixel,
        bytes_per_component = geometry.bytes_per_component,
        "Read ONERA header"
    );

    Ok(HeaderInfo {
        geometry,
        encoding,
        fields,
    })
}

/// Opens `<root>.ent` and `<root>.dat` and parses them.
pub fn read_header(path: &Path, config: &CodecConfig) -> Result<HeaderInfo> {
    require_file_name(path)?;
    let mut header = BufReader::new(open_for_reading(&header_path(path))?);
    let mut data = open_for_reading(&data_path(path))?;
    read_header_from(&mut header, &mut data, config)
}

/// Emits the text header and lays out the data file: magic number, the
/// header row, `height` zeroed pixel rows, then the column count at offset 6.
pub fn write_header_to<H, D>(header: &mut H, data: &mut D, geometry: &RasterGeometry, look_data: &str) -> Result<()>
where
    H: Write,
    D: Write + Seek,
{
    check_writable(geometry)?;
    let token = PixelEncoding::ComplexFloat32.token();

    writeln!(header, "# ONERA look header written by onera_io")?;
    writeln!(header, "# {} :", PIXEL_FORMAT_KEY)?;
    writeln!(header, "{}", token)?;
    writeln!(header, "{}= \t{}", LOOK_DATA_KEY, look_data)?;
    writeln!(header, "{}=    \t{}", PIXEL_FORMAT_KEY, token)?;
    writeln!(header, "{}= \t{}", COLUMNS_KEY, geometry.width)?;
    writeln!(
        header,
        "{}=          \t{} + 1 binary header row (16-bit integers)",
        ROWS_KEY, geometry.height
    )?;
    writeln!(header)?;
    writeln!(header, "# File layout and pixel coding:")?;
    writeln!(
        header,
        "# the 4 bytes before the first row hold a magic number [I4= {}]",
        MAGIC_NUMBER
    )?;
    writeln!(header, "# [little-endian, least significant byte first]")?;
    writeln!(
        header,
        "# the binary header row holds the column count [I2] at its bytes 2 and 3"
    )?;
    header.flush()?;

    let zero_row = vec![0u8; geometry.row_byte_stride() as usize];
    data.seek(SeekFrom::Start(0))?;
    data.write_i32::<DiskOrder>(MAGIC_NUMBER)?;
    for _ in 0..=geometry.height {
        data.write_all(&zero_row)?;
    }

    data.seek(SeekFrom::Start(COLUMN_COUNT_OFFSET))?;
    data.write_i16::<DiskOrder>(geometry.width as i16)?;
    data.flush()?;

    Ok(())
}

/// Creates (truncating) both files of `path` and writes the header.
pub fn write_header(path: &Path, geometry: &RasterGeometry) -> Result<()> {
    require_file_name(path)?;
    let header_file = header_path(path);
    let data_file = data_path(path);

    let mut header = BufWriter::new(create(&header_file)?);
    let mut data = BufWriter::new(create(&data_file)?);
    write_header_to(&mut header, &mut data, geometry, &look_data_name(&data_file))?;

    info!(
        header = %header_file.display(),
        width = geometry.width,
        height = geometry.height,
        "Wrote ONERA header"
    );
    Ok(())
}

/// The name recorded under `Look.dat`.
pub(crate) fn look_data_name(data_file: &Path) -> String {
    data_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn check_writable(geometry: &RasterGeometry) -> Result<()> {
    if geometry.width == 0 || geometry.height == 0 {
        return Err(OneraError::Format(format!(
            "cannot write an empty {}x{} image",
            geometry.width, geometry.height
        )));
    }
    if geometry.width > i16::MAX as u32 {
        return Err(OneraError::Format(format!(
            "width {} does not fit the 16-bit column count field",
            geometry.width
        )));
    }
    if PixelEncoding::ComplexFloat32.components_per_pixel() != geometry.components_per_pixel
        || PixelEncoding::ComplexFloat32.bytes_per_component() != geometry.bytes_per_component
    {
        return Err(OneraError::Format(format!(
            "only '{}' pixels can be written",
            PixelEncoding::ComplexFloat32.token()
        )));
    }
    Ok(())
}

fn open_for_reading(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| OneraError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| OneraError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn read_header_line<R: BufRead>(reader: &mut R, limit: usize, line_no: usize) -> Result<String> {
    next_header_line(reader, limit, line_no)?
        .ok_or_else(|| OneraError::Format(format!("header ends before line {}", line_no)))
}

fn next_header_line<R: BufRead>(reader: &mut R, limit: usize, line_no: usize) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(limit as u64 + 2)
        .read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    if buf.len() > limit {
        return Err(OneraError::Format(format!(
            "header line {} is longer than {} bytes",
            line_no, limit
        )));
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn parse_field(line: &str, fields: &mut HeaderFields) {
    if line.starts_with('#') {
        return;
    }
    let Some((key, value)) = line.split_once('=') else {
        return;
    };
    let value = value.trim();
    // Row counts carry a trailing note about the binary header row.
    let first = value.split_whitespace().next().unwrap_or("");

    match key.trim() {
        LOOK_DATA_KEY => fields.look_data = Some(value.to_string()),
        PIXEL_FORMAT_KEY => fields.pixel_format = Some(first.to_string()),
        COLUMNS_KEY => fields.declared_columns = first.parse().ok(),
        ROWS_KEY => fields.declared_rows = first.parse().ok(),
        _ => {}
    }
}

fn cross_check(fields: &HeaderFields, geometry: &RasterGeometry) {
    if let Some(columns) = fields.declared_columns {
        if columns != geometry.width {
            warn!(
                declared = columns,
                actual = geometry.width,
                "Header column count disagrees with data file"
            );
        }
    }
    if let Some(rows) = fields.declared_rows {
        if rows != geometry.height {
            warn!(
                declared = rows,
                actual = geometry.height,
                "Header row count disagrees with data file"
            );
        }
    }
    if let Some(format) = &fields.pixel_format {
        if PixelEncoding::from_token(format).is_none() {
            warn!(declared = %format, "Header pixel format key disagrees with line 3");
        }
    }
}

fn truncated(e: io::Error, what: &str) -> OneraError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        OneraError::Format(format!("data file too short to hold the {}", what))
    } else {
        e.into()
    }
}
