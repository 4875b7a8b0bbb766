//! ONERA complex raster codec
//!
//! An ONERA image is a pair of files sharing a root name: a `.ent` text
//! header and a `.dat` binary file of little-endian complex float pixels.

pub mod gate;
pub mod handles;
pub mod header;
pub mod layout;
pub mod region;
pub mod types;
pub mod write_state;
mod image_io;


pub use gate::{can_read_file, can_write_file};
pub use handles::{FileHandlePair, OpenMode};
pub use header::{HeaderFields, HeaderInfo, probe, read_header, write_header};
pub use image_io::OneraImageIO;
pub use types::{CodecConfig, CodecConfigBuilder, PixelEncoding, RasterGeometry, Region};
pub use write_state::WriteState;
