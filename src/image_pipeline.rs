//! Image processing pipeline module
//!
//! This module provides region-based raster I/O, with separate modules for
//! byte order handling, the ONERA codec, format dispatch and streaming
//! conversions.

pub mod byte_order;
pub mod common;
pub mod conversions;
pub mod formats;
pub mod onera;

pub use common::{
    OneraError,
    Result,
};

pub use onera::{
    CodecConfig,
    CodecConfigBuilder,
    OneraImageIO,
    PixelEncoding,
    RasterGeometry,
    Region,
};

pub use formats::{
    FormatKind,
    LayoutKind,
    RasterImageIO,
};

pub use conversions::{
    StripCopyConfig,
    StripCopyPipeline,
};
