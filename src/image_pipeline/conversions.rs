//! Pipeline conversions module
//!
//! This module contains orchestration logic that streams images between
//! codecs one strip at a time.

mod strip_copy;

pub use strip_copy::{StripCopyConfig, StripCopyPipeline};
