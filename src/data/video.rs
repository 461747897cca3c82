//! Video frame payload types
//!
//! The pipeline treats pixel data as opaque; formats exist so sources and
//! transports can agree on buffer layout without decoding anything here.

use serde::{Deserialize, Serialize};

/// Pixel format for video frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PixelFormat {
    /// Unknown/unspecified format
    Unspecified = 0,

    /// YUV 4:2:0 planar (standard codec format)
    /// Memory: width * height * 3/2 bytes
    Yuv420p = 1,

    /// RGB24 (packed 24-bit RGB, no padding)
    /// Memory: width * height * 3 bytes
    Rgb24 = 2,

    /// BGR24 (packed, OpenCV-style channel order)
    /// Memory: width * height * 3 bytes
    Bgr24 = 3,

    /// RGBA32 (packed 32-bit RGBA with alpha)
    /// Memory: width * height * 4 bytes
    Rgba32 = 4,

    /// Encoded bitstream (not raw pixels)
    Encoded = 255,
}

impl PixelFormat {
    /// Expected buffer size in bytes for raw formats (0 for variable/unknown)
    pub fn buffer_size(&self, width: u32, height: u32) -> usize {
        match self {
            PixelFormat::Yuv420p => (width * height * 3 / 2) as usize,
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => (width * height * 3) as usize,
            PixelFormat::Rgba32 => (width * height * 4) as usize,
            PixelFormat::Encoded | PixelFormat::Unspecified => 0,
        }
    }
}

/// One video frame: opaque pixel payload plus timing metadata.
///
/// `frame_number` and `timestamp_us` are assigned by the producer when the
/// frame enters the pipeline; sources only need to fill the pixel fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Raw pixel bytes (layout per `format`)
    pub pixel_data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel layout of `pixel_data`
    pub format: PixelFormat,
    /// Position in the output stream, assigned at production time
    pub frame_number: u64,
    /// Presentation timestamp in microseconds, assigned at production time
    pub timestamp_us: u64,
}

impl VideoFrame {
    /// Create a frame from raw pixel data. Timing fields start at zero and
    /// are stamped by the producer.
    pub fn new(pixel_data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            pixel_data,
            width,
            height,
            format,
            frame_number: 0,
            timestamp_us: 0,
        }
    }

    /// Create a solid-color test frame (every byte set to `fill`)
    pub fn filled(width: u32, height: u32, format: PixelFormat, fill: u8) -> Self {
        let size = format.buffer_size(width, height);
        Self::new(vec![fill; size], width, height, format)
    }

    /// Whether the payload length matches the declared format/dimensions.
    /// Always true for `Encoded`/`Unspecified`, whose size is variable.
    pub fn payload_matches_format(&self) -> bool {
        let expected = self.format.buffer_size(self.width, self.height);
        expected == 0 || self.pixel_data.len() == expected
    }
}
