//! External collaborator interfaces
//!
//! The pipeline consumes content through two narrow seams: a
//! [`FrameSource`] for video (async, since real generators wait on
//! inference) and an [`AudioSource`] for raw samples (sequential read
//! plus rewind, which the slicer's loop policy needs).

pub mod audio;
pub mod frames;

pub use audio::{MemoryAudioSource, SilenceSource, WavFileSource};
pub use frames::FrameSequence;

use crate::data::VideoFrame;
use crate::error::Result;
use async_trait::async_trait;

/// A source of video frames, pulled as fast as it can generate.
///
/// Returning `Ok(None)` signals end-of-stream; the producer converts it
/// into the explicit pipeline sentinel.
#[async_trait]
pub trait FrameSource: Send {
    /// Produce the next frame, waiting on the generator if necessary
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>>;
}

/// A continuous stream of interleaved f32 samples.
///
/// `read` fills as much of `buf` as it can and returns the number of
/// samples written; 0 means the source is dry. `rewind` restarts from the
/// beginning and is only required to succeed for sources used with the
/// slicer's loop policy.
pub trait AudioSource: Send {
    /// Read up to `buf.len()` samples into `buf`
    fn read(&mut self, buf: &mut [f32]) -> Result<usize>;

    /// Seek back to the start of the stream
    fn rewind(&mut self) -> Result<()>;
}
