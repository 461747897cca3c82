//! Core data types
//!
//! An [`AvUnit`] is the pipeline's scheduling quantum: one video frame and
//! the audio slice that exactly covers its display duration. Units flow
//! through both buffers wrapped in [`PipelineItem`] so the end of a stream
//! is an explicit sentinel rather than a closed channel.

pub mod video;

pub use video::{PixelFormat, VideoFrame};

use crate::error::{Error, Result};
use tokio::time::Instant;

/// One scheduling quantum: a video frame plus its aligned audio slice.
///
/// Every unit in a session carries an audio slice of identical length
/// (`sample_rate / target_fps * channels` interleaved samples); that
/// fixed length is what keeps audio and video aligned over an unbounded
/// session.
#[derive(Debug, Clone)]
pub struct AvUnit {
    /// Monotonically increasing position in the stream, no gaps
    pub sequence: u64,
    /// Video payload
    pub video: VideoFrame,
    /// Interleaved f32 samples covering exactly one frame interval
    pub audio: Vec<f32>,
    /// When the producer emitted this unit (diagnostic only, never used
    /// for pacing decisions)
    pub created_at: Instant,
}

impl AvUnit {
    /// Check the pipeline invariants for this unit: contiguous sequence
    /// and exact audio slice length. A violation is fatal (the stream is
    /// already corrupted when either fails).
    pub fn validate(&self, expected_sequence: u64, samples_per_frame: usize) -> Result<()> {
        if self.sequence != expected_sequence {
            return Err(Error::MalformedUnit {
                sequence: self.sequence,
                expected: expected_sequence,
                detail: "non-contiguous sequence number".into(),
            });
        }
        if self.audio.len() != samples_per_frame {
            return Err(Error::MalformedUnit {
                sequence: self.sequence,
                expected: expected_sequence,
                detail: format!(
                    "audio slice has {} samples, expected {}",
                    self.audio.len(),
                    samples_per_frame
                ),
            });
        }
        Ok(())
    }
}

/// An item travelling through the pipeline buffers
#[derive(Debug, Clone)]
pub enum PipelineItem {
    /// A frame/audio unit
    Unit(AvUnit),
    /// Explicit end-of-stream sentinel; propagated through both buffers
    /// so every stage terminates cleanly instead of guessing from the
    /// absence of data
    EndOfStream,
}
