//! Preloaded frame sequence source

use crate::data::VideoFrame;
use crate::error::{Error, Result};
use crate::sources::FrameSource;
use async_trait::async_trait;

/// A frame source backed by a preloaded set of frames, served either
/// once through (finite stream) or cyclically (open-ended stream).
pub struct FrameSequence {
    frames: Vec<VideoFrame>,
    index: usize,
    cyclic: bool,
}

impl FrameSequence {
    /// Create a sequence over `frames`. `cyclic` wraps back to the first
    /// frame instead of ending the stream.
    pub fn new(frames: Vec<VideoFrame>, cyclic: bool) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::InvalidConfig("frame sequence is empty".into()));
        }
        Ok(Self {
            frames,
            index: 0,
            cyclic,
        })
    }

    /// Number of distinct frames in the underlying set
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; construction rejects empty sequences
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl FrameSource for FrameSequence {
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        if self.index >= self.frames.len() {
            if !self.cyclic {
                return Ok(None);
            }
            self.index = 0;
        }
        let frame = self.frames[self.index].clone();
        self.index += 1;
        Ok(Some(frame))
    }
}
