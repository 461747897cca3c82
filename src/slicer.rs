//! Audio slicer
//!
//! Converts a continuous audio stream into fixed-size slices aligned 1:1
//! with video frame boundaries. The cursor is pure sample arithmetic:
//! after N calls exactly `N * samples_per_frame` samples have been
//! emitted, no matter how irregularly the calls arrive. Wall-clock time
//! never enters the calculation, which is what keeps audio from drifting
//! against video over an unbounded session.

use crate::error::{Error, Result};
use crate::sources::AudioSource;

/// What to do when the audio source runs dry mid-stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailPolicy {
    /// Zero-fill the remainder of every slice; the stream never ends
    /// from the audio side
    PadSilence,
    /// Rewind the source and keep reading
    Loop,
    /// Zero-pad the final partial slice, then signal end-of-stream
    Stop,
}

/// Stateful slicer over an [`AudioSource`].
///
/// Every emitted slice has exactly `samples_per_frame` samples; a shorter
/// slice is never returned under any policy.
pub struct AudioSlicer {
    source: Box<dyn AudioSource>,
    samples_per_frame: usize,
    tail: TailPolicy,
    slices_emitted: u64,
    exhausted: bool,
}

impl AudioSlicer {
    /// Create a slicer emitting `samples_per_frame` interleaved samples
    /// per call
    pub fn new(source: Box<dyn AudioSource>, samples_per_frame: usize, tail: TailPolicy) -> Self {
        Self {
            source,
            samples_per_frame,
            tail,
            slices_emitted: 0,
            exhausted: false,
        }
    }

    /// Produce the next fixed-length slice, or `None` once the source is
    /// exhausted under [`TailPolicy::Stop`].
    pub fn next_slice(&mut self) -> Result<Option<Vec<f32>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut slice = vec![0.0f32; self.samples_per_frame];
        let mut filled = 0;
        while filled < self.samples_per_frame {
            let n = self.source.read(&mut slice[filled..])?;
            if n > 0 {
                filled += n;
                continue;
            }
            match self.tail {
                TailPolicy::PadSilence => break, // remainder is already zeroed
                TailPolicy::Loop => {
                    self.source.rewind()?;
                    let n = self.source.read(&mut slice[filled..])?;
                    if n == 0 {
                        // A source that is empty even after rewind can
                        // never satisfy the loop policy.
                        return Err(Error::SourceExhausted);
                    }
                    filled += n;
                }
                TailPolicy::Stop => {
                    self.exhausted = true;
                    if filled == 0 {
                        return Ok(None);
                    }
                    break; // final partial slice goes out zero-padded
                }
            }
        }

        self.slices_emitted += 1;
        Ok(Some(slice))
    }

    /// Slices emitted so far
    pub fn slices_emitted(&self) -> u64 {
        self.slices_emitted
    }

    /// Total samples emitted so far; by construction always exactly
    /// `slices_emitted * samples_per_frame`
    pub fn samples_emitted(&self) -> u64 {
        self.slices_emitted * self.samples_per_frame as u64
    }
}
