//! Audio source implementations
//!
//! All sources deliver interleaved f32 samples at the session's sample
//! rate; resampling and format conversion happen upstream (they are the
//! generator's concern, not the pipeline's).

use crate::error::Result;
use crate::sources::AudioSource;
use std::path::Path;

/// An in-memory audio source over a preloaded sample buffer
pub struct MemoryAudioSource {
    samples: Vec<f32>,
    pos: usize,
}

impl MemoryAudioSource {
    /// Create a source over `samples` (interleaved if multi-channel)
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples, pos: 0 }
    }

    /// Total samples held by the source
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the source holds no samples at all
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AudioSource for MemoryAudioSource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let available = self.samples.len() - self.pos;
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&self.samples[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn rewind(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }
}

/// An endless source of silence. Useful as a stand-in while a generator
/// has no audio to offer.
pub struct SilenceSource;

impl AudioSource for SilenceSource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        buf.fill(0.0);
        Ok(buf.len())
    }

    fn rewind(&mut self) -> Result<()> {
        Ok(())
    }
}

/// An audio source backed by a RIFF/WAVE file, decoded eagerly to f32.
///
/// Integer PCM (16/24/32 bit) is scaled to [-1.0, 1.0]; float files pass
/// through unchanged. Channel interleaving is preserved as stored, so the
/// session config's `channels` should match `WavFileSource::channels()`.
pub struct WavFileSource {
    inner: MemoryAudioSource,
    sample_rate: u32,
    channels: u16,
}

impl WavFileSource {
    /// Open and fully decode a WAV file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };
        Ok(Self {
            inner: MemoryAudioSource::new(samples),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// Sample rate declared by the file
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count declared by the file
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total decoded samples (all channels)
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the file contained no samples
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl AudioSource for WavFileSource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        self.inner.read(buf)
    }

    fn rewind(&mut self) -> Result<()> {
        self.inner.rewind()
    }
}
