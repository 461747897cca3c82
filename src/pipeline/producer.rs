//! Producer: stage 1 of the pipeline
//!
//! Pulls frames and audio slices as fast as the generator allows and
//! publishes fully formed units into Buffer A. Deliberately carries no
//! pacing logic: the only thing a producer ever waits on is its own
//! generator, so generation-speed variance never touches playback timing.

use crate::config::SessionConfig;
use crate::data::{AvUnit, PipelineItem};
use crate::error::Result;
use crate::pipeline::buffers::IntakeSender;
use crate::slicer::AudioSlicer;
use crate::sources::FrameSource;
use tokio::time::Instant;

/// Summary returned when the producer finishes
#[derive(Debug, Clone, Copy)]
pub struct ProducerReport {
    /// Units pushed into Buffer A
    pub units: u64,
    /// Audio samples pushed; always `units * samples_per_frame`
    pub audio_samples: u64,
}

/// The generation-side worker
pub struct Producer {
    frames: Box<dyn FrameSource>,
    slicer: AudioSlicer,
    intake: IntakeSender,
    target_fps: u32,
}

impl Producer {
    /// Assemble a producer over its sources and Buffer A write end
    pub fn new(
        frames: Box<dyn FrameSource>,
        slicer: AudioSlicer,
        intake: IntakeSender,
        config: &SessionConfig,
    ) -> Self {
        Self {
            frames,
            slicer,
            intake,
            target_fps: config.target_fps,
        }
    }

    /// Run until either source ends, then propagate the end-of-stream
    /// sentinel
    pub async fn run(mut self) -> Result<ProducerReport> {
        let mut sequence: u64 = 0;
        loop {
            let Some(mut video) = self.frames.next_frame().await? else {
                break;
            };
            let Some(audio) = self.slicer.next_slice()? else {
                break;
            };

            video.frame_number = sequence;
            video.timestamp_us = sequence * 1_000_000 / u64::from(self.target_fps);

            self.intake.send(PipelineItem::Unit(AvUnit {
                sequence,
                video,
                audio,
                created_at: Instant::now(),
            }))?;
            sequence += 1;

            // Sources that are always ready must not monopolize the
            // scheduler while filling an unbounded buffer.
            tokio::task::yield_now().await;
        }

        self.intake.send(PipelineItem::EndOfStream)?;
        tracing::info!(units = sequence, "producer finished");
        Ok(ProducerReport {
            units: sequence,
            audio_samples: self.slicer.samples_emitted(),
        })
    }
}
