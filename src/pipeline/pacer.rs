//! Pacer: stage 2, the valve
//!
//! The single source of playback timing. Drains Buffer A at a strictly
//! metered rate and releases into Buffer B, keeping the lead-ahead
//! cushion full without ever varying the release cadence.
//!
//! Scheduling is driven by an absolute due time advanced by a fixed
//! increment (`next_due += frame_interval`), never by `now + interval`,
//! so scheduler jitter cannot accumulate into drift. The order of waits
//! per tick is: Buffer B room first (cushion cap / memory bound), then
//! due time, then Buffer A (where an empty buffer past the stall
//! threshold is a genuine generation underrun).

use crate::config::{SessionConfig, StallPolicy};
use crate::data::{AvUnit, PipelineItem, VideoFrame};
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSender};
use crate::error::{Error, Result};
use crate::pipeline::buffers::{BufferDepth, IntakeReceiver, OutputSender};
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Summary returned when the pacer finishes
#[derive(Debug, Clone, Copy)]
pub struct PacerReport {
    /// Units released into Buffer B, synthesized fillers included
    pub released: u64,
    /// Degraded units synthesized under the silence-fill policy
    pub silence_filled: u64,
    /// Generation underruns observed
    pub underruns: u64,
}

/// The scheduling worker between Buffer A and Buffer B
pub struct Pacer {
    intake: IntakeReceiver,
    output: OutputSender,
    diagnostics: DiagnosticsSender,
    intake_depth: BufferDepth,
    output_depth: BufferDepth,
    frame_interval: Duration,
    target_fps: u32,
    samples_per_frame: usize,
    stall_threshold: Duration,
    policy: StallPolicy,
    heartbeat_every: u64,
}

impl Pacer {
    /// Assemble a pacer over its buffer ends and diagnostics handle
    pub fn new(
        intake: IntakeReceiver,
        output: OutputSender,
        diagnostics: DiagnosticsSender,
        intake_depth: BufferDepth,
        output_depth: BufferDepth,
        config: &SessionConfig,
    ) -> Self {
        Self {
            intake,
            output,
            diagnostics,
            intake_depth,
            output_depth,
            frame_interval: config.frame_interval(),
            target_fps: config.target_fps,
            samples_per_frame: config.samples_per_frame(),
            stall_threshold: Duration::from_millis(config.stall_threshold_ms),
            policy: config.stall_policy,
            heartbeat_every: config.heartbeat_every(),
        }
    }

    /// Run until the end-of-stream sentinel passes through
    pub async fn run(mut self) -> Result<PacerReport> {
        let start = Instant::now();
        let mut next_due = start;
        // Producer-assigned sequence expected next from Buffer A.
        let mut expected_in: u64 = 0;
        // Shift applied to outgoing sequence numbers once silence fillers
        // exist, so the consumer still observes a contiguous stream.
        let mut seq_offset: u64 = 0;
        let mut released: u64 = 0;
        let mut silence_filled: u64 = 0;
        let mut underruns: u64 = 0;
        let mut last_video: Option<VideoFrame> = None;
        // Set while silence-filling through an underrun; cleared as soon
        // as Buffer A yields a real unit again.
        let mut filling_since: Option<Instant> = None;

        tracing::debug!("pacer started, clock anchored");

        'ticks: loop {
            // 1. Room in the cushion
            let permit = self.output.reserve().await?;
            // 2. Due time
            tokio::time::sleep_until(next_due).await;

            // 3a. Mid-underrun under silence fill: poll Buffer A without
            // waiting, so fillers keep the frame cadence instead of
            // re-paying the stall threshold on every tick.
            let mut fetched = None;
            if let Some(since) = filling_since {
                match self.intake.try_recv()? {
                    Some(item) => {
                        filling_since = None;
                        self.diagnostics.emit(DiagnosticEvent::UnderrunRecovered {
                            next_sequence: expected_in,
                            stalled_ms: since.elapsed().as_millis() as u64,
                        });
                        fetched = Some(item);
                    }
                    None => {
                        if let Some(video) = last_video.clone() {
                            let sequence = expected_in + seq_offset;
                            seq_offset += 1;
                            permit.send(PipelineItem::Unit(self.filler(video, sequence)));
                            released += 1;
                            silence_filled += 1;
                            self.diagnostics
                                .emit(DiagnosticEvent::SilenceFilled { sequence });
                            self.maybe_heartbeat(released, start);
                            next_due += self.frame_interval;
                            continue 'ticks;
                        }
                        filling_since = None;
                    }
                }
            }

            // 3b. Next unit from Buffer A, with underrun detection
            let item = match fetched {
                Some(item) => item,
                None => loop {
                    match timeout(self.stall_threshold, self.intake.recv()).await {
                        Ok(Some(item)) => break item,
                        Ok(None) => return Err(Error::ChannelClosed("intake")),
                        Err(_) => {
                            underruns += 1;
                            self.diagnostics.emit(DiagnosticEvent::GenerationUnderrun {
                                next_sequence: expected_in,
                                waited_ms: self.stall_threshold.as_millis() as u64,
                            });

                            if self.policy == StallPolicy::SilenceFill {
                                if let Some(video) = last_video.clone() {
                                    // The stall began one threshold ago,
                                    // when this tick started waiting.
                                    filling_since = Some(
                                        Instant::now()
                                            .checked_sub(self.stall_threshold)
                                            .unwrap_or_else(Instant::now),
                                    );
                                    let sequence = expected_in + seq_offset;
                                    seq_offset += 1;
                                    permit.send(PipelineItem::Unit(self.filler(video, sequence)));
                                    released += 1;
                                    silence_filled += 1;
                                    self.diagnostics
                                        .emit(DiagnosticEvent::SilenceFilled { sequence });
                                    self.maybe_heartbeat(released, start);
                                    // The missed ticks are gone; fillers
                                    // resume cadence from now.
                                    next_due = Instant::now() + self.frame_interval;
                                    continue 'ticks;
                                }
                                // Nothing released yet, so nothing to
                                // repeat: fall through to the pause
                                // behavior.
                            }

                            let stall_start = Instant::now();
                            match self.intake.recv().await {
                                Some(item) => {
                                    let stalled = self.stall_threshold + stall_start.elapsed();
                                    self.diagnostics.emit(DiagnosticEvent::UnderrunRecovered {
                                        next_sequence: expected_in,
                                        stalled_ms: stalled.as_millis() as u64,
                                    });
                                    // Re-anchor the clock: resume cadence
                                    // from now instead of flushing the
                                    // missed ticks in a burst.
                                    next_due = Instant::now();
                                    break item;
                                }
                                None => return Err(Error::ChannelClosed("intake")),
                            }
                        }
                    }
                },
            };

            match item {
                PipelineItem::EndOfStream => {
                    // 4. (sentinel) release downstream and finish
                    permit.send(PipelineItem::EndOfStream);
                    self.diagnostics.emit(DiagnosticEvent::StreamComplete {
                        released,
                        audio_samples: released * self.samples_per_frame as u64,
                    });
                    tracing::info!(released, silence_filled, underruns, "pacer finished");
                    return Ok(PacerReport {
                        released,
                        silence_filled,
                        underruns,
                    });
                }
                PipelineItem::Unit(mut unit) => {
                    unit.validate(expected_in, self.samples_per_frame)?;
                    expected_in += 1;
                    unit.sequence += seq_offset;
                    unit.video.frame_number = unit.sequence;
                    last_video = Some(unit.video.clone());

                    // 4. Release
                    permit.send(PipelineItem::Unit(unit));
                    released += 1;
                    self.maybe_heartbeat(released, start);

                    // 5. Fixed-increment advance, drift-free
                    next_due += self.frame_interval;
                }
            }
        }
    }

    fn maybe_heartbeat(&self, released: u64, start: Instant) {
        if released % self.heartbeat_every != 0 {
            return;
        }
        self.diagnostics.emit(DiagnosticEvent::Heartbeat {
            released,
            streamed_secs: released as f64 / f64::from(self.target_fps),
            elapsed_secs: start.elapsed().as_secs_f64(),
            intake_depth: self.intake_depth.get(),
            output_depth: self.output_depth.get(),
        });
    }

    /// Degraded unit for the silence-fill policy: previous frame's video
    /// with a silent slice of the exact per-frame length
    fn filler(&self, mut video: VideoFrame, sequence: u64) -> AvUnit {
        video.frame_number = sequence;
        video.timestamp_us = sequence * 1_000_000 / u64::from(self.target_fps);
        AvUnit {
            sequence,
            video,
            audio: vec![0.0; self.samples_per_frame],
            created_at: Instant::now(),
        }
    }
}
