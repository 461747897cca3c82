//! Session lifecycle
//!
//! A [`StreamSession`] owns the producer and pacer tasks and the buffer
//! gauges; the [`Consumer`] and diagnostics receiver are handed to the
//! caller (the transport and its monitoring) at startup. One session is
//! one continuous live stream; every piece of state is per-session so
//! multiple sessions can coexist in a process.

use crate::config::SessionConfig;
use crate::diagnostics::{self, DiagnosticsReceiver};
use crate::error::{Error, Result};
use crate::pipeline::buffers::{intake_channel, output_channel, BufferDepth};
use crate::pipeline::{Consumer, Pacer, PacerReport, Producer, ProducerReport};
use crate::slicer::{AudioSlicer, TailPolicy};
use crate::sources::{AudioSource, FrameSource};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Final per-worker statistics, available once the session has drained
#[derive(Debug, Clone, Copy)]
pub struct SessionSummary {
    /// Producer-side counts
    pub producer: ProducerReport,
    /// Pacer-side counts
    pub pacer: PacerReport,
}

/// A running pipeline: producer and pacer tasks plus observability
/// handles
pub struct StreamSession {
    id: Uuid,
    producer_task: JoinHandle<Result<ProducerReport>>,
    pacer_task: JoinHandle<Result<PacerReport>>,
    intake_depth: BufferDepth,
    output_depth: BufferDepth,
}

impl StreamSession {
    /// Validate the config, wire the buffers, and spawn the workers.
    ///
    /// Returns the session handle together with the transport-facing
    /// [`Consumer`] and the diagnostics receiver.
    pub fn start(
        config: SessionConfig,
        frames: Box<dyn FrameSource>,
        audio: Box<dyn AudioSource>,
        tail: TailPolicy,
    ) -> Result<(Self, Consumer, DiagnosticsReceiver)> {
        config.validate()?;
        let id = Uuid::new_v4();

        let (diag_tx, diag_rx) = diagnostics::channel();
        let (intake_tx, intake_rx, intake_depth) = intake_channel();
        let (output_tx, output_rx, output_depth) = output_channel(config.output_capacity());

        let slicer = AudioSlicer::new(audio, config.samples_per_frame(), tail);
        let producer = Producer::new(frames, slicer, intake_tx, &config);
        let pacer = Pacer::new(
            intake_rx,
            output_tx,
            diag_tx,
            intake_depth.clone(),
            output_depth.clone(),
            &config,
        );
        let consumer = Consumer::new(output_rx, config.samples_per_frame());

        tracing::info!(
            session = %id,
            fps = config.target_fps,
            sample_rate = config.sample_rate,
            lead_ahead = config.lead_ahead_frames,
            "session started"
        );

        let producer_task =
            tokio::spawn(producer.run().instrument(tracing::info_span!("producer", session = %id)));
        let pacer_task =
            tokio::spawn(pacer.run().instrument(tracing::info_span!("pacer", session = %id)));

        Ok((
            Self {
                id,
                producer_task,
                pacer_task,
                intake_depth,
                output_depth,
            },
            consumer,
            diag_rx,
        ))
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Buffer A occupancy: how far ahead generation is of playback
    pub fn intake_depth(&self) -> usize {
        self.intake_depth.get()
    }

    /// Buffer B occupancy: lead-ahead cushion fill. Sitting at capacity
    /// while the consumer is idle is plain backpressure, not an error.
    pub fn output_depth(&self) -> usize {
        self.output_depth.get()
    }

    /// Join both workers and collect their summaries. Completes once the
    /// end-of-stream sentinel has propagated (or a worker failed).
    pub async fn wait(self) -> Result<SessionSummary> {
        let producer = self
            .producer_task
            .await
            .map_err(|e| Error::Task(e.to_string()))??;
        let pacer = self
            .pacer_task
            .await
            .map_err(|e| Error::Task(e.to_string()))??;
        tracing::info!(session = %self.id, "session drained");
        Ok(SessionSummary { producer, pacer })
    }

    /// Abort both workers immediately. For early teardown only; the
    /// consumer will observe a closed channel instead of end-of-stream.
    pub fn shutdown(&self) {
        self.producer_task.abort();
        self.pacer_task.abort();
        tracing::info!(session = %self.id, "session shut down");
    }
}
