//! Session diagnostics
//!
//! Each session owns one diagnostics channel with an explicit lifecycle:
//! created when the session starts, closed when the pipeline workers drop
//! their send handles. Events are serde-serializable (JSONL-friendly) and
//! mirrored to `tracing` so the channel can go unconsumed without losing
//! observability.

use serde::Serialize;
use tokio::sync::mpsc;

/// A diagnostic event emitted by the pipeline
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// Periodic proof-of-life from the pacer: cumulative streamed
    /// duration vs. wall clock, plus buffer occupancy
    Heartbeat {
        /// Units released so far
        released: u64,
        /// Paced playback duration streamed so far, in seconds
        streamed_secs: f64,
        /// Wall-clock seconds since the pacer started
        elapsed_secs: f64,
        /// Buffer A occupancy (generation backlog)
        intake_depth: usize,
        /// Buffer B occupancy (lead-ahead cushion fill)
        output_depth: usize,
    },

    /// Buffer A was empty past the stall threshold while a release was
    /// due: the producer is not keeping up. Recoverable.
    GenerationUnderrun {
        /// Producer sequence number the pacer is waiting for
        next_sequence: u64,
        /// How long the pacer had already waited when it gave up, ms
        waited_ms: u64,
    },

    /// The producer caught up after an underrun (pause policy)
    UnderrunRecovered {
        /// Producer sequence number that ended the stall
        next_sequence: u64,
        /// Total stall duration in milliseconds
        stalled_ms: u64,
    },

    /// A degraded unit (repeated video, silent audio) was released to
    /// keep cadence during an underrun (silence-fill policy)
    SilenceFilled {
        /// Consumer-visible sequence number of the synthesized unit
        sequence: u64,
    },

    /// The stream completed and the sentinel was released downstream
    StreamComplete {
        /// Total units released, synthesized fillers included
        released: u64,
        /// Total audio samples released
        audio_samples: u64,
    },
}

/// Send half of a session's diagnostics channel
#[derive(Clone)]
pub struct DiagnosticsSender {
    tx: mpsc::UnboundedSender<DiagnosticEvent>,
}

/// Receive half of a session's diagnostics channel
pub type DiagnosticsReceiver = mpsc::UnboundedReceiver<DiagnosticEvent>;

/// Create a diagnostics channel for one session
pub fn channel() -> (DiagnosticsSender, DiagnosticsReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (DiagnosticsSender { tx }, rx)
}

impl DiagnosticsSender {
    /// Emit an event. Mirrors to `tracing` and ignores a dropped
    /// receiver — diagnostics consumption is optional.
    pub fn emit(&self, event: DiagnosticEvent) {
        match &event {
            DiagnosticEvent::Heartbeat {
                streamed_secs,
                elapsed_secs,
                intake_depth,
                output_depth,
                ..
            } => tracing::info!(
                streamed_secs,
                elapsed_secs,
                intake_depth,
                output_depth,
                "pacer heartbeat"
            ),
            DiagnosticEvent::GenerationUnderrun {
                next_sequence,
                waited_ms,
            } => tracing::warn!(next_sequence, waited_ms, "generation underrun"),
            DiagnosticEvent::UnderrunRecovered {
                next_sequence,
                stalled_ms,
            } => tracing::info!(next_sequence, stalled_ms, "underrun recovered"),
            DiagnosticEvent::SilenceFilled { sequence } => {
                tracing::warn!(sequence, "released silence-filled unit")
            }
            DiagnosticEvent::StreamComplete {
                released,
                audio_samples,
            } => tracing::info!(released, audio_samples, "stream complete"),
        }
        let _ = self.tx.send(event);
    }
}
