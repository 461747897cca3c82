//! framepacer - fixed-cadence pacing for generated audio/video streams
//!
//! Machine generators produce frames at whatever rate inference allows,
//! often far faster than real time; playback needs a strict fixed
//! cadence with audio and video aligned sample-for-sample. This crate
//! decouples the two with a three-stage pipeline:
//!
//! ```text
//! generator → Producer → Buffer A (unbounded) → Pacer → Buffer B (bounded) → Consumer → transport
//! ```
//!
//! The Producer runs as fast as its sources allow. The Pacer is the sole
//! clock: it drains Buffer A at exactly one unit per frame interval,
//! keeps a lead-ahead cushion staged in Buffer B, and reports heartbeats
//! and underruns on a per-session diagnostics channel. The Consumer is a
//! blocking pull interface for the transport; its blocking is what holds
//! the remote peer to 1x real time.
//!
//! Audio/video alignment is sample-count arithmetic, never wall clock:
//! every unit carries exactly `sample_rate / target_fps` samples per
//! channel, so N units always cover exactly N frame intervals of audio.
//!
//! # Example
//!
//! ```ignore
//! use framepacer::{SessionConfig, StreamSession, TailPolicy};
//! use framepacer::sources::{FrameSequence, WavFileSource};
//!
//! #[tokio::main]
//! async fn main() -> framepacer::Result<()> {
//!     framepacer::init()?;
//!
//!     let frames = FrameSequence::new(load_frames()?, true)?;
//!     let audio = WavFileSource::open("audio.wav")?;
//!
//!     let (session, mut consumer, mut diagnostics) = StreamSession::start(
//!         SessionConfig::default(),
//!         Box::new(frames),
//!         Box::new(audio),
//!         TailPolicy::Stop,
//!     )?;
//!
//!     while let Some(unit) = consumer.pull_next_unit().await? {
//!         transport.send(unit).await?;
//!     }
//!     let summary = session.wait().await?;
//!     println!("streamed {} units", summary.pacer.released);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod pipeline;
pub mod session;
pub mod slicer;
pub mod sources;

mod error;

pub use config::{SessionConfig, StallPolicy};
pub use data::{AvUnit, PipelineItem, PixelFormat, VideoFrame};
pub use diagnostics::{DiagnosticEvent, DiagnosticsReceiver, DiagnosticsSender};
pub use error::{Error, Result};
pub use pipeline::Consumer;
pub use session::{SessionSummary, StreamSession};
pub use slicer::{AudioSlicer, TailPolicy};

/// Initialize logging for binaries embedding the pipeline.
///
/// Installs a `tracing_subscriber::fmt` subscriber honoring `RUST_LOG`,
/// defaulting to `info`. Call once at startup.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("framepacer initialized");
    Ok(())
}
