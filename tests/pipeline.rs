//! End-to-end pipeline tests over virtual time.
//!
//! All timing assertions run under tokio's paused clock, so release
//! instants are deterministic and the tests complete in milliseconds of
//! real time regardless of how much stream time they cover.

use async_trait::async_trait;
use framepacer::sources::{FrameSequence, FrameSource, MemoryAudioSource, SilenceSource};
use framepacer::{
    AvUnit, DiagnosticEvent, PixelFormat, Result, SessionConfig, StallPolicy, StreamSession,
    TailPolicy, VideoFrame,
};
use std::time::Duration;
use tokio::time::Instant;

fn frames(n: usize) -> Vec<VideoFrame> {
    (0..n)
        .map(|i| VideoFrame::filled(8, 8, PixelFormat::Rgb24, i as u8))
        .collect()
}

fn tone(units: usize) -> MemoryAudioSource {
    MemoryAudioSource::new(vec![0.25; units * 1920])
}

/// Frame source that sleeps per frame, like a real generator. An
/// always-ready source would let virtual time stand still forever.
struct ThrottledFrames {
    inner: FrameSequence,
    delay: Duration,
}

#[async_trait]
impl FrameSource for ThrottledFrames {
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        tokio::time::sleep(self.delay).await;
        self.inner.next_frame().await
    }
}

/// Frame source that generates quickly, hangs once mid-stream, then
/// finishes. Drains Buffer A dry so the pacer observes a real underrun.
struct StallingFrames {
    frames: Vec<VideoFrame>,
    next: usize,
    stall_before: usize,
    stall: Duration,
}

#[async_trait]
impl FrameSource for StallingFrames {
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        if self.next >= self.frames.len() {
            return Ok(None);
        }
        if self.next == self.stall_before {
            tokio::time::sleep(self.stall).await;
        } else {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let frame = self.frames[self.next].clone();
        self.next += 1;
        Ok(Some(frame))
    }
}

async fn pull_all(
    consumer: &mut framepacer::Consumer,
    start: Instant,
) -> Vec<(AvUnit, Duration)> {
    let mut pulled = Vec::new();
    while let Some(unit) = consumer.pull_next_unit().await.unwrap() {
        pulled.push((unit, start.elapsed()));
    }
    pulled
}

/// A burst of 250 instantly generated frames must come out at exactly
/// 1x: 10 seconds of stream time, one unit per 40ms tick, with the
/// audio accounting landing on the sample.
#[tokio::test(start_paused = true)]
async fn test_instant_burst_is_released_at_real_time() {
    let start = Instant::now();
    let (session, mut consumer, mut diag) = StreamSession::start(
        SessionConfig::default(),
        Box::new(FrameSequence::new(frames(250), false).unwrap()),
        Box::new(tone(250)),
        TailPolicy::Stop,
    )
    .unwrap();

    let pulled = pull_all(&mut consumer, start).await;
    assert_eq!(pulled.len(), 250);

    let mut audio_samples = 0u64;
    for (i, (unit, at)) in pulled.iter().enumerate() {
        assert_eq!(unit.sequence, i as u64);
        assert_eq!(unit.video.frame_number, i as u64);
        assert_eq!(unit.audio.len(), 1920);
        audio_samples += unit.audio.len() as u64;

        let due = Duration::from_millis(40) * i as u32;
        assert!(*at >= due, "unit {} released early at {:?}", i, at);
        assert!(
            *at < due + Duration::from_millis(5),
            "unit {} released late at {:?}",
            i,
            at
        );
    }
    // 250 frames at 48kHz / 25fps is exactly 10s of audio.
    assert_eq!(audio_samples, 480_000);
    assert!(pulled[24].1 >= Duration::from_millis(960));

    // Idempotent after end-of-stream.
    assert!(consumer.pull_next_unit().await.unwrap().is_none());

    let summary = session.wait().await.unwrap();
    assert_eq!(summary.producer.units, 250);
    assert_eq!(summary.producer.audio_samples, 480_000);
    assert_eq!(summary.pacer.released, 250);
    assert_eq!(summary.pacer.silence_filled, 0);
    assert_eq!(summary.pacer.underruns, 0);

    let mut heartbeats = 0;
    let mut complete = false;
    while let Some(event) = diag.recv().await {
        match event {
            DiagnosticEvent::Heartbeat { released, .. } => {
                assert_eq!(released % 25, 0);
                heartbeats += 1;
            }
            DiagnosticEvent::StreamComplete {
                released,
                audio_samples,
            } => {
                assert_eq!(released, 250);
                assert_eq!(audio_samples, 480_000);
                complete = true;
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!(heartbeats, 10);
    assert!(complete);
}

/// With the consumer idle, Buffer B fills to the lead-ahead cushion and
/// stops there; under steady consumption it refills one-for-one and
/// never exceeds capacity.
#[tokio::test(start_paused = true)]
async fn test_cushion_is_bounded_by_lead_ahead() {
    let config = SessionConfig::default();
    let (session, mut consumer, _diag) = StreamSession::start(
        config.clone(),
        Box::new(ThrottledFrames {
            inner: FrameSequence::new(frames(4), true).unwrap(),
            delay: Duration::from_millis(1),
        }),
        Box::new(SilenceSource),
        TailPolicy::PadSilence,
    )
    .unwrap();

    // Consumer idles: the pacer stages lead_ahead + 1 units, then blocks
    // on the full buffer rather than racing ahead.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(session.output_depth(), config.output_capacity());

    // Steady 1x consumption: each pull frees one slot and the pacer
    // refills it; occupancy never exceeds capacity.
    for i in 0..50u64 {
        let unit = consumer.pull_next_unit().await.unwrap().unwrap();
        assert_eq!(unit.sequence, i);
        tokio::time::sleep(Duration::from_millis(40)).await;
        let depth = session.output_depth();
        assert!(
            depth <= config.output_capacity(),
            "cushion overflowed: {}",
            depth
        );
        assert!(depth >= config.lead_ahead_frames, "cushion drained: {}", depth);
    }

    session.shutdown();
}

/// Pause policy: a mid-stream generation stall is reported, playback
/// holds, and cadence resumes from recovery with no catch-up burst.
#[tokio::test(start_paused = true)]
async fn test_stall_pauses_and_recovers_without_burst() {
    let start = Instant::now();
    let (session, mut consumer, mut diag) = StreamSession::start(
        SessionConfig::default(),
        Box::new(StallingFrames {
            frames: frames(10),
            next: 0,
            stall_before: 5,
            stall: Duration::from_secs(1),
        }),
        Box::new(tone(10)),
        TailPolicy::Stop,
    )
    .unwrap();

    let pulled = pull_all(&mut consumer, start).await;
    assert_eq!(pulled.len(), 10);
    for (i, (unit, _)) in pulled.iter().enumerate() {
        assert_eq!(unit.sequence, i as u64);
        assert_eq!(unit.audio.len(), 1920);
    }

    // Playback held through the stall instead of skipping or bursting.
    let stall_gap = pulled[5].1 - pulled[4].1;
    assert!(
        stall_gap >= Duration::from_millis(500),
        "stall not reflected in release gap: {:?}",
        stall_gap
    );

    // Cadence before and after the stall is one frame interval.
    for window in [&pulled[1..5], &pulled[6..10]] {
        for pair in window.windows(2) {
            let gap = pair[1].1 - pair[0].1;
            assert!(gap >= Duration::from_millis(40), "burst release: {:?}", gap);
            assert!(gap < Duration::from_millis(45), "late release: {:?}", gap);
        }
    }

    let summary = session.wait().await.unwrap();
    assert_eq!(summary.pacer.released, 10);
    assert_eq!(summary.pacer.underruns, 1);
    assert_eq!(summary.pacer.silence_filled, 0);

    let mut underruns = 0;
    let mut recovered = 0;
    while let Some(event) = diag.recv().await {
        match event {
            DiagnosticEvent::GenerationUnderrun {
                next_sequence,
                waited_ms,
            } => {
                assert_eq!(next_sequence, 5);
                assert_eq!(waited_ms, 200);
                underruns += 1;
            }
            DiagnosticEvent::UnderrunRecovered { stalled_ms, .. } => {
                assert!(stalled_ms >= 500, "stall too short: {}ms", stalled_ms);
                recovered += 1;
            }
            _ => {}
        }
    }
    assert_eq!(underruns, 1);
    assert_eq!(recovered, 1);
}

/// Silence-fill policy: the same stall is bridged with degraded units at
/// exact cadence, and the consumer-visible stream stays contiguous.
#[tokio::test(start_paused = true)]
async fn test_stall_is_bridged_by_silence_fill() {
    let start = Instant::now();
    let (session, mut consumer, _diag) = StreamSession::start(
        SessionConfig {
            stall_policy: StallPolicy::SilenceFill,
            ..Default::default()
        },
        Box::new(StallingFrames {
            frames: frames(10),
            next: 0,
            stall_before: 5,
            stall: Duration::from_secs(1),
        }),
        Box::new(tone(10)),
        TailPolicy::Stop,
    )
    .unwrap();

    let pulled = pull_all(&mut consumer, start).await;

    // Contiguous despite the synthesized units in the middle.
    for (i, (unit, _)) in pulled.iter().enumerate() {
        assert_eq!(unit.sequence, i as u64);
        assert_eq!(unit.audio.len(), 1920);
    }

    // Real audio in this test is a nonzero constant, so all-silent audio
    // identifies the fillers.
    let filler_range: Vec<usize> = pulled
        .iter()
        .enumerate()
        .filter(|(_, (unit, _))| unit.audio.iter().all(|&s| s == 0.0))
        .map(|(i, _)| i)
        .collect();
    assert!(!filler_range.is_empty(), "stall produced no fillers");
    assert_eq!(pulled.len(), 10 + filler_range.len());

    // Fillers sit in one contiguous run right after the last real unit
    // before the stall, and repeat its video.
    let first = filler_range[0];
    assert_eq!(first, 5);
    for (offset, &i) in filler_range.iter().enumerate() {
        assert_eq!(i, first + offset);
        assert_eq!(pulled[i].0.video.pixel_data, pulled[4].0.video.pixel_data);
    }
    // The first real unit after recovery carries the next generated frame.
    let resume = first + filler_range.len();
    assert_eq!(pulled[resume].0.video.pixel_data[0], 5);

    // Fillers keep the frame cadence once the underrun is detected.
    for pair in pulled[first..resume].windows(2) {
        let gap = pair[1].1 - pair[0].1;
        assert!(gap >= Duration::from_millis(40), "filler burst: {:?}", gap);
        assert!(gap < Duration::from_millis(45), "filler gap: {:?}", gap);
    }

    let summary = session.wait().await.unwrap();
    assert_eq!(summary.pacer.released, pulled.len() as u64);
    assert_eq!(summary.pacer.silence_filled, filler_range.len() as u64);
    assert_eq!(summary.pacer.underruns, 1);
}

/// Heartbeats tick once per second of paced playback and agree with the
/// wall clock.
#[tokio::test(start_paused = true)]
async fn test_heartbeats_track_streamed_time() {
    let start = Instant::now();
    let (session, mut consumer, mut diag) = StreamSession::start(
        SessionConfig::default(),
        Box::new(FrameSequence::new(frames(60), false).unwrap()),
        Box::new(tone(60)),
        TailPolicy::Stop,
    )
    .unwrap();

    let pulled = pull_all(&mut consumer, start).await;
    assert_eq!(pulled.len(), 60);
    session.wait().await.unwrap();

    let mut heartbeats = Vec::new();
    while let Some(event) = diag.recv().await {
        if let DiagnosticEvent::Heartbeat {
            released,
            streamed_secs,
            elapsed_secs,
            ..
        } = event
        {
            heartbeats.push((released, streamed_secs, elapsed_secs));
        }
    }

    assert_eq!(heartbeats.len(), 2);
    assert_eq!(heartbeats[0].0, 25);
    assert_eq!(heartbeats[0].1, 1.0);
    assert_eq!(heartbeats[1].0, 50);
    assert_eq!(heartbeats[1].1, 2.0);
    for (_, streamed, elapsed) in &heartbeats {
        assert!(
            (streamed - elapsed).abs() < 0.1,
            "streamed {}s vs elapsed {}s",
            streamed,
            elapsed
        );
    }
}

/// Under the stop policy a short audio tail yields one final zero-padded
/// slice and then ends the stream, keeping the per-unit sample count
/// exact to the last unit even though video frames remain.
#[tokio::test(start_paused = true)]
async fn test_short_audio_tail_is_padded_then_stream_ends() {
    let start = Instant::now();
    let (session, mut consumer, _diag) = StreamSession::start(
        SessionConfig::default(),
        Box::new(FrameSequence::new(frames(30), false).unwrap()),
        Box::new(MemoryAudioSource::new(vec![0.25; 20 * 1920 + 960])),
        TailPolicy::Stop,
    )
    .unwrap();

    let pulled = pull_all(&mut consumer, start).await;
    assert_eq!(pulled.len(), 21);

    let (last, _) = &pulled[20];
    assert_eq!(last.audio.len(), 1920);
    assert!(last.audio[..960].iter().all(|&s| s == 0.25));
    assert!(last.audio[960..].iter().all(|&s| s == 0.0));

    let summary = session.wait().await.unwrap();
    assert_eq!(summary.producer.units, 21);
    assert_eq!(summary.producer.audio_samples, 21 * 1920);
}
