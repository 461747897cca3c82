//! Session configuration
//!
//! All pacing parameters are fixed for the lifetime of a session; changing
//! them mid-session is not supported. `SessionConfig::validate()` runs
//! before any worker is spawned so a bad combination never reaches the
//! pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Behavior when Buffer A is empty past the stall threshold while the
/// pacer is due to release (a generation underrun).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallPolicy {
    /// Wait for the producer to catch up. The pacer emits a
    /// `GenerationUnderrun` event, then blocks on Buffer A; on recovery
    /// the release clock is re-anchored so the backlog is not flushed in
    /// a burst.
    Pause,
    /// Keep the release cadence exact by synthesizing degraded units:
    /// the previous frame's video with a silent audio slice, one per
    /// missed tick. Falls back to `Pause` before the first real unit.
    SilenceFill,
}

/// Configuration for one streaming session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Target playback frame rate (default: 25)
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,

    /// Audio sample rate in Hz (default: 48000). Must be divisible by
    /// `target_fps` so each frame covers a whole number of samples.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Interleaved audio channels (default: 1)
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Frames the pacer keeps pre-staged in Buffer B ahead of actual
    /// consumption (default: 12). Buffer B capacity is this plus one
    /// slot of slack for the unit currently being served.
    #[serde(default = "default_lead_ahead_frames")]
    pub lead_ahead_frames: usize,

    /// How long the pacer waits on an empty Buffer A before reporting a
    /// generation underrun, in milliseconds (default: 200)
    #[serde(default = "default_stall_threshold_ms")]
    pub stall_threshold_ms: u64,

    /// Underrun policy (default: `Pause`)
    #[serde(default = "default_stall_policy")]
    pub stall_policy: StallPolicy,

    /// Heartbeat interval in released frames. `None` means once per
    /// second of paced playback (i.e. every `target_fps` frames).
    #[serde(default)]
    pub heartbeat_interval_frames: Option<u32>,
}

fn default_target_fps() -> u32 {
    25
}
fn default_sample_rate() -> u32 {
    48_000
}
fn default_channels() -> u16 {
    1
}
fn default_lead_ahead_frames() -> usize {
    12
}
fn default_stall_threshold_ms() -> u64 {
    200
}
fn default_stall_policy() -> StallPolicy {
    StallPolicy::Pause
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            lead_ahead_frames: default_lead_ahead_frames(),
            stall_threshold_ms: default_stall_threshold_ms(),
            stall_policy: default_stall_policy(),
            heartbeat_interval_frames: None,
        }
    }
}

impl SessionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.target_fps == 0 {
            return Err(Error::InvalidConfig("target_fps must be non-zero".into()));
        }
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfig("sample_rate must be non-zero".into()));
        }
        if self.channels == 0 {
            return Err(Error::InvalidConfig("channels must be non-zero".into()));
        }
        if self.sample_rate % self.target_fps != 0 {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} is not divisible by target_fps {}; \
                 frames would not cover a whole number of samples",
                self.sample_rate, self.target_fps
            )));
        }
        if self.lead_ahead_frames == 0 {
            return Err(Error::InvalidConfig(
                "lead_ahead_frames must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Interleaved samples per video frame. Exact integer arithmetic
    /// (e.g. 48000 / 25 = 1920); this is the quantity the anti-drift
    /// invariant is stated in.
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate / self.target_fps) as usize * self.channels as usize
    }

    /// Display duration of one frame
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps
    }

    /// Resolved heartbeat interval in frames
    pub fn heartbeat_every(&self) -> u64 {
        self.heartbeat_interval_frames
            .filter(|n| *n > 0)
            .map(u64::from)
            .unwrap_or(u64::from(self.target_fps))
    }

    /// Buffer B capacity: the lead-ahead cushion plus one slot of slack
    pub fn output_capacity(&self) -> usize {
        self.lead_ahead_frames + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.target_fps, 25);
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.lead_ahead_frames, 12);
        assert_eq!(config.samples_per_frame(), 1920);
        assert_eq!(config.frame_interval(), Duration::from_millis(40));
        assert_eq!(config.heartbeat_every(), 25);
        assert_eq!(config.output_capacity(), 13);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"target_fps": 30, "sample_rate": 48000}"#).unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.lead_ahead_frames, 12);
        assert_eq!(config.stall_policy, StallPolicy::Pause);
        assert_eq!(config.samples_per_frame(), 1600);
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_non_divisible_rate() {
        let config = SessionConfig {
            target_fps: 24,
            sample_rate: 44_100,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_fields() {
        for config in [
            SessionConfig {
                target_fps: 0,
                ..Default::default()
            },
            SessionConfig {
                sample_rate: 0,
                ..Default::default()
            },
            SessionConfig {
                channels: 0,
                ..Default::default()
            },
            SessionConfig {
                lead_ahead_frames: 0,
                ..Default::default()
            },
        ] {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_stereo_samples_per_frame() {
        let config = SessionConfig {
            channels: 2,
            ..Default::default()
        };
        assert_eq!(config.samples_per_frame(), 3840);
    }

    #[test]
    fn test_stall_policy_serde() {
        let policy: StallPolicy = serde_json::from_str(r#""silence_fill""#).unwrap();
        assert_eq!(policy, StallPolicy::SilenceFill);
    }
}
