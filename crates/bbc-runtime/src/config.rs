//! Tuning for every sensing task and behavior.
//!
//! Every field has a default, so an empty TOML document deserializes to the
//! `homing` profile with its stock tuning.  [`ArbiterConfig::for_profile`]
//! returns the stock tuning of another profile.

use serde::{Deserialize, Serialize};

use bbc_types::BbcError;

use crate::profile::Profile;

/// Top-level arbitration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbiterConfig {
    #[serde(default)]
    pub profile: Profile,

    /// Blocking delay between "Starting..." and the first iteration.
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,

    /// Blocking delay at the end of every iteration (0 = none).
    #[serde(default)]
    pub loop_delay_ms: u64,

    #[serde(default)]
    pub intervals: IntervalConfig,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub cruise: CruiseConfig,
    #[serde(default)]
    pub light: LightFollowConfig,
    #[serde(default)]
    pub sonar_avoid: SonarAvoidConfig,
    #[serde(default)]
    pub wall: WallFollowConfig,
    #[serde(default)]
    pub line: LineFollowConfig,
    #[serde(default)]
    pub ir_avoid: IrAvoidConfig,
    #[serde(default)]
    pub blob: BlobFollowConfig,
}

fn default_startup_delay_ms() -> u64 {
    3000
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            startup_delay_ms: default_startup_delay_ms(),
            loop_delay_ms: 0,
            intervals: IntervalConfig::default(),
            channels: ChannelConfig::default(),
            cruise: CruiseConfig::default(),
            light: LightFollowConfig::default(),
            sonar_avoid: SonarAvoidConfig::default(),
            wall: WallFollowConfig::default(),
            line: LineFollowConfig::default(),
            ir_avoid: IrAvoidConfig::default(),
            blob: BlobFollowConfig::default(),
        }
    }
}

impl ArbiterConfig {
    /// Stock tuning for `profile`.
    ///
    /// The robots used for line and wall following cruise slower (150) than
    /// the homing robot (200).  The blob tracker runs a 20 ms iteration
    /// delay; its slower cruise (100) and wider quarter turn (150 steps) only
    /// take effect with `blob.roam`.
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self {
            profile,
            ..Self::default()
        };
        match profile {
            Profile::Homing => {}
            Profile::Line | Profile::Wall => config.cruise.speed = 150,
            Profile::Blob => {
                config.cruise.speed = 100;
                config.ir_avoid.quarter_turn_steps = 150;
                config.loop_delay_ms = 20;
            }
        }
        config
    }

    /// Reject tunings the behaviors cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`BbcError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), BbcError> {
        if self.line.exit_threshold <= self.line.line_threshold {
            return Err(BbcError::Config(format!(
                "line.exit_threshold ({}) must be above line.line_threshold ({})",
                self.line.exit_threshold, self.line.line_threshold
            )));
        }
        if self.ir_avoid.maneuver_speed == 0 {
            return Err(BbcError::Config(
                "ir_avoid.maneuver_speed must be non-zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.light.threshold_fraction) {
            return Err(BbcError::Config(format!(
                "light.threshold_fraction ({}) must be within 0..=1",
                self.light.threshold_fraction
            )));
        }
        if self.sonar_avoid.trigger_cm <= 0.0 {
            return Err(BbcError::Config(
                "sonar_avoid.trigger_cm must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sampling period of each sensing task, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub ir_ms: u64,
    pub photo_ms: u64,
    pub sonar_ms: u64,
    pub line_ms: u64,
    pub blob_ms: u64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            ir_ms: 125,
            photo_ms: 250,
            sonar_ms: 100,
            line_ms: 10,
            blob_ms: 0,
        }
    }
}

/// Analog multiplexer channel of each analog sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub left_photo: u8,
    pub right_photo: u8,
    pub left_line: u8,
    pub right_line: u8,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            left_photo: 6,
            right_photo: 4,
            left_line: 6,
            right_line: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CruiseConfig {
    pub speed: i16,
    pub accel: u16,
}

impl Default for CruiseConfig {
    fn default() -> Self {
        Self {
            speed: 200,
            accel: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightFollowConfig {
    pub base_speed: f32,
    /// Fraction of the headroom above ambient the mean brightness must clear.
    pub threshold_fraction: f32,
}

impl Default for LightFollowConfig {
    fn default() -> Self {
        Self {
            base_speed: 200.0,
            threshold_fraction: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarAvoidConfig {
    pub base_speed: f32,
    /// Contacts closer than this trigger the veer.
    pub trigger_cm: f32,
}

impl Default for SonarAvoidConfig {
    fn default() -> Self {
        Self {
            base_speed: 200.0,
            trigger_cm: 85.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallFollowConfig {
    pub base_speed: i32,
    pub goal_cm: f32,
    pub kp: f32,
    pub kd: f32,
}

impl Default for WallFollowConfig {
    fn default() -> Self {
        Self {
            base_speed: 150,
            // Ten inches plus the sensor setback, seen at 45 degrees.
            goal_cm: (25.4 + 10.0) * 1.41,
            kp: 0.5,
            kd: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineFollowConfig {
    pub base_speed: i32,
    /// Both channels below this (volts) → start following.
    pub line_threshold: f32,
    /// Both channels above this (volts) → stop following.
    pub exit_threshold: f32,
    /// Subtracted from the right channel before comparing sides.
    pub right_offset: f32,
    pub kp: f32,
    pub kd: f32,
}

impl Default for LineFollowConfig {
    fn default() -> Self {
        Self {
            base_speed: 150,
            line_threshold: 1.5,
            exit_threshold: 3.0,
            right_offset: 1.5,
            kp: 70.0,
            kd: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrAvoidConfig {
    /// Step rate of every leg of the maneuver.
    pub maneuver_speed: u16,
    pub maneuver_accel: u16,
    /// Back-off after a single-side trip.
    pub reverse_steps: u16,
    /// Back-off after both sides trip.
    pub reverse_steps_both: u16,
    /// In-place turn after a single-side trip.
    pub quarter_turn_steps: u16,
    /// In-place turn after both sides trip.
    pub escape_turn_steps: u16,
    /// Command left in place once the maneuver completes.
    pub forward_speed: i16,
    pub forward_accel: u16,
}

impl Default for IrAvoidConfig {
    fn default() -> Self {
        Self {
            maneuver_speed: 200,
            maneuver_accel: 400,
            reverse_steps: 250,
            reverse_steps_both: 500,
            quarter_turn_steps: 135,
            escape_turn_steps: 175,
            forward_speed: 200,
            forward_accel: 400,
        }
    }
}

/// One entry of the signature → audio cue table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureCue {
    pub signature: u8,
    pub sequence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobFollowConfig {
    /// Print centroid, size, and signature of each detection on the LCD.
    pub show_detections: bool,
    /// Also cruise and run the IR escape around blob reactions.
    pub roam: bool,
    pub cues: Vec<SignatureCue>,
}

impl Default for BlobFollowConfig {
    fn default() -> Self {
        Self {
            show_detections: false,
            roam: false,
            cues: (1..=3)
                .map(|n| SignatureCue {
                    signature: n,
                    sequence: n,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_homing_robot() {
        let config = ArbiterConfig::default();
        assert_eq!(config.profile, Profile::Homing);
        assert_eq!(config.startup_delay_ms, 3000);
        assert_eq!(config.loop_delay_ms, 0);
        assert_eq!(config.intervals.ir_ms, 125);
        assert_eq!(config.intervals.sonar_ms, 100);
        assert_eq!(config.cruise.speed, 200);
        assert!((config.wall.goal_cm - 49.914).abs() < 1e-3);
        assert_eq!(config.blob.cues.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn profile_specific_tuning() {
        assert_eq!(ArbiterConfig::for_profile(Profile::Line).cruise.speed, 150);
        assert_eq!(ArbiterConfig::for_profile(Profile::Wall).cruise.speed, 150);

        let blob = ArbiterConfig::for_profile(Profile::Blob);
        assert_eq!(blob.profile, Profile::Blob);
        assert_eq!(blob.cruise.speed, 100);
        assert_eq!(blob.ir_avoid.quarter_turn_steps, 150);
        assert_eq!(blob.loop_delay_ms, 20);
        assert!(!blob.blob.roam);
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let config: ArbiterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ArbiterConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: ArbiterConfig =
            serde_json::from_str(r#"{"profile":"line","line":{"kp":50.0}}"#).unwrap();
        assert_eq!(config.profile, Profile::Line);
        assert_eq!(config.line.kp, 50.0);
        assert_eq!(config.line.kd, 100.0);
        assert_eq!(config.line.exit_threshold, 3.0);
    }

    #[test]
    fn inverted_line_thresholds_are_rejected() {
        let mut config = ArbiterConfig::default();
        config.line.exit_threshold = 1.0;
        assert!(matches!(config.validate(), Err(BbcError::Config(_))));
    }

    #[test]
    fn zero_maneuver_speed_is_rejected() {
        let mut config = ArbiterConfig::default();
        config.ir_avoid.maneuver_speed = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("maneuver_speed"));
    }
}
