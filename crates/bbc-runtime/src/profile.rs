//! Deployment profiles.
//!
//! A profile fixes, at composition time, which sensing tasks run and which
//! behaviors take part in arbitration (in ascending priority).  The core loop
//! never looks at the profile; it only sees the lists built here.
//!
//! | profile  | sensing                 | behaviors (low → high)                           |
//! |----------|-------------------------|--------------------------------------------------|
//! | `homing` | IR, photo, sonar        | cruise, light-follow, sonar-avoid, IR-avoid      |
//! | `line`   | IR, line                | cruise, line-follow, IR-avoid                    |
//! | `wall`   | IR, sonar               | cruise, wall-follow, IR-avoid                    |
//! | `blob`   | IR, blob                | blob-follow                                      |
//!
//! With `blob.roam` set, the blob profile becomes cruise, blob-follow,
//! IR-avoid, using the blob robot's own cruise speed and quarter turn.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arbiter::{Arbiter, ArbiterBuilder};
use crate::behaviors::{
    BlobFollow, Cruise, IrAvoid, LightFollow, LineFollow, SonarAvoid, WallFollow,
};
use crate::config::ArbiterConfig;
use crate::sensing::{BlobSensing, IrSensing, LineSensing, PhotoSensing, SonarSensing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Light homing with sonar and IR avoidance.
    #[default]
    Homing,
    /// Reflective line tracking with IR avoidance.
    Line,
    /// Sonar wall following with IR avoidance.
    Wall,
    /// Color blob reactions.
    Blob,
}

impl Profile {
    pub const ALL: [Profile; 4] = [Profile::Homing, Profile::Line, Profile::Wall, Profile::Blob];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Homing => "homing",
            Profile::Line => "line",
            Profile::Wall => "wall",
            Profile::Blob => "blob",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a profile name does not match any known profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown profile '{0}' (expected one of: homing, line, wall, blob)")]
pub struct UnknownProfile(pub String);

impl FromStr for Profile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownProfile(s.to_string()))
    }
}

/// Compose an [`Arbiter`] for `config.profile`, tuned by `config`.
pub fn build_arbiter(config: &ArbiterConfig) -> Arbiter {
    let ir = IrSensing::new(ms(config.intervals.ir_ms));
    let builder = Arbiter::builder()
        .startup_delay(ms(config.startup_delay_ms))
        .loop_delay(ms(config.loop_delay_ms))
        .sensing(Box::new(ir));

    let builder = match config.profile {
        Profile::Homing => homing(builder, config),
        Profile::Line => line(builder, config),
        Profile::Wall => wall(builder, config),
        Profile::Blob => blob(builder, config),
    };
    builder.build()
}

fn homing(builder: ArbiterBuilder, config: &ArbiterConfig) -> ArbiterBuilder {
    builder
        .sensing(Box::new(PhotoSensing::new(
            ms(config.intervals.photo_ms),
            config.channels.left_photo,
            config.channels.right_photo,
        )))
        .sensing(Box::new(SonarSensing::new(ms(config.intervals.sonar_ms))))
        .behavior(Box::new(Cruise::new(&config.cruise)))
        .behavior(Box::new(LightFollow::new(&config.light)))
        .behavior(Box::new(SonarAvoid::new(&config.sonar_avoid)))
        .behavior(Box::new(IrAvoid::new(&config.ir_avoid)))
}

fn line(builder: ArbiterBuilder, config: &ArbiterConfig) -> ArbiterBuilder {
    builder
        .sensing(Box::new(LineSensing::new(
            ms(config.intervals.line_ms),
            config.channels.left_line,
            config.channels.right_line,
        )))
        .behavior(Box::new(Cruise::new(&config.cruise)))
        .behavior(Box::new(LineFollow::new(&config.line)))
        .behavior(Box::new(IrAvoid::new(&config.ir_avoid)))
}

fn wall(builder: ArbiterBuilder, config: &ArbiterConfig) -> ArbiterBuilder {
    builder
        .sensing(Box::new(SonarSensing::new(ms(config.intervals.sonar_ms))))
        .behavior(Box::new(Cruise::new(&config.cruise)))
        .behavior(Box::new(WallFollow::new(&config.wall)))
        .behavior(Box::new(IrAvoid::new(&config.ir_avoid)))
}

fn blob(builder: ArbiterBuilder, config: &ArbiterConfig) -> ArbiterBuilder {
    let builder = builder.sensing(Box::new(BlobSensing::new(ms(config.intervals.blob_ms))));
    if !config.blob.roam {
        return builder.behavior(Box::new(BlobFollow::new(&config.blob)));
    }
    builder
        .behavior(Box::new(Cruise::new(&config.cruise)))
        .behavior(Box::new(BlobFollow::new(&config.blob)))
        .behavior(Box::new(IrAvoid::new(&config.ir_avoid)))
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("homing".parse::<Profile>(), Ok(Profile::Homing));
        assert_eq!(" LINE ".parse::<Profile>(), Ok(Profile::Line));
        assert_eq!("Blob".parse::<Profile>(), Ok(Profile::Blob));
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let err = "dance".parse::<Profile>().unwrap_err();
        assert_eq!(err, UnknownProfile("dance".into()));
        assert!(err.to_string().contains("dance"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for p in Profile::ALL {
            assert_eq!(p.to_string().parse::<Profile>(), Ok(p));
        }
    }

    fn names(config: &ArbiterConfig) -> (Vec<&'static str>, Vec<&'static str>) {
        let arbiter = build_arbiter(config);
        (arbiter.sensing_names(), arbiter.behavior_names())
    }

    #[test]
    fn homing_composition() {
        let (sensing, behaviors) = names(&ArbiterConfig::for_profile(Profile::Homing));
        assert_eq!(sensing, vec!["ir", "photo", "sonar"]);
        assert_eq!(
            behaviors,
            vec!["cruise", "light_follow", "sonar_avoid", "ir_avoid"]
        );
    }

    #[test]
    fn line_and_wall_compositions() {
        let (sensing, behaviors) = names(&ArbiterConfig::for_profile(Profile::Line));
        assert_eq!(sensing, vec!["ir", "line"]);
        assert_eq!(behaviors, vec!["cruise", "line_follow", "ir_avoid"]);

        let (sensing, behaviors) = names(&ArbiterConfig::for_profile(Profile::Wall));
        assert_eq!(sensing, vec!["ir", "sonar"]);
        assert_eq!(behaviors, vec!["cruise", "wall_follow", "ir_avoid"]);
    }

    #[test]
    fn blob_composition_has_loop_delay() {
        let config = ArbiterConfig::for_profile(Profile::Blob);
        let arbiter = build_arbiter(&config);
        assert_eq!(arbiter.sensing_names(), vec!["ir", "blob"]);
        assert_eq!(arbiter.behavior_names(), vec!["blob_follow"]);
        assert_eq!(arbiter.loop_delay(), Duration::from_millis(20));
    }

    #[test]
    fn roaming_blob_composition_uses_blob_tuning() {
        use bbc_hal::sim::{MotorCall, SimWorld};
        use bbc_types::{RobotState, Side};

        let mut config = ArbiterConfig::for_profile(Profile::Blob);
        config.blob.roam = true;
        config.startup_delay_ms = 0;
        let (sensing, behaviors) = names(&config);
        assert_eq!(sensing, vec!["ir", "blob"]);
        assert_eq!(behaviors, vec!["cruise", "blob_follow", "ir_avoid"]);

        let world = SimWorld::new();
        let mut hw = world.peripherals();
        let mut arbiter = build_arbiter(&config);
        arbiter.start(&mut hw).unwrap();
        arbiter.tick(&mut hw);
        assert_eq!(arbiter.action().state, RobotState::Cruising);
        assert_eq!(arbiter.action().speed_left, 100);

        world.set_proximity(Side::Right, true);
        world.advance(Duration::from_millis(125));
        world.take_motor_calls();
        arbiter.tick(&mut hw);
        let turn = world
            .take_motor_calls()
            .into_iter()
            .filter_map(|c| match c {
                MotorCall::Move { left, .. } => Some(left.steps),
                _ => None,
            })
            .last();
        assert_eq!(turn, Some(150));
    }
}
