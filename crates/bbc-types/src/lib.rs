use serde::{Deserialize, Serialize};
use thiserror::Error;

/// High-level mode of the robot, as last written by the winning behavior.
///
/// Each deployment profile only ever produces a subset of these; the
/// arbitration loop itself never inspects the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotState {
    /// Initial state upon reset.
    #[default]
    Startup,
    /// Roaming around with the baseline forward command.
    Cruising,
    /// Steering towards a light source.
    Homing,
    /// Running the ballistic IR escape maneuver.
    IrAvoiding,
    /// Veering away from a sonar contact.
    SonarAvoiding,
    /// Holding a fixed distance from a wall.
    WallFollowing,
    /// Tracking a reflective line on the floor.
    LineFollowing,
    /// Reacting to a blob reported by the color camera.
    BlobFollowing,
}

/// The single shared motor command, overwritten in priority order every
/// iteration of the arbitration loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    pub state: RobotState,
    /// Signed step rate for the left wheel (negative = reverse).
    pub speed_left: i16,
    /// Signed step rate for the right wheel (negative = reverse).
    pub speed_right: i16,
    pub accel_left: u16,
    pub accel_right: u16,
}

impl Action {
    pub const fn new(
        state: RobotState,
        speed_left: i16,
        speed_right: i16,
        accel_left: u16,
        accel_right: u16,
    ) -> Self {
        Self {
            state,
            speed_left,
            speed_right,
            accel_left,
            accel_right,
        }
    }

    /// Return to `Startup` with both wheels stopped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Which side of the robot a sensor or wheel sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One detection reported by the color blob tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlobReading {
    /// Centroid column in image coordinates.
    pub x: u16,
    /// Centroid row in image coordinates.
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Color signature the tracker matched (1-based, 0 = none).
    pub signature: u8,
}

/// Latest readings from every sensor channel.
///
/// Each field is written by exactly one sensing task. Fields that have not
/// been sampled yet hold their zero value; use the accessor methods rather
/// than reading the raw distance directly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorFrame {
    pub left_ir: bool,
    pub right_ir: bool,

    pub left_photo_voltage: f32,
    pub right_photo_voltage: f32,
    /// Baseline captured once at startup.
    pub left_photo_ambient: f32,
    /// Baseline captured once at startup.
    pub right_photo_ambient: f32,

    /// Sonar range in centimeters; `<= 0` means no valid reading.
    pub sonar_distance_cm: f32,

    pub left_line_voltage: f32,
    pub right_line_voltage: f32,

    pub blob: BlobReading,
    /// Set when `blob` holds data the tracker has not yet been told is processed.
    pub blob_ready: bool,
}

impl SensorFrame {
    /// Sonar range, or `None` when the channel holds no valid echo.
    pub fn sonar_cm(&self) -> Option<f32> {
        (self.sonar_distance_cm > 0.0).then_some(self.sonar_distance_cm)
    }

    /// `true` when either proximity flag is raised.
    pub fn any_ir(&self) -> bool {
        self.left_ir || self.right_ir
    }
}

/// Error type shared by the HAL, kernel, and runtime crates.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BbcError {
    #[error("Collaborator Init Failed on {component}: {details}")]
    CollaboratorInit { component: String, details: String },

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Missing Driver: {0}")]
    MissingDriver(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl BbcError {
    /// Shorthand for a [`BbcError::HardwareFault`].
    pub fn fault(component: &str, details: impl Into<String>) -> Self {
        BbcError::HardwareFault {
            component: component.to_string(),
            details: details.into(),
        }
    }
}
