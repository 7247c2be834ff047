//! Rover control state.

use serde::{Deserialize, Serialize};

use crate::core::STEER_RANGE_DEG;

/// Drive mode of the rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveMode {
    /// Driving toward navigable terrain.
    #[default]
    Forward,

    /// Braking to a halt, or halted and deciding what to do next.
    Stop,
}

impl DriveMode {
    /// Convert to string for telemetry.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveMode::Forward => "FORWARD",
            DriveMode::Stop => "STOP",
        }
    }
}

/// Stuck escalation level.
///
/// One explicit tagged state instead of two booleans, so the reachable
/// set is auditable: NotStuck -> Stuck (turn toward the escape
/// heading) -> StuckAgain (turn while reversing). Clearing always goes
/// straight back to NotStuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StuckLevel {
    /// Making normal progress.
    #[default]
    NotStuck,

    /// No displacement over a debounce window; escaping by turning.
    Stuck,

    /// Turning did not free the rover; escaping in reverse.
    StuckAgain,
}

impl StuckLevel {
    /// Is any stuck level active?
    #[inline]
    pub fn is_stuck(&self) -> bool {
        !matches!(self, StuckLevel::NotStuck)
    }

    /// The next level after another failed window.
    pub fn escalated(self) -> Self {
        match self {
            StuckLevel::NotStuck => StuckLevel::Stuck,
            StuckLevel::Stuck | StuckLevel::StuckAgain => StuckLevel::StuckAgain,
        }
    }
}

/// The persistent control state, reset only at mission start.
///
/// Owned jointly by the stuck detector (stuck level, turning flag,
/// opposite heading) and the drive controller (mode, actuation
/// outputs, pickup request); the terrain statistics read the turning
/// flag, held hard-turn bearing, and previous throttle.
#[derive(Debug, Clone)]
pub struct RoverState {
    /// Current drive mode.
    pub mode: DriveMode,
    /// A four-wheel turn is in progress; bearing decisions hold their
    /// direction while set.
    pub turning: bool,
    /// Stuck escalation level.
    pub stuck: StuckLevel,
    /// Escape heading stored on stuck entry, degrees in [0, 360).
    pub opposite_heading: f32,
    /// Held evasive bearing, ±15°.
    pub hard_turn: f32,
    /// Completed stuck entries this mission. Escalation is unbounded;
    /// hosts can watch this counter to impose their own abort policy.
    pub stuck_episodes: u32,

    /// Commanded throttle (negative = reverse).
    pub throttle: f32,
    /// Commanded brake (>= 0).
    pub brake: f32,
    /// Commanded steer angle, degrees in [-15, 15].
    pub steer: f32,
    /// Pickup request pending delivery to the sample mechanism.
    pub send_pickup: bool,
}

impl RoverState {
    /// Mission-start state: forward mode, everything released.
    pub fn new() -> Self {
        Self {
            mode: DriveMode::Forward,
            turning: false,
            stuck: StuckLevel::NotStuck,
            opposite_heading: 0.0,
            hard_turn: STEER_RANGE_DEG,
            stuck_episodes: 0,
            throttle: 0.0,
            brake: 0.0,
            steer: 0.0,
            send_pickup: false,
        }
    }

    /// Reset to mission-start state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for RoverState {
    fn default() -> Self {
        Self::new()
    }
}
