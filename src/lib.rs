//! # AnveshaNav
//!
//! Perception and decision core for the Anvesha sample-return rover.
//!
//! ## Overview
//!
//! Once per control tick the core consumes a forward-facing camera
//! frame plus pose telemetry and produces low-level actuation:
//! throttle, brake, steer angle, drive mode, and a sample-pickup
//! request. Two subsystems run back to back:
//!
//! - **Perception**: perspective un-warp into a top-down view,
//!   color-band classification into navigable/obstacle/rock masks,
//!   projection into rover and world frames, accumulation into a
//!   persistent confidence grid, and reduction to scalar terrain
//!   statistics.
//! - **Decision**: a forward/stop mode machine with turning and stuck
//!   escalation layered on top, including a displacement-window stuck
//!   detector and a 180° escape maneuver with reverse fallback.
//!
//! Camera capture, simulator transport, rendering, and the pickup
//! mechanism itself are external collaborators.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use anvesha_nav::{RoverConfig, RoverCore, RoverPose, TickInput};
//!
//! let mut core = RoverCore::new(RoverConfig::default())?;
//!
//! // Each telemetry tick:
//! let command = core.tick(TickInput {
//!     frame,
//!     pose: RoverPose::new(99.7, 85.6, 0.0, 0.0),
//!     total_time: telemetry.total_time,
//!     picking_up: telemetry.picking_up,
//!     near_sample: telemetry.near_sample,
//! });
//!
//! actuator.send(command.throttle, command.brake, command.steer);
//! ```
//!
//! ## Coordinate System
//!
//! Rover frame: X forward, Y left, bearings counter-clockwise from
//! forward (positive = left). Telemetry angles are degrees; roll and
//! pitch read near 0° or near 360° when level.
//!
//! ## Concurrency
//!
//! Single-threaded and tick-driven. [`RoverCore`] owns the only
//! cross-tick mutable state (world map and control state); ticks must
//! be processed in arrival order, since stuck timing and map
//! confidence both depend on the previous tick.

pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod grid;
pub mod perception;

use image::RgbImage;

pub use config::RoverConfig;
pub use control::{decadegree_bucket, DriveMode, RoverState, StuckDetector, StuckLevel};
pub use core::{GridCoord, PolarPoint, RoverPoint, RoverPose, WorldPoint, STEER_RANGE_DEG};
pub use error::{AnveshaError, Result};
pub use grid::{pose_is_stable, CellCounts, MapCoverage, WorldMap};
pub use perception::{
    classify, PerspectiveWarp, TerrainMask, TerrainMasks, TerrainSummary,
};

/// Telemetry input for one control tick.
///
/// The frame is owned by the tick that consumes it; nothing in the
/// core retains image data across ticks.
#[derive(Clone, Debug)]
pub struct TickInput {
    /// Camera frame at the configured dimensions.
    pub frame: RgbImage,
    /// Pose telemetry.
    pub pose: RoverPose,
    /// Elapsed mission time in seconds.
    pub total_time: f64,
    /// The pickup mechanism is currently cycling.
    pub picking_up: bool,
    /// Telemetry reports a sample within pickup range.
    pub near_sample: bool,
}

/// Actuation command produced by one control tick.
#[derive(Clone, Copy, Debug)]
pub struct Actuation {
    /// Throttle command; negative values drive in reverse.
    pub throttle: f32,
    /// Brake command, >= 0.
    pub brake: f32,
    /// Steer angle in degrees, within [-15, 15].
    pub steer: f32,
    /// Drive mode after this tick's transitions.
    pub mode: DriveMode,
    /// Request the sample mechanism to pick up.
    pub send_pickup: bool,
}

/// The rover's perception-and-decision core.
///
/// This is the primary type for driving the rover: construct it once
/// from calibration, then feed it one [`TickInput`] per telemetry tick
/// and forward the returned [`Actuation`] to the actuators.
pub struct RoverCore {
    config: RoverConfig,
    warp: PerspectiveWarp,
    map: WorldMap,
    state: RoverState,
    stuck: StuckDetector,
}

impl RoverCore {
    /// Create a core from calibration.
    ///
    /// Fails if the perspective calibration is degenerate.
    pub fn new(config: RoverConfig) -> Result<Self> {
        let warp = PerspectiveWarp::new(&config.perspective)?;
        let map = WorldMap::new(config.map.world_size);
        let stuck = StuckDetector::new(&config.stuck);

        Ok(Self {
            config,
            warp,
            map,
            state: RoverState::new(),
            stuck,
        })
    }

    /// Run one full perception -> aggregation -> decision pass.
    pub fn tick(&mut self, input: TickInput) -> Actuation {
        // Once the mechanism reports it is cycling, the pending
        // request has been delivered.
        if input.picking_up {
            self.state.send_pickup = false;
        }

        let warped = self.warp.apply(&input.frame);
        let masks = perception::classify(&warped, &self.config.color);

        let nav = perception::rover_points(&masks.navigable);
        let obstacle = perception::rover_points(&masks.obstacle);
        let rock = perception::rover_points(&masks.rock);

        let scale = self.config.map.world_scale;
        let world_size = self.config.map.world_size;
        let nav_world = perception::to_world(&nav, &input.pose, scale, world_size);
        let obstacle_world = perception::to_world(&obstacle, &input.pose, scale, world_size);
        let rock_world = perception::to_world(&rock, &input.pose, scale, world_size);

        self.map.observe(
            &input.pose,
            &self.config.map,
            &obstacle_world,
            &rock_world,
            &nav_world,
        );

        let summary = TerrainSummary::compute(
            &nav,
            &rock,
            &nav_world,
            &self.map,
            &self.state,
            &input.pose,
            &self.config,
        );
        self.state.hard_turn = summary.hard_turn_deg;

        self.stuck.update(
            &mut self.state,
            &input.pose,
            input.total_time,
            input.picking_up,
        );

        control::decide(
            &mut self.state,
            &summary,
            &input.pose,
            input.picking_up,
            input.near_sample,
            &self.config,
        );

        Actuation {
            throttle: self.state.throttle,
            brake: self.state.brake,
            steer: self.state.steer,
            mode: self.state.mode,
            send_pickup: self.state.send_pickup,
        }
    }

    /// The world confidence map.
    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    /// The persistent control state.
    pub fn state(&self) -> &RoverState {
        &self.state
    }

    /// Mutable control state, for host-driven overrides.
    pub fn state_mut(&mut self) -> &mut RoverState {
        &mut self.state
    }

    /// The active configuration.
    pub fn config(&self) -> &RoverConfig {
        &self.config
    }

    /// Reset to mission start: clears the map, the control state, and
    /// the stuck baseline.
    pub fn reset(&mut self) {
        self.map.clear();
        self.state.reset();
        self.stuck.reset();
    }
}
