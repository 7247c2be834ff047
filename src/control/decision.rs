//! The per-tick drive decision procedure.
//!
//! A two-mode machine (forward / stop) with an orthogonal turning flag
//! and the stuck level layered on top. Mode handling runs first, then
//! the stuck-recovery override, then the pickup trigger, and the steer
//! command is clamped last — every path through here yields a fully
//! defined (throttle, brake, steer, mode, pickup) tuple.
//!
//! Reads: the full terrain summary, pose velocity and yaw, the pickup
//! flags. Writes on `RoverState`: mode, turning, stuck, throttle,
//! brake, steer, send_pickup.

use log::{debug, info};

use crate::config::RoverConfig;
use crate::control::stuck::decadegree_bucket;
use crate::control::{DriveMode, RoverState, StuckLevel};
use crate::core::{RoverPose, STEER_RANGE_DEG};
use crate::perception::TerrainSummary;

/// Decide this tick's actuation from the terrain summary.
pub fn decide(
    state: &mut RoverState,
    summary: &TerrainSummary,
    pose: &RoverPose,
    picking_up: bool,
    near_sample: bool,
    config: &RoverConfig,
) {
    let drive = &config.drive;
    let prev_steer = state.steer;

    match state.mode {
        DriveMode::Forward => {
            if summary.nav_count >= drive.stop_forward {
                // Path looks open: throttle up to the set-point, coast
                // once at max velocity.
                state.brake = 0.0;
                state.throttle = if pose.velocity < drive.max_velocity {
                    drive.throttle_set
                } else {
                    0.0
                };

                state.steer = if summary.rock_count > 1 {
                    if summary.rock_nearby {
                        // Head straight for the sample
                        summary.rock_bearing_deg.unwrap_or(0.0)
                    } else {
                        // Split the difference between the sample and
                        // the open terrain until it gets close
                        (summary.rock_bearing_deg.unwrap_or(0.0)
                            + summary.nav_bearing_deg.unwrap_or(0.0))
                            / 2.0
                    }
                } else if summary.collision_risk {
                    summary.hard_turn_deg
                } else if summary.uncharted_count > drive.unmapped_blend_count {
                    // Bias toward territory the map has not confirmed
                    (summary.nav_bearing_deg.unwrap_or(0.0)
                        + 2.0 * summary.uncharted_bearing_deg.unwrap_or(0.0))
                        / 3.0
                        * drive.steer_dampener
                } else {
                    summary.nav_bearing_deg.unwrap_or(0.0) * drive.steer_dampener
                };

                // A sample within pickup range: coast to a stop on it.
                if let Some(rock_min) = summary.rock_distance_min {
                    if rock_min <= drive.rock_pickup_range {
                        state.throttle = 0.0;
                        state.brake = 0.0;
                        state.steer = 0.0;
                        state.mode = DriveMode::Stop;
                        debug!("forward -> stop: sample in pickup range ({:.1})", rock_min);
                    }
                }

                // Ran into something: full brake and let the stuck
                // recovery take over.
                if summary.impact {
                    state.throttle = 0.0;
                    state.brake = drive.brake_set;
                    state.steer = 0.0;
                    state.mode = DriveMode::Stop;
                    if state.stuck == StuckLevel::NotStuck {
                        state.stuck = StuckLevel::Stuck;
                        state.opposite_heading = (pose.yaw + 180.0).rem_euclid(360.0);
                        info!(
                            "Impact detected, backing out toward {:.0}°",
                            state.opposite_heading
                        );
                    }
                }
            } else {
                // Navigable terrain collapsed under us: hard stop.
                state.throttle = 0.0;
                state.brake = drive.brake_set;
                state.steer = 0.0;
                state.mode = DriveMode::Stop;
                debug!(
                    "forward -> stop: only {} navigable points",
                    summary.nav_count
                );
            }
        }

        DriveMode::Stop => {
            if pose.velocity > 0.1 {
                // Still rolling: keep braking.
                state.throttle = 0.0;
                state.brake = drive.brake_set;
                state.steer = 0.0;
            } else {
                // Halted. Release the brake so the wheels can turn in
                // place, then decide where to go.
                state.brake = 0.0;
                state.steer = 0.0;
                state.throttle = 0.0;

                if !state.send_pickup && !picking_up {
                    if summary.rock_nearby {
                        state.steer = summary.rock_bearing_deg.unwrap_or(0.0);
                        match summary.rock_distance_min {
                            Some(d) if d > drive.rock_pickup_range => {
                                // Close the gap to the sample
                                state.throttle = drive.throttle_set;
                                state.mode = DriveMode::Forward;
                                state.turning = false;
                                debug!("stop -> forward: approaching sample at {:.1}", d);
                            }
                            _ => {
                                // In range: hold for pickup
                                state.brake = drive.brake_set;
                            }
                        }
                    } else if summary.nav_count < drive.go_forward {
                        // Not enough open terrain ahead: four-wheel
                        // turn until a path opens up. An in-progress
                        // turn at full lock keeps its direction.
                        state.throttle = 0.0;
                        if prev_steer != -STEER_RANGE_DEG && prev_steer != STEER_RANGE_DEG {
                            state.steer = summary.hard_turn_deg;
                        } else {
                            state.steer = prev_steer;
                        }
                        state.turning = true;
                    } else {
                        // Enough open terrain: go.
                        state.throttle = drive.throttle_set;
                        state.steer = summary.nav_bearing_deg.unwrap_or(0.0);
                        state.mode = DriveMode::Forward;
                        state.turning = false;
                        debug!(
                            "stop -> forward: {} navigable points",
                            summary.nav_count
                        );
                    }
                }
            }
        }
    }

    // Stuck recovery overrides whatever the mode logic decided: turn
    // (or reverse, on a repeat episode) until the escape heading is
    // reached.
    if state.stuck.is_stuck() && !picking_up && !state.send_pickup {
        state.throttle = 0.0;
        state.brake = 0.0;
        if state.stuck == StuckLevel::StuckAgain {
            state.throttle = config.stuck.reverse_throttle;
        }
        state.steer = STEER_RANGE_DEG;
        if decadegree_bucket(pose.yaw) == decadegree_bucket(state.opposite_heading) {
            state.stuck = StuckLevel::NotStuck;
            info!("Escape heading reached at yaw {:.0}°", pose.yaw);
        }
    }

    // Pickup trigger, independent of mode: only from a dead stop.
    if near_sample && pose.velocity == 0.0 && !picking_up {
        state.send_pickup = true;
        state.stuck = StuckLevel::NotStuck;
        info!("Requesting sample pickup");
    }

    state.steer = state.steer.clamp(-STEER_RANGE_DEG, STEER_RANGE_DEG);
}
