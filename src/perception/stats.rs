//! Terrain statistics: per-tick scalar signals for the drive controller.
//!
//! Every reduction here runs over a possibly-empty point set, so every
//! mean/min is `Option`-typed; `None` is the explicit "no data"
//! sentinel and each consumer states its own fallback. Bearings are
//! averaged in degrees and the *mean* is clipped to the steer range —
//! not the individual samples — except for the unmapped-territory
//! bias, which filters samples to the steer range before averaging.
//! Both orders are calibrated behavior and deliberately preserved.

use crate::config::RoverConfig;
use crate::control::RoverState;
use crate::core::{GridCoord, RoverPoint, RoverPose, STEER_RANGE_DEG};
use crate::grid::WorldMap;

/// Bearing half-width of the frontal clearance cone, degrees.
const FRONT_CONE_DEG: f32 = 3.0;

/// Scalar terrain signals derived from one tick's classified points.
///
/// Recomputed fully every tick and never persisted; the only
/// cross-tick inputs are the previous actuation (for the impact flag)
/// and the turning flag (for hard-turn direction holding).
#[derive(Clone, Debug, Default)]
pub struct TerrainSummary {
    /// Number of navigable-terrain points seen this tick.
    pub nav_count: usize,
    /// Mean navigable bearing, degrees, clipped to the steer range.
    pub nav_bearing_deg: Option<f32>,

    /// Number of rock-sample points seen this tick.
    pub rock_count: usize,
    /// Mean rock bearing, degrees, clipped to the steer range.
    pub rock_bearing_deg: Option<f32>,
    /// Mean rock distance; a single pixel is treated as noise, so this
    /// requires at least two rock points.
    pub rock_distance_mean: Option<f32>,
    /// Minimum rock distance, same two-point requirement.
    pub rock_distance_min: Option<f32>,
    /// Rock close enough to divert toward.
    pub rock_nearby: bool,

    /// Mean distance of navigable points within the frontal cone.
    pub front_clearance: Option<f32>,
    /// Frontal clearance shrank below the obstacle distance while at
    /// max velocity.
    pub collision_risk: bool,
    /// Commanded forward motion produced backward velocity.
    pub impact: bool,

    /// Mean bearing of navigable points whose world cell the map has
    /// not yet confirmed.
    pub uncharted_bearing_deg: Option<f32>,
    /// Number of points behind that mean.
    pub uncharted_count: usize,

    /// The ±15° evasive bearing; held while a turn is in progress.
    pub hard_turn_deg: f32,
}

impl TerrainSummary {
    /// Reduce this tick's classified point sets to controller signals.
    ///
    /// `nav_world` must be index-aligned with `nav` (the projection in
    /// [`crate::perception::to_world`] guarantees this); the alignment
    /// pairs each navigable point with the map cell it lands in.
    ///
    /// Reads from `state`: the previous commanded throttle, the
    /// turning flag, and the held hard-turn bearing. Writes nothing.
    pub fn compute(
        nav: &[RoverPoint],
        rock: &[RoverPoint],
        nav_world: &[GridCoord],
        map: &WorldMap,
        state: &RoverState,
        pose: &RoverPose,
        config: &RoverConfig,
    ) -> Self {
        let mut summary = TerrainSummary {
            nav_count: nav.len(),
            rock_count: rock.len(),
            ..TerrainSummary::default()
        };

        // Navigable bearings and frontal clearance in one pass.
        let mut bearing_sum = 0.0f32;
        let mut front_sum = 0.0f32;
        let mut front_n = 0usize;
        for p in nav {
            let polar = p.to_polar();
            let deg = polar.bearing_deg();
            bearing_sum += deg;
            if deg > -FRONT_CONE_DEG && deg < FRONT_CONE_DEG {
                front_sum += polar.distance;
                front_n += 1;
            }
        }
        if !nav.is_empty() {
            summary.nav_bearing_deg =
                Some((bearing_sum / nav.len() as f32).clamp(-STEER_RANGE_DEG, STEER_RANGE_DEG));
        }
        if front_n > 0 {
            let front = front_sum / front_n as f32;
            summary.front_clearance = Some(front);
            summary.collision_risk =
                front <= config.drive.obstacle_distance && pose.velocity >= config.drive.max_velocity;
        }

        // Rock bearing and distances.
        let mut rock_bearing_sum = 0.0f32;
        let mut rock_dist_sum = 0.0f32;
        let mut rock_dist_min = f32::INFINITY;
        for p in rock {
            let polar = p.to_polar();
            rock_bearing_sum += polar.bearing_deg();
            rock_dist_sum += polar.distance;
            rock_dist_min = rock_dist_min.min(polar.distance);
        }
        if !rock.is_empty() {
            summary.rock_bearing_deg = Some(
                (rock_bearing_sum / rock.len() as f32).clamp(-STEER_RANGE_DEG, STEER_RANGE_DEG),
            );
        }
        if rock.len() > 1 {
            let mean = rock_dist_sum / rock.len() as f32;
            summary.rock_distance_mean = Some(mean);
            summary.rock_distance_min = Some(rock_dist_min);
            summary.rock_nearby = mean < config.drive.rock_proximity;
        }

        // Bearing bias toward territory the map has not yet confirmed.
        // Samples outside the steer range are dropped before averaging.
        let mut uncharted_sum = 0.0f32;
        let mut uncharted_n = 0usize;
        for (p, cell) in nav.iter().zip(nav_world) {
            if map.navigable_hits(*cell) >= config.map.novelty_threshold {
                continue;
            }
            let deg = p.bearing().to_degrees();
            if (-STEER_RANGE_DEG..=STEER_RANGE_DEG).contains(&deg) {
                uncharted_sum += deg;
                uncharted_n += 1;
            }
        }
        if uncharted_n > 0 {
            summary.uncharted_bearing_deg = Some(uncharted_sum / uncharted_n as f32);
            summary.uncharted_count = uncharted_n;
        }

        // Hard-turn direction holds for the duration of a turn, and
        // holds its last value when there is no navigable mean to
        // derive a new one from.
        summary.hard_turn_deg = if state.turning {
            state.hard_turn
        } else {
            match summary.nav_bearing_deg {
                Some(b) if b > 0.0 => STEER_RANGE_DEG,
                Some(_) => -STEER_RANGE_DEG,
                None => state.hard_turn,
            }
        };

        // Forward command with backward motion means we hit something.
        summary.impact = state.throttle > 0.0 && pose.velocity < -0.2;

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoverConfig;
    use crate::control::RoverState;

    fn empty_world() -> WorldMap {
        WorldMap::new(200)
    }

    fn compute(
        nav: &[RoverPoint],
        rock: &[RoverPoint],
        state: &RoverState,
        pose: &RoverPose,
        config: &RoverConfig,
    ) -> TerrainSummary {
        // Park every navigable point on one far-corner cell; tests that
        // care about the map build their own alignment.
        let world = vec![GridCoord::new(0, 0); nav.len()];
        TerrainSummary::compute(nav, rock, &world, &empty_world(), state, pose, config)
    }

    #[test]
    fn test_empty_sets_are_safe() {
        let summary = compute(
            &[],
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );

        assert_eq!(summary.nav_count, 0);
        assert!(summary.nav_bearing_deg.is_none());
        assert!(summary.rock_distance_mean.is_none());
        assert!(summary.rock_distance_min.is_none());
        assert!(summary.front_clearance.is_none());
        assert!(!summary.rock_nearby);
        assert!(!summary.collision_risk);
    }

    #[test]
    fn test_single_rock_pixel_is_noise() {
        let rock = vec![RoverPoint::new(5.0, 0.0)];
        let summary = compute(
            &[],
            &rock,
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );

        assert_eq!(summary.rock_count, 1);
        assert!(summary.rock_bearing_deg.is_some());
        assert!(summary.rock_distance_mean.is_none());
        assert!(!summary.rock_nearby);
    }

    #[test]
    fn test_rock_nearby_needs_two_close_points() {
        let rock = vec![RoverPoint::new(5.0, 1.0), RoverPoint::new(6.0, -1.0)];
        let summary = compute(
            &[],
            &rock,
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );

        assert!(summary.rock_nearby);
        assert!(summary.rock_distance_min.unwrap() < summary.rock_distance_mean.unwrap() + 1.0);
    }

    #[test]
    fn test_mean_is_clipped_not_samples() {
        // Bearings ~+40 deg and ~-20 deg: mean ~10 stays inside the
        // range. Clipping each sample first would have produced
        // (15 - 15) / 2 = 0 instead.
        let nav = vec![
            RoverPoint::new(10.0, 10.0 * 40.0_f32.to_radians().tan()),
            RoverPoint::new(10.0, -10.0 * 20.0_f32.to_radians().tan()),
        ];
        let summary = compute(
            &nav,
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );

        let bearing = summary.nav_bearing_deg.unwrap();
        assert!((bearing - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_mean_clipped_when_outside_range() {
        // Two points far to the left: mean ~45 deg clips to +15.
        let nav = vec![RoverPoint::new(5.0, 5.0), RoverPoint::new(7.0, 7.0)];
        let summary = compute(
            &nav,
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );

        assert_eq!(summary.nav_bearing_deg.unwrap(), STEER_RANGE_DEG);
    }

    #[test]
    fn test_frontal_cone_filters_bearings() {
        // One point dead ahead at 10, one off to the side at 2.
        let nav = vec![RoverPoint::new(10.0, 0.0), RoverPoint::new(0.5, 2.0)];
        let summary = compute(
            &nav,
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );

        assert!((summary.front_clearance.unwrap() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_collision_requires_max_velocity() {
        let config = RoverConfig::default();
        // Frontal clearance below the obstacle distance
        let nav = vec![RoverPoint::new(5.0, 0.0), RoverPoint::new(6.0, 0.0)];

        let slow = compute(
            &nav,
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 1.0),
            &config,
        );
        assert!(!slow.collision_risk);

        let fast = compute(
            &nav,
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, config.drive.max_velocity),
            &config,
        );
        assert!(fast.collision_risk);
    }

    #[test]
    fn test_impact_flag() {
        let mut state = RoverState::new();
        state.throttle = 0.2;
        let summary = compute(
            &[],
            &[],
            &state,
            &RoverPose::new(0.0, 0.0, 0.0, -0.5),
            &RoverConfig::default(),
        );
        assert!(summary.impact);

        // No throttle, no impact
        state.throttle = 0.0;
        let summary = compute(
            &[],
            &[],
            &state,
            &RoverPose::new(0.0, 0.0, 0.0, -0.5),
            &RoverConfig::default(),
        );
        assert!(!summary.impact);
    }

    #[test]
    fn test_hard_turn_follows_nav_sign() {
        let left = vec![RoverPoint::new(5.0, 3.0)];
        let summary = compute(
            &left,
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );
        assert_eq!(summary.hard_turn_deg, STEER_RANGE_DEG);

        let right = vec![RoverPoint::new(5.0, -3.0)];
        let summary = compute(
            &right,
            &[],
            &RoverState::new(),
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );
        assert_eq!(summary.hard_turn_deg, -STEER_RANGE_DEG);
    }

    #[test]
    fn test_hard_turn_held_while_turning() {
        let mut state = RoverState::new();
        state.turning = true;
        state.hard_turn = -STEER_RANGE_DEG;

        // Navigable mean points left, but the in-progress turn keeps
        // its original direction.
        let left = vec![RoverPoint::new(5.0, 3.0)];
        let summary = compute(
            &left,
            &[],
            &state,
            &RoverPose::new(0.0, 0.0, 0.0, 0.0),
            &RoverConfig::default(),
        );
        assert_eq!(summary.hard_turn_deg, -STEER_RANGE_DEG);
    }

    #[test]
    fn test_uncharted_bias_drops_once_confirmed() {
        let mut config = RoverConfig::default();
        config.map.novelty_threshold = 1;

        let nav = vec![RoverPoint::new(10.0, 1.0)];
        let world = vec![GridCoord::new(50, 50)];
        let pose = RoverPose::new(0.0, 0.0, 0.0, 0.0);
        let state = RoverState::new();

        let empty = WorldMap::new(200);
        let summary =
            TerrainSummary::compute(&nav, &[], &world, &empty, &state, &pose, &config);
        assert_eq!(summary.uncharted_count, 1);
        assert!(summary.uncharted_bearing_deg.is_some());

        // Confirm the cell, bias disappears.
        let mut confirmed = WorldMap::new(200);
        confirmed.observe(&pose, &config.map, &[], &[], &world);
        let summary =
            TerrainSummary::compute(&nav, &[], &world, &confirmed, &state, &pose, &config);
        assert_eq!(summary.uncharted_count, 0);
        assert!(summary.uncharted_bearing_deg.is_none());
    }
}
