//! Per-fighter kinematics against a building layout
//!
//! Order within a step: climb interpolation (exclusive), horizontal move,
//! ledge grab, wall contact, gravity + wall slide, vertical move, landing.

use super::state::{Building, Climb, Fighter};
use crate::consts::CLIMB_EPSILON;
use crate::tuning::PhysicsTuning;

/// What happened during a step (drives audio cues)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Touched down this step after being airborne or climbing
    pub landed: bool,
    /// Started a ledge climb this step
    pub grabbed_ledge: bool,
}

/// Where a fighter ends up after climbing the given face of `b`
fn mantle_x(b: &Building, fighter_width: f32, left_face: bool, inset: f32) -> f32 {
    if b.width < fighter_width + 2.0 * inset {
        return b.x + (b.width - fighter_width) / 2.0;
    }
    if left_face {
        b.x + inset
    } else {
        b.right() - fighter_width - inset
    }
}

/// Advance one fighter by `dt` seconds
pub fn step(
    f: &mut Fighter,
    dt: f32,
    buildings: &[Building],
    floor_y: f32,
    tuning: &PhysicsTuning,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    // Terminal fighters stay put unless they are still falling through the floor
    if f.is_dead() && f.feet() <= floor_y {
        return outcome;
    }

    if let Some(climb) = f.climb {
        f.pos.x = climb.lock_x;
        let t = (tuning.climb_rate * dt).clamp(0.0, 1.0);
        f.pos.y += (climb.target_y - f.pos.y) * t;

        if (f.pos.y - climb.target_y).abs() < CLIMB_EPSILON {
            f.pos.y = climb.target_y;
            f.pos.x = climb.mantle_x;
            f.climb = None;
            f.grounded = true;
            f.vel.x = 0.0;
            f.vel.y = 0.0;
            outcome.landed = true;
        }
        return outcome;
    }

    let was_grounded = f.grounded;
    let prev_feet = f.feet();
    let prev_x = f.pos.x;
    let prev_right = f.right();

    f.pos.x += f.vel.x * dt;

    let mut touching_wall = false;
    for b in buildings {
        let top = b.roof_y(floor_y);
        let feet = f.feet();

        // Swept horizontally so a fast step cannot skip past a face
        let overlap = f.pos.x.min(prev_x) < b.right() && f.right().max(prev_right) > b.x;
        if !overlap || feet <= top {
            continue;
        }

        let crossed_left = prev_right <= b.x && f.right() > b.x;
        let crossed_right = prev_x >= b.right() && f.pos.x < b.right();
        let near_left = crossed_left || (f.right() - b.x).abs() < tuning.edge_tolerance;
        let near_right = crossed_right || (f.pos.x - b.right()).abs() < tuning.edge_tolerance;
        if !(near_left || near_right) {
            continue;
        }
        let wall_x = if near_left { b.x - f.size.x } else { b.right() };

        // Ledge grab wins over plain wall contact
        let in_ledge_band = feet >= top - tuning.ledge_above && feet <= top + tuning.ledge_below;
        let into_wall = if near_left { f.facing_right } else { !f.facing_right };
        if in_ledge_band && into_wall && f.is_alive() && !f.grounded {
            f.climb = Some(Climb {
                target_y: top - f.size.y,
                lock_x: wall_x,
                mantle_x: mantle_x(b, f.size.x, near_left, tuning.mantle_inset),
            });
            f.pos.x = wall_x;
            f.vel.x = 0.0;
            f.vel.y = 0.0;
            outcome.grabbed_ledge = true;
            return outcome;
        }

        if feet > top + tuning.wall_contact_depth {
            touching_wall = true;
            f.vel.x = 0.0;
            f.pos.x = wall_x;
        }
    }

    f.vel.y += tuning.gravity * dt;
    if touching_wall && f.vel.y > tuning.wall_slide_speed {
        f.vel.y = tuning.wall_slide_speed;
    }

    f.pos.y += f.vel.y * dt;

    // Landing: highest roof whose top the feet crossed from above
    f.grounded = false;
    if f.vel.y >= 0.0 {
        let feet = f.feet();
        let landing = buildings
            .iter()
            .filter(|b| {
                f.right() > b.x + tuning.landing_inset && f.pos.x < b.right() - tuning.landing_inset
            })
            .map(|b| b.roof_y(floor_y))
            .filter(|&top| feet >= top && (prev_feet <= top || feet - top < tuning.landing_window))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        if let Some(top) = landing {
            f.pos.y = top - f.size.y;
            f.vel.y = 0.0;
            f.grounded = true;
            outcome.landed = !was_grounded;
        }
    }

    outcome
}

/// Whether the fighter has fallen far enough below the floor to count as dead
pub fn fell_out_of_world(f: &Fighter, floor_y: f32, pit_margin: f32) -> bool {
    f.pos.y > floor_y + pit_margin
}
