//! Axis-aligned box tests shared by physics and combat

use glam::Vec2;

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Strict overlap: boxes that merely touch do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Hitbox extending `reach` in front of a box's leading edge, same height as the box
pub fn hitbox(body: &Aabb, facing_right: bool, reach: f32) -> Aabb {
    let reach = reach.max(0.0);
    if facing_right {
        Aabb {
            min: Vec2::new(body.max.x, body.min.y),
            max: Vec2::new(body.max.x + reach, body.max.y),
        }
    } else {
        Aabb {
            min: Vec2::new(body.min.x - reach, body.min.y),
            max: Vec2::new(body.min.x, body.max.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_touch() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        let touching = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
    }

    #[test]
    fn test_hitbox_direction() {
        let body = Aabb::new(Vec2::new(100.0, 0.0), Vec2::new(30.0, 70.0));

        let right = hitbox(&body, true, 40.0);
        assert_eq!(right.min.x, 130.0);
        assert_eq!(right.max.x, 170.0);
        assert_eq!((right.min.y, right.max.y), (0.0, 70.0));

        let left = hitbox(&body, false, 40.0);
        assert_eq!(left.min.x, 60.0);
        assert_eq!(left.max.x, 100.0);
    }

    #[test]
    fn test_hitbox_reaches_adjacent_box() {
        let attacker = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(30.0, 70.0));
        let victim = Aabb::new(Vec2::new(30.0, 0.0), Vec2::new(30.0, 70.0));
        assert!(hitbox(&attacker, true, 40.0).overlaps(&victim));
        assert!(!hitbox(&attacker, false, 40.0).overlaps(&victim));
    }
}
