//! Continuous arena geometry shared by the world, systems and adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Location inside the arena expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, growing to the right.
    pub x: f32,
    /// Vertical coordinate, growing downward.
    pub y: f32,
}

impl Point {
    /// Creates a new point from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the point reached after travelling with `velocity` for `dt`.
    #[must_use]
    pub fn advanced(self, velocity: Velocity, dt: Duration) -> Self {
        let seconds = dt.as_secs_f32();
        Self {
            x: self.x + velocity.x * seconds,
            y: self.y + velocity.y * seconds,
        }
    }
}

/// Rate of movement expressed in world units per second.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component; negative values move upward.
    pub y: f32,
}

impl Velocity {
    /// Velocity that keeps a body in place.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new velocity from explicit components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Magnitude of the velocity vector.
    #[must_use]
    pub fn speed(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Velocity of magnitude `speed` pointing from `from` toward `to`.
    ///
    /// Coincident points yield [`Velocity::ZERO`].
    #[must_use]
    pub fn toward(from: Point, to: Point, speed: f32) -> Self {
        let distance = from.distance(to);
        if distance <= f32::EPSILON {
            return Self::ZERO;
        }
        Self {
            x: (to.x - from.x) / distance * speed,
            y: (to.y - from.y) / distance * speed,
        }
    }

    /// Rescales the vector to `speed`, leaving a zero vector untouched.
    #[must_use]
    pub fn with_speed(self, speed: f32) -> Self {
        let current = self.speed();
        if current <= f32::EPSILON {
            return Self::ZERO;
        }
        Self {
            x: self.x / current * speed,
            y: self.y / current * speed,
        }
    }
}

/// Axis-aligned bounding box centred on an entity position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    center: Point,
    half_extent: f32,
}

impl Aabb {
    /// Creates a square box with the provided half extent.
    #[must_use]
    pub const fn new(center: Point, half_extent: f32) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    /// Centre of the box.
    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }

    /// Distance from the centre to each edge.
    #[must_use]
    pub const fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Reports whether the two boxes intersect with a non-zero area.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let reach = self.half_extent + other.half_extent;
        (self.center.x - other.center.x).abs() < reach
            && (self.center.y - other.center.y).abs() < reach
    }

    /// Penetration depth along each axis, or `None` when the boxes are apart.
    #[must_use]
    pub fn penetration(&self, other: &Aabb) -> Option<(f32, f32)> {
        if !self.overlaps(other) {
            return None;
        }
        let reach = self.half_extent + other.half_extent;
        Some((
            reach - (self.center.x - other.center.x).abs(),
            reach - (self.center.y - other.center.y).abs(),
        ))
    }
}

/// Playable rectangle enclosed by the invisible border walls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    width: f32,
    height: f32,
    border: f32,
}

/// Result of clamping a body against the arena walls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clamped {
    /// Position after clamping.
    pub position: Point,
    /// Whether the horizontal coordinate hit a wall.
    pub hit_x: bool,
    /// Whether the vertical coordinate hit a wall.
    pub hit_y: bool,
}

impl Arena {
    /// Creates an arena description.
    #[must_use]
    pub const fn new(width: f32, height: f32, border: f32) -> Self {
        Self {
            width,
            height,
            border,
        }
    }

    /// Total width including the border walls.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Total height including the border walls.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Thickness of the wall along every edge.
    #[must_use]
    pub const fn border(&self) -> f32 {
        self.border
    }

    /// Centre of the arena.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Keeps a body of `half_extent` inside the walls.
    #[must_use]
    pub fn clamp(&self, position: Point, half_extent: f32) -> Clamped {
        let inset = self.border + half_extent;
        let (x, hit_x) = clamp_axis(position.x, inset, self.width - inset);
        let (y, hit_y) = clamp_axis(position.y, inset, self.height - inset);
        Clamped {
            position: Point::new(x, y),
            hit_x,
            hit_y,
        }
    }
}

fn clamp_axis(value: f32, min: f32, max: f32) -> (f32, bool) {
    if max < min {
        return ((min + max) / 2.0, true);
    }
    if value < min {
        (min, true)
    } else if value > max {
        (max, true)
    } else {
        (value, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let origin = Point::new(100.0, 100.0);
        assert!((origin.distance(Point::new(103.0, 104.0)) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn toward_points_at_target_with_requested_speed() {
        let velocity = Velocity::toward(Point::new(0.0, 0.0), Point::new(30.0, 40.0), 50.0);
        assert!((velocity.x - 30.0).abs() < 1e-4);
        assert!((velocity.y - 40.0).abs() < 1e-4);
        assert_eq!(
            Velocity::toward(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 50.0),
            Velocity::ZERO
        );
    }

    #[test]
    fn boxes_touching_edges_do_not_overlap() {
        let player = Aabb::new(Point::new(0.0, 0.0), 16.0);
        let touching = Aabb::new(Point::new(26.0, 0.0), 10.0);
        let inside = Aabb::new(Point::new(25.0, 25.0), 10.0);
        assert!(!player.overlaps(&touching));
        assert!(player.overlaps(&inside));
        assert_eq!(player.penetration(&touching), None);
    }

    #[test]
    fn clamp_reports_wall_hits() {
        let arena = Arena::new(800.0, 600.0, 32.0);
        let clamped = arena.clamp(Point::new(10.0, 300.0), 16.0);
        assert_eq!(clamped.position, Point::new(48.0, 300.0));
        assert!(clamped.hit_x);
        assert!(!clamped.hit_y);
    }
}
