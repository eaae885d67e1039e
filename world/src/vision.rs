//! Line-of-sight geometry shared by every piece that looks around.

use std::f32::consts::PI;

use glam::Vec2;

/// Circular sector a piece can see.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisionCone {
    half_angle: f32,
    radius: f32,
}

impl VisionCone {
    /// Creates a cone opening `half_angle` radians to either side of the
    /// facing direction.
    #[must_use]
    pub const fn new(half_angle: f32, radius: f32) -> Self {
        Self { half_angle, radius }
    }

    /// Full circle of the provided radius.
    #[must_use]
    pub const fn circle(radius: f32) -> Self {
        Self::new(PI, radius)
    }

    /// Half of the opening angle in radians.
    #[must_use]
    pub const fn half_angle(&self) -> f32 {
        self.half_angle
    }

    /// Reach in pixels.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }
}

/// Where a piece looks from and in which direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sight {
    /// Position of the viewer.
    pub origin: Vec2,
    /// Unit facing of the viewer; `None` looks all around.
    pub facing: Option<Vec2>,
    /// Shape of the visible area.
    pub cone: VisionCone,
}

impl Sight {
    /// Reports whether a point at `target` lies inside the visible area.
    ///
    /// A point on the viewer itself is always seen.
    #[must_use]
    pub fn sees(&self, target: Vec2) -> bool {
        let offset = target - self.origin;
        let distance = offset.length();
        if distance > self.cone.radius {
            return false;
        }
        if distance == 0.0 || self.cone.half_angle >= PI {
            return true;
        }
        let Some(facing) = self.facing.and_then(Vec2::try_normalize) else {
            return true;
        };
        let cos = facing.dot(offset / distance).clamp(-1.0, 1.0);
        cos.acos() <= self.cone.half_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(cone: VisionCone) -> Sight {
        Sight {
            origin: Vec2::new(100.0, 100.0),
            facing: Some(Vec2::X),
            cone,
        }
    }

    #[test]
    fn narrow_cone_sees_only_ahead() {
        let sight = forward(VisionCone::new(25f32.to_radians(), 50.0));

        assert!(sight.sees(Vec2::new(140.0, 100.0)));
        assert!(sight.sees(Vec2::new(140.0, 110.0)), "about 14 degrees off axis");
        assert!(!sight.sees(Vec2::new(130.0, 130.0)), "45 degrees off axis");
        assert!(!sight.sees(Vec2::new(60.0, 100.0)), "behind");
        assert!(!sight.sees(Vec2::new(160.0, 100.0)), "too far");
    }

    #[test]
    fn edge_of_the_radius_is_inside() {
        let sight = forward(VisionCone::circle(50.0));
        assert!(sight.sees(Vec2::new(150.0, 100.0)));
        assert!(sight.sees(Vec2::new(100.0, 50.0)));
    }

    #[test]
    fn own_position_is_always_seen() {
        let sight = forward(VisionCone::new(0.0, 0.0));
        assert!(sight.sees(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn missing_facing_sees_all_around() {
        let sight = Sight {
            origin: Vec2::ZERO,
            facing: None,
            cone: VisionCone::new(0.1, 10.0),
        };
        assert!(sight.sees(Vec2::new(-5.0, -5.0)));
    }
}
