//! Field topology: how coordinates behave at the field edges
//!
//! A toroidal field joins opposite edges, so every point has infinitely many
//! periodic images `p + (i * width, j * height)`. Algorithms working near an
//! edge want the image closest to some reference point ("unwrapped"
//! coordinates) so that ordinary flat-plane arithmetic stays valid.

use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Topology {
    /// Edges are walls; positions are clamped onto them
    Bounded { width: f32, height: f32 },
    /// Edges wrap around to the opposite side
    Toroidal { width: f32, height: f32 },
}

impl Topology {
    pub fn from_config(config: &FieldConfig) -> Self {
        if config.wrap {
            Topology::Toroidal {
                width: config.width,
                height: config.height,
            }
        } else {
            Topology::Bounded {
                width: config.width,
                height: config.height,
            }
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        match *self {
            Topology::Bounded { width, height } | Topology::Toroidal { width, height } => {
                Vec2::new(width, height)
            }
        }
    }

    #[inline]
    pub fn wraps(&self) -> bool {
        matches!(self, Topology::Toroidal { .. })
    }

    /// Map a position into the field
    ///
    /// Toroidal fields wrap into `[0, width) x [0, height)`; bounded fields
    /// clamp into `[0, width] x [0, height]`.
    pub fn wrap(&self, position: Vec2) -> Vec2 {
        match *self {
            Topology::Bounded { width, height } => Vec2::new(
                position.x.clamp(0.0, width),
                position.y.clamp(0.0, height),
            ),
            Topology::Toroidal { width, height } => Vec2::new(
                wrap_axis(position.x, width),
                wrap_axis(position.y, height),
            ),
        }
    }

    /// Periodic image of `position` that lies closest to `reference`
    ///
    /// The result may lie outside the field bounds; it is continuous with
    /// `reference` so distances and directions can be computed directly.
    pub fn unwrap_near(&self, position: Vec2, reference: Vec2) -> Vec2 {
        match *self {
            Topology::Bounded { .. } => position,
            Topology::Toroidal { width, height } => Vec2::new(
                reference.x + nearest_offset(position.x - reference.x, width),
                reference.y + nearest_offset(position.y - reference.y, height),
            ),
        }
    }

    /// Shortest distance between two points, across edges when the field wraps
    #[inline]
    pub fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        self.unwrap_near(b, a).distance_to(a)
    }
}

#[inline]
fn wrap_axis(value: f32, period: f32) -> f32 {
    let wrapped = value.rem_euclid(period);
    // rem_euclid can round up to exactly `period` for tiny negative inputs
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// Reduce a coordinate difference to the one with the smallest magnitude
#[inline]
fn nearest_offset(delta: f32, period: f32) -> f32 {
    delta - period * (delta / period).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn torus(size: f32) -> Topology {
        Topology::Toroidal {
            width: size,
            height: size,
        }
    }

    #[test]
    fn test_from_config() {
        let mut config = FieldConfig::default();
        assert!(Topology::from_config(&config).wraps());
        config.wrap = false;
        assert!(!Topology::from_config(&config).wraps());
        assert_eq!(
            Topology::from_config(&config).size(),
            Vec2::new(config.width, config.height)
        );
    }

    #[test]
    fn test_wrap_into_range() {
        let t = torus(100.0);
        assert_eq!(t.wrap(Vec2::new(-1.0, 101.0)), Vec2::new(99.0, 1.0));
        assert_eq!(t.wrap(Vec2::new(250.0, -300.0)), Vec2::new(50.0, 0.0));
        assert_eq!(t.wrap(Vec2::new(100.0, 0.0)), Vec2::new(0.0, 0.0));

        let tiny = t.wrap(Vec2::new(-1e-9, 5.0));
        assert!(tiny.x >= 0.0 && tiny.x < 100.0);
    }

    #[test]
    fn test_unwrap_across_edge() {
        let t = torus(100.0);
        let unwrapped = t.unwrap_near(Vec2::new(99.0, 1.0), Vec2::new(1.0, 1.0));
        assert_eq!(unwrapped, Vec2::new(-1.0, 1.0));

        let unwrapped = t.unwrap_near(Vec2::new(2.0, 97.0), Vec2::new(98.0, 3.0));
        assert!(unwrapped.approx_eq(Vec2::new(102.0, -3.0), EPSILON));
    }

    #[test]
    fn test_unwrap_keeps_near_points() {
        let t = torus(100.0);
        let p = Vec2::new(53.0, 48.0);
        assert_eq!(t.unwrap_near(p, Vec2::new(50.0, 50.0)), p);
    }

    #[test]
    fn test_unwrap_with_reference_outside_field() {
        let t = torus(100.0);
        let unwrapped = t.unwrap_near(Vec2::new(1.0, 50.0), Vec2::new(-2.0, 50.0));
        assert!(unwrapped.approx_eq(Vec2::new(1.0, 50.0), EPSILON));

        let unwrapped = t.unwrap_near(Vec2::new(97.0, 50.0), Vec2::new(-2.0, 50.0));
        assert!(unwrapped.approx_eq(Vec2::new(-3.0, 50.0), EPSILON));
    }

    #[test]
    fn test_distance() {
        let t = torus(100.0);
        assert!((t.distance(Vec2::new(1.0, 1.0), Vec2::new(99.0, 99.0)) - 8f32.sqrt()).abs() < EPSILON);
        assert!((t.distance(Vec2::new(10.0, 10.0), Vec2::new(13.0, 14.0)) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_bounded_clamps_onto_walls() {
        let t = Topology::Bounded {
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(t.wrap(Vec2::new(-3.0, 70.0)), Vec2::new(0.0, 50.0));
        assert_eq!(t.wrap(Vec2::new(100.0, 0.0)), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_bounded_does_not_unwrap() {
        let t = Topology::Bounded {
            width: 100.0,
            height: 100.0,
        };
        let p = Vec2::new(99.0, 1.0);
        assert_eq!(t.wrap(p), p);
        assert_eq!(t.unwrap_near(p, Vec2::new(1.0, 1.0)), p);
        assert!((t.distance(p, Vec2::new(1.0, 1.0)) - 98.0).abs() < EPSILON);
    }
}
