//! Local, cached view of the field around a point
//!
//! A [`LocalView`] answers "what is near this point" for per-frame algorithms
//! such as collision checks, steering and targeting. Segment and food lists are
//! computed lazily, independently of each other, and cached until
//! [`LocalView::force_recalculation`] is called.
//!
//! All positions handed out are unwrapped: each one is the periodic image of
//! the stored position nearest to the view's center, so callers can use plain
//! flat-plane arithmetic relative to the center.

use serde::Serialize;
use tracing::trace;

use crate::game::entities::{BotId, FoodId};
use crate::game::field::NeighborhoodSource;
use crate::game::topology::Topology;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocalViewError {
    #[error("View radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),
    #[error("View center must be finite, got ({}, {})", .0.x, .0.y)]
    InvalidCenter(Vec2),
}

/// One observed body segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentInfo {
    /// Unwrapped coordinates
    pub position: Vec2,
    /// Distance from the view center
    pub distance: f32,
    /// The bot this segment belongs to
    pub bot: BotId,
}

/// One observed food item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoodInfo {
    /// Unwrapped coordinates
    pub position: Vec2,
    /// Distance from the view center
    pub distance: f32,
    pub food: FoodId,
}

pub struct LocalView<'a, F: NeighborhoodSource + ?Sized> {
    field: &'a F,
    center: Vec2,
    radius: f32,
    segments: Vec<SegmentInfo>,
    food: Vec<FoodInfo>,
    segments_dirty: bool,
    food_dirty: bool,
}

impl<'a, F: NeighborhoodSource + ?Sized> LocalView<'a, F> {
    /// Create a view of `field` around `center`
    ///
    /// No query happens here; the first call to each accessor does the work.
    pub fn new(field: &'a F, center: Vec2, radius: f32) -> Result<Self, LocalViewError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(LocalViewError::InvalidRadius(radius));
        }
        if !center.is_finite() {
            return Err(LocalViewError::InvalidCenter(center));
        }

        Ok(Self {
            field,
            center,
            radius,
            segments: Vec::new(),
            food: Vec::new(),
            segments_dirty: true,
            food_dirty: true,
        })
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn is_segments_dirty(&self) -> bool {
        self.segments_dirty
    }

    #[inline]
    pub fn is_food_dirty(&self) -> bool {
        self.food_dirty
    }

    /// Body segments within the radius, nearest first
    ///
    /// The list is cached; until [`force_recalculation`](Self::force_recalculation)
    /// is called every call except the first returns the cached result.
    pub fn segments(&mut self) -> Result<&[SegmentInfo], F::Error> {
        if self.segments_dirty {
            let field = self.field;
            let topology = *field.topology();
            let (center, radius) = (self.center, self.radius);

            self.segments.clear();
            let segments = &mut self.segments;
            field.visit_segments_near(center, radius, &mut |raw, bot| {
                if let Some((position, distance)) = nearest_image(&topology, raw, center, radius) {
                    segments.push(SegmentInfo { position, distance, bot });
                }
            })?;
            segments.sort_by(|a, b| a.distance.total_cmp(&b.distance));

            trace!(count = segments.len(), radius, "segment cache rebuilt");
            self.segments_dirty = false;
        }
        Ok(&self.segments)
    }

    /// Food items within the radius, nearest first
    ///
    /// Cached independently of [`segments`](Self::segments).
    pub fn food(&mut self) -> Result<&[FoodInfo], F::Error> {
        if self.food_dirty {
            let field = self.field;
            let topology = *field.topology();
            let (center, radius) = (self.center, self.radius);

            self.food.clear();
            let food = &mut self.food;
            field.visit_food_near(center, radius, &mut |raw, id| {
                if let Some((position, distance)) = nearest_image(&topology, raw, center, radius) {
                    food.push(FoodInfo {
                        position,
                        distance,
                        food: id,
                    });
                }
            })?;
            food.sort_by(|a, b| a.distance.total_cmp(&b.distance));

            trace!(count = food.len(), radius, "food cache rebuilt");
            self.food_dirty = false;
        }
        Ok(&self.food)
    }

    /// Drop both caches; the next accessor call queries the field again
    pub fn force_recalculation(&mut self) {
        self.segments.clear();
        self.food.clear();
        self.segments_dirty = true;
        self.food_dirty = true;
    }
}

/// Unwrapped position and distance of `raw` if it lies within `radius` (inclusive)
#[inline]
fn nearest_image(topology: &Topology, raw: Vec2, center: Vec2, radius: f32) -> Option<(Vec2, f32)> {
    let position = topology.unwrap_near(raw, center);
    let distance_sq = position.distance_sq_to(center);
    if distance_sq <= radius * radius {
        Some((position, distance_sq.sqrt()))
    } else {
        None
    }
}
