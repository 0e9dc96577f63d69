//! The playing field: owner and index of all bots and food
//!
//! Positions are stored wrapped into the field bounds. Two spatial grids (body
//! segments and food) are kept in sync with every mutation so neighborhood
//! queries never need a full scan.

use std::convert::Infallible;

use hashbrown::HashMap;
use tracing::trace;

use crate::config::{ConfigError, FieldConfig};
use crate::game::entities::{Bot, BotId, Food, FoodId};
use crate::game::spatial::{SpatialGrid, SpatialGridStats};
use crate::game::topology::Topology;
use crate::util::vec2::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("Invalid field configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Unknown bot {0}")]
    UnknownBot(BotId),
    #[error("Unknown food item {0}")]
    UnknownFood(FoodId),
}

/// Proximity queries a [`LocalView`](crate::game::local_view::LocalView) is built on
///
/// Visitors receive raw, wrapped positions. The visited set must include every
/// entity whose shortest distance to `center` is at most `radius`, may include
/// extra candidates, and must not visit the same entity twice.
pub trait NeighborhoodSource {
    type Error: std::error::Error;

    fn topology(&self) -> &Topology;

    fn visit_segments_near(
        &self,
        center: Vec2,
        radius: f32,
        visitor: &mut dyn FnMut(Vec2, BotId),
    ) -> Result<(), Self::Error>;

    fn visit_food_near(
        &self,
        center: Vec2,
        radius: f32,
        visitor: &mut dyn FnMut(Vec2, FoodId),
    ) -> Result<(), Self::Error>;
}

/// Summary counters for logging
#[derive(Debug, Clone)]
pub struct FieldStats {
    pub bots: usize,
    pub segments: usize,
    pub food: usize,
    pub segment_grid: SpatialGridStats,
    pub food_grid: SpatialGridStats,
}

pub struct Field {
    config: FieldConfig,
    topology: Topology,
    bots: HashMap<BotId, Bot>,
    food: HashMap<FoodId, Food>,
    segment_grid: SpatialGrid<BotId>,
    food_grid: SpatialGrid<FoodId>,
    next_food_id: u64,
}

impl Field {
    pub fn new(config: FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;
        let topology = Topology::from_config(&config);

        Ok(Self {
            segment_grid: SpatialGrid::new(config.cell_size, topology),
            food_grid: SpatialGrid::new(config.cell_size, topology),
            config,
            topology,
            bots: HashMap::new(),
            food: HashMap::new(),
            next_food_id: 1,
        })
    }

    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Spawn a straight bot of `length` segments, trailing behind `head`
    pub fn add_bot(
        &mut self,
        name: impl Into<String>,
        head: Vec2,
        heading: f32,
        length: usize,
        segment_radius: f32,
        spacing: f32,
    ) -> BotId {
        let id = BotId::new();
        let back = -Vec2::from_angle(heading) * spacing;

        let segments: Vec<Vec2> = (0..length.max(1))
            .map(|i| self.topology.wrap(head + back * i as f32))
            .collect();
        for &segment in &segments {
            self.segment_grid.insert(id, segment);
        }

        let bot = Bot {
            id,
            name: name.into(),
            segments,
            heading,
            segment_radius,
            pending_growth: 0.0,
            consumed_food: 0.0,
        };
        trace!(bot = %id, name = %bot.name, length = bot.length(), "bot added");
        self.bots.insert(id, bot);
        id
    }

    /// Remove a bot and all of its segments from the field
    pub fn remove_bot(&mut self, id: BotId) -> Result<Bot, FieldError> {
        let bot = self.bots.remove(&id).ok_or(FieldError::UnknownBot(id))?;
        for &segment in &bot.segments {
            self.segment_grid.remove(id, segment);
        }
        trace!(bot = %id, "bot removed");
        Ok(bot)
    }

    /// Move a bot's head `distance` units along `heading`
    ///
    /// The tail segment is dropped unless at least one unit of pending growth
    /// is available, in which case the bot grows by one segment.
    pub fn advance_bot(&mut self, id: BotId, heading: f32, distance: f32) -> Result<Vec2, FieldError> {
        let bot = self.bots.get_mut(&id).ok_or(FieldError::UnknownBot(id))?;

        let new_head = self
            .topology
            .wrap(bot.head() + Vec2::from_angle(heading) * distance);
        bot.heading = heading;
        bot.segments.insert(0, new_head);
        self.segment_grid.insert(id, new_head);

        if bot.pending_growth >= 1.0 {
            bot.pending_growth -= 1.0;
        } else if let Some(tail) = bot.segments.pop() {
            self.segment_grid.remove(id, tail);
        }
        Ok(new_head)
    }

    /// Credit eaten food to a bot
    pub fn feed_bot(&mut self, id: BotId, value: f32) -> Result<(), FieldError> {
        let bot = self.bots.get_mut(&id).ok_or(FieldError::UnknownBot(id))?;
        bot.pending_growth += value;
        bot.consumed_food += value;
        Ok(())
    }

    #[inline]
    pub fn bot(&self, id: BotId) -> Option<&Bot> {
        self.bots.get(&id)
    }

    pub fn bots(&self) -> impl Iterator<Item = &Bot> {
        self.bots.values()
    }

    #[inline]
    pub fn bot_count(&self) -> usize {
        self.bots.len()
    }

    pub fn add_food(&mut self, position: Vec2, value: f32) -> FoodId {
        let id = FoodId(self.next_food_id);
        self.next_food_id += 1;

        let position = self.topology.wrap(position);
        self.food_grid.insert(id, position);
        self.food.insert(id, Food { id, position, value });
        id
    }

    pub fn remove_food(&mut self, id: FoodId) -> Result<Food, FieldError> {
        let food = self.food.remove(&id).ok_or(FieldError::UnknownFood(id))?;
        self.food_grid.remove(id, food.position);
        Ok(food)
    }

    #[inline]
    pub fn food(&self, id: FoodId) -> Option<&Food> {
        self.food.get(&id)
    }

    pub fn food_items(&self) -> impl Iterator<Item = &Food> {
        self.food.values()
    }

    #[inline]
    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    pub fn stats(&self) -> FieldStats {
        FieldStats {
            bots: self.bots.len(),
            segments: self.segment_grid.len(),
            food: self.food.len(),
            segment_grid: self.segment_grid.stats(),
            food_grid: self.food_grid.stats(),
        }
    }
}

impl NeighborhoodSource for Field {
    type Error = Infallible;

    #[inline]
    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn visit_segments_near(
        &self,
        center: Vec2,
        radius: f32,
        visitor: &mut dyn FnMut(Vec2, BotId),
    ) -> Result<(), Self::Error> {
        for entry in self.segment_grid.query_radius(center, radius) {
            visitor(entry.position, entry.id);
        }
        Ok(())
    }

    fn visit_food_near(
        &self,
        center: Vec2,
        radius: f32,
        visitor: &mut dyn FnMut(Vec2, FoodId),
    ) -> Result<(), Self::Error> {
        for entry in self.food_grid.query_radius(center, radius) {
            visitor(entry.position, entry.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_field() -> Field {
        Field::new(FieldConfig {
            width: 100.0,
            height: 100.0,
            wrap: true,
            cell_size: 10.0,
        })
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = FieldConfig {
            width: -1.0,
            ..FieldConfig::default()
        };
        assert!(matches!(Field::new(config), Err(FieldError::InvalidConfig(_))));
    }

    #[test]
    fn test_add_bot_wraps_segments() {
        let mut field = small_field();
        let id = field.add_bot("wrapper", Vec2::new(1.0, 50.0), 0.0, 3, 1.0, 2.0);

        let bot = field.bot(id).unwrap();
        assert_eq!(bot.length(), 3);
        assert_eq!(bot.head(), Vec2::new(1.0, 50.0));
        assert!(bot.segments[1].approx_eq(Vec2::new(99.0, 50.0), 1e-4));
        assert!(bot.segments[2].approx_eq(Vec2::new(97.0, 50.0), 1e-4));
        assert_eq!(field.stats().segments, 3);
    }

    #[test]
    fn test_add_bot_has_at_least_one_segment() {
        let mut field = small_field();
        let id = field.add_bot("stub", Vec2::new(10.0, 10.0), 0.0, 0, 1.0, 1.0);
        assert_eq!(field.bot(id).unwrap().length(), 1);
    }

    #[test]
    fn test_advance_drops_tail() {
        let mut field = small_field();
        let id = field.add_bot("mover", Vec2::new(50.0, 50.0), 0.0, 3, 1.0, 1.0);

        let head = field.advance_bot(id, 0.0, 1.0).unwrap();
        assert!(head.approx_eq(Vec2::new(51.0, 50.0), 1e-4));

        let bot = field.bot(id).unwrap();
        assert_eq!(bot.length(), 3);
        assert!(bot.segments[2].approx_eq(Vec2::new(49.0, 50.0), 1e-4));
        assert_eq!(field.stats().segments, 3);
    }

    #[test]
    fn test_advance_grows_with_pending_food() {
        let mut field = small_field();
        let id = field.add_bot("eater", Vec2::new(50.0, 50.0), 0.0, 2, 1.0, 1.0);
        field.feed_bot(id, 1.5).unwrap();

        field.advance_bot(id, 0.0, 1.0).unwrap();
        field.advance_bot(id, 0.0, 1.0).unwrap();

        let bot = field.bot(id).unwrap();
        assert_eq!(bot.length(), 3);
        assert!((bot.pending_growth - 0.5).abs() < 1e-6);
        assert!((bot.consumed_food - 1.5).abs() < 1e-6);
        assert_eq!(field.stats().segments, 3);
    }

    #[test]
    fn test_advance_wraps_head() {
        let mut field = small_field();
        let id = field.add_bot("edge", Vec2::new(99.5, 50.0), 0.0, 1, 1.0, 1.0);
        let head = field.advance_bot(id, 0.0, 1.0).unwrap();
        assert!(head.approx_eq(Vec2::new(0.5, 50.0), 1e-4));
    }

    #[test]
    fn test_remove_bot_clears_segments() {
        let mut field = small_field();
        let id = field.add_bot("gone", Vec2::new(50.0, 50.0), 0.0, 4, 1.0, 1.0);
        let bot = field.remove_bot(id).unwrap();
        assert_eq!(bot.length(), 4);
        assert_eq!(field.stats().segments, 0);
        assert!(matches!(field.remove_bot(id), Err(FieldError::UnknownBot(_))));
    }

    #[test]
    fn test_food_lifecycle() {
        let mut field = small_field();
        let id = field.add_food(Vec2::new(-1.0, 1.0), 2.0);
        assert_eq!(field.food(id).unwrap().position, Vec2::new(99.0, 1.0));
        assert_eq!(field.food_count(), 1);

        let removed = field.remove_food(id).unwrap();
        assert_eq!(removed.value, 2.0);
        assert_eq!(field.food_count(), 0);
        assert!(matches!(field.remove_food(id), Err(FieldError::UnknownFood(_))));
    }

    #[test]
    fn test_food_ids_are_unique() {
        let mut field = small_field();
        let a = field.add_food(Vec2::new(1.0, 1.0), 1.0);
        let b = field.add_food(Vec2::new(1.0, 1.0), 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_visit_food_near_crosses_edge() {
        let mut field = small_field();
        let id = field.add_food(Vec2::new(99.0, 1.0), 1.0);
        field.add_food(Vec2::new(50.0, 50.0), 1.0);

        let mut seen = Vec::new();
        field
            .visit_food_near(Vec2::new(1.0, 1.0), 5.0, &mut |pos, food| seen.push((pos, food)))
            .unwrap();
        assert_eq!(seen, vec![(Vec2::new(99.0, 1.0), id)]);
    }

    #[test]
    fn test_feed_unknown_bot() {
        let mut field = small_field();
        assert!(matches!(
            field.feed_bot(BotId::new(), 1.0),
            Err(FieldError::UnknownBot(_))
        ));
    }
}
