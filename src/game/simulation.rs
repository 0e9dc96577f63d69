//! Tick loop driving the bot systems on a single field

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::f32::consts::TAU;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::game::entities::BotId;
use crate::game::field::{Field, FieldError};
use crate::game::systems::{collision, food, steering, SystemError};
use crate::util::vec2::Vec2;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub moved: usize,
    pub eaten: usize,
    pub killed: usize,
    pub bots_spawned: usize,
    pub food_spawned: usize,
}

pub struct Simulation {
    config: SimulationConfig,
    field: Field,
    rng: StdRng,
    tick: u64,
    bots_created: u64,
}

impl Simulation {
    /// Create an empty simulation; call [`populate`](Self::populate) to spawn entities
    pub fn new(config: SimulationConfig) -> Result<Self, FieldError> {
        config.validate()?;
        let field = Field::new(config.field.clone())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            field,
            rng,
            tick: 0,
            bots_created: 0,
        })
    }

    #[inline]
    pub fn field(&self) -> &Field {
        &self.field
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Spawn the initial bots and food
    pub fn populate(&mut self) {
        let bots = self.spawn_bots(self.config.initial_bots);
        let food = self.spawn_food(self.config.target_food);
        info!(bots, food, "field populated");
    }

    fn random_position(&mut self) -> Vec2 {
        let size = self.field.config();
        Vec2::new(
            self.rng.gen_range(0.0..size.width),
            self.rng.gen_range(0.0..size.height),
        )
    }

    /// Spawn `count` bots at random positions and headings
    pub fn spawn_bots(&mut self, count: usize) -> usize {
        for _ in 0..count {
            let head = self.random_position();
            let heading = self.rng.gen_range(0.0..TAU);
            self.bots_created += 1;
            let name = format!("bot-{}", self.bots_created);
            let id: BotId = self.field.add_bot(
                name,
                head,
                heading,
                self.config.initial_length,
                self.config.segment_radius,
                self.config.speed,
            );
            debug!(bot = %id, "bot spawned");
        }
        count
    }

    /// Spawn `count` food items at random positions
    pub fn spawn_food(&mut self, count: usize) -> usize {
        let (min, max) = (self.config.food_value_min, self.config.food_value_max);
        for _ in 0..count {
            let position = self.random_position();
            let value = if max > min { self.rng.gen_range(min..max) } else { min };
            self.field.add_food(position, value);
        }
        count
    }

    /// Advance the simulation by one tick
    ///
    /// Order: steer and move, eat, resolve collisions, then top up bots and food.
    pub fn step(&mut self) -> Result<TickReport, SystemError> {
        self.tick += 1;

        let moved = steering::update(&mut self.field, &self.config)?;
        let eaten = food::update(&mut self.field, &self.config)?;
        let killed = collision::update(&mut self.field, &self.config)?;

        let missing_bots = self.config.initial_bots.saturating_sub(self.field.bot_count());
        let bots_spawned = self.spawn_bots(missing_bots);
        let missing_food = self.config.target_food.saturating_sub(self.field.food_count());
        let food_spawned = self.spawn_food(missing_food);

        let report = TickReport {
            tick: self.tick,
            moved,
            eaten,
            killed,
            bots_spawned,
            food_spawned,
        };
        debug!(?report, "tick complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;

    fn test_config() -> SimulationConfig {
        SimulationConfig {
            field: FieldConfig {
                width: 200.0,
                height: 200.0,
                wrap: true,
                cell_size: 16.0,
            },
            initial_bots: 8,
            initial_length: 5,
            target_food: 100,
            seed: Some(42),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = test_config();
        config.field.cell_size = 0.0;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_populate() {
        let mut sim = Simulation::new(test_config()).unwrap();
        sim.populate();
        assert_eq!(sim.field().bot_count(), 8);
        assert_eq!(sim.field().food_count(), 100);
        assert!(sim.field().bots().all(|b| b.length() == 5));
    }

    #[test]
    fn test_step_keeps_population() {
        let mut sim = Simulation::new(test_config()).unwrap();
        sim.populate();

        for expected_tick in 1..=50 {
            let report = sim.step().unwrap();
            assert_eq!(report.tick, expected_tick);
            assert_eq!(sim.field().bot_count(), 8);
            assert!(sim.field().food_count() >= 100);
        }
        assert_eq!(sim.current_tick(), 50);
    }

    #[test]
    fn test_positions_stay_in_field() {
        let mut sim = Simulation::new(test_config()).unwrap();
        sim.populate();
        for _ in 0..30 {
            sim.step().unwrap();
        }

        let in_bounds = |p: Vec2| p.x >= 0.0 && p.x < 200.0 && p.y >= 0.0 && p.y < 200.0;
        assert!(sim.field().bots().flat_map(|b| b.segments.iter()).all(|&p| in_bounds(p)));
        assert!(sim.field().food_items().all(|f| in_bounds(f.position)));
    }

    #[test]
    fn test_segment_index_stays_in_sync() {
        let mut sim = Simulation::new(test_config()).unwrap();
        sim.populate();
        for _ in 0..30 {
            sim.step().unwrap();
        }

        let stats = sim.field().stats();
        let segments: usize = sim.field().bots().map(|b| b.length()).sum();
        assert_eq!(stats.segments, segments);
        assert_eq!(stats.food, sim.field().food_count());
        assert_eq!(stats.food_grid.total_entries, stats.food);
    }

    #[test]
    fn test_seeded_runs_are_reproducible_in_counts() {
        let mut a = Simulation::new(test_config()).unwrap();
        let mut b = Simulation::new(test_config()).unwrap();
        a.populate();
        b.populate();

        let food_a: f32 = a.field().food_items().map(|f| f.value).sum();
        let food_b: f32 = b.field().food_items().map(|f| f.value).sum();
        assert!((food_a - food_b).abs() < 1e-3);
    }
}
