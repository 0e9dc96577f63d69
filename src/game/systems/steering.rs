use std::f32::consts::TAU;

use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::game::entities::{BotId, FoodId};
use crate::game::field::Field;
use crate::game::local_view::LocalView;
use crate::game::systems::{snapshot_bots, SystemError};
use crate::util::vec2::Vec2;

/// New heading for one bot and the food item it is chasing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringDecision {
    pub bot: BotId,
    pub heading: f32,
    pub target: Option<FoodId>,
}

/// Point every bot at the nearest visible food item
/// Uses rayon to build one sight-radius view per bot
pub fn plan(field: &Field, config: &SimulationConfig) -> Result<Vec<SteeringDecision>, SystemError> {
    snapshot_bots(field)
        .par_iter()
        .map(|bot| -> Result<SteeringDecision, SystemError> {
            let mut view = LocalView::new(field, bot.head, config.sight_radius)?;
            let nearest = view.food()?.first().copied();

            Ok(match nearest {
                Some(food) => SteeringDecision {
                    bot: bot.id,
                    // Unwrapped: valid even when the food sits across an edge
                    heading: turn_towards(bot.heading, food.position - bot.head, config.max_turn_rate),
                    target: Some(food.food),
                },
                None => SteeringDecision {
                    bot: bot.id,
                    heading: bot.heading,
                    target: None,
                },
            })
        })
        .collect()
}

/// Steer and move all bots one step
pub fn update(field: &mut Field, config: &SimulationConfig) -> Result<usize, SystemError> {
    let decisions = plan(field, config)?;
    for decision in &decisions {
        field.advance_bot(decision.bot, decision.heading, config.speed)?;
    }
    Ok(decisions.len())
}

/// Rotate `heading` toward `direction` by at most `max_turn` radians
pub fn turn_towards(heading: f32, direction: Vec2, max_turn: f32) -> f32 {
    if direction.length_sq() == 0.0 {
        return heading;
    }
    let turn = Vec2::from_angle(heading)
        .angle_to(direction)
        .clamp(-max_turn, max_turn);
    (heading + turn).rem_euclid(TAU)
}
