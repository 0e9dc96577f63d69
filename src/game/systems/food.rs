use hashbrown::HashSet;
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::game::entities::{BotId, FoodId};
use crate::game::field::Field;
use crate::game::local_view::LocalView;
use crate::game::systems::{snapshot_bots, SystemError};

/// A bot's claim on a food item within eating range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodClaim {
    pub bot: BotId,
    pub food: FoodId,
    pub distance: f32,
}

/// Collect every food item within `eat_radius` of each bot's head
pub fn plan(field: &Field, config: &SimulationConfig) -> Result<Vec<FoodClaim>, SystemError> {
    let per_bot: Vec<Vec<FoodClaim>> = snapshot_bots(field)
        .par_iter()
        .map(|bot| -> Result<Vec<FoodClaim>, SystemError> {
            let mut view = LocalView::new(field, bot.head, config.eat_radius)?;
            Ok(view
                .food()?
                .iter()
                .map(|item| FoodClaim {
                    bot: bot.id,
                    food: item.food,
                    distance: item.distance,
                })
                .collect())
        })
        .collect::<Result<_, _>>()?;

    Ok(per_bot.into_iter().flatten().collect())
}

/// Let bots eat the food around their heads
///
/// Food claimed by several bots goes to the nearest one.
/// Returns the number of items eaten.
pub fn update(field: &mut Field, config: &SimulationConfig) -> Result<usize, SystemError> {
    let mut claims = plan(field, config)?;
    claims.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.bot.cmp(&b.bot)));

    let mut eaten: HashSet<FoodId> = HashSet::with_capacity(claims.len());
    for claim in claims {
        if !eaten.insert(claim.food) {
            continue;
        }
        let food = field.remove_food(claim.food)?;
        field.feed_bot(claim.bot, food.value)?;
    }

    if !eaten.is_empty() {
        tracing::trace!(count = eaten.len(), "food eaten");
    }
    Ok(eaten.len())
}
