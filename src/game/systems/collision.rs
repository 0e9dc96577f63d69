use rayon::prelude::*;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::game::entities::BotId;
use crate::game::field::Field;
use crate::game::local_view::LocalView;
use crate::game::systems::{snapshot_bots, SystemError};

/// A bot whose head ran into another bot's body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub victim: BotId,
    pub obstacle: BotId,
}

/// Find bots whose head overlaps a segment of a different bot
///
/// Each bot views its own segment radius plus the largest segment radius on
/// the field around the head; the nearest foreign segment that overlaps
/// decides the collision.
pub fn plan(field: &Field) -> Result<Vec<Collision>, SystemError> {
    let max_radius = field.bots().map(|b| b.segment_radius).fold(0.0, f32::max);

    let hits: Vec<Option<Collision>> = snapshot_bots(field)
        .par_iter()
        .map(|bot| -> Result<Option<Collision>, SystemError> {
            let mut view = LocalView::new(field, bot.head, bot.segment_radius + max_radius)?;
            let hit = view.segments()?.iter().find(|segment| {
                if segment.bot == bot.id {
                    return false;
                }
                // Live lookup: the owner may have a different radius
                let other_radius = field
                    .bot(segment.bot)
                    .map_or(bot.segment_radius, |other| other.segment_radius);
                segment.distance < bot.segment_radius + other_radius
            });

            Ok(hit.map(|segment| Collision {
                victim: bot.id,
                obstacle: segment.bot,
            }))
        })
        .collect::<Result<_, _>>()?;

    Ok(hits.into_iter().flatten().collect())
}

/// Kill colliding bots and turn their bodies into food
/// Returns the number of bots removed
pub fn update(field: &mut Field, config: &SimulationConfig) -> Result<usize, SystemError> {
    let collisions = plan(field)?;

    for collision in &collisions {
        let bot = field.remove_bot(collision.victim)?;
        debug!(
            victim = %bot.name,
            obstacle = %collision.obstacle,
            length = bot.length(),
            "bot crashed"
        );
        for segment in bot.segments {
            field.add_food(segment, config.food_per_segment);
        }
    }
    Ok(collisions.len())
}
